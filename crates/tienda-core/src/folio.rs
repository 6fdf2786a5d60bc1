//! # Folio
//!
//! The human-readable receipt identifier printed on every ticket.
//!
//! ## Format
//! ```text
//!   V 20250314 0427
//!   │    │       │
//!   │    │       └── 4-digit random suffix, zero-padded (0000-9999)
//!   │    └────────── business date, YYYYMMDD
//!   └─────────────── fixed prefix
//! ```
//!
//! The suffix alone does not make a folio unique: 10,000 values per day
//! collide quickly on a busy register. Uniqueness comes from the UNIQUE
//! index on `sales.folio`; the sale repository draws a fresh suffix when
//! the insert hits it.

use chrono::NaiveDate;
use rand::Rng;
use std::fmt;

/// Number of distinct suffixes per day.
pub const SUFFIX_SPACE: u16 = 10_000;

const PREFIX: char = 'V';
const LEN: usize = 1 + 8 + 4;

/// A validated folio string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Folio(String);

impl Folio {
    /// Builds the folio for `date` with a specific suffix (taken mod 10,000).
    pub fn new(date: NaiveDate, suffix: u16) -> Self {
        Folio(format!(
            "{PREFIX}{}{:04}",
            date.format("%Y%m%d"),
            suffix % SUFFIX_SPACE
        ))
    }

    /// Builds a folio for `date` with a random suffix drawn from `rng`.
    pub fn generate<R: Rng>(date: NaiveDate, rng: &mut R) -> Self {
        Folio::new(date, rng.random_range(0..SUFFIX_SPACE))
    }

    /// Checks the `V` + 8-digit date + 4-digit suffix shape, including that
    /// the date part is a real calendar date.
    pub fn is_well_formed(candidate: &str) -> bool {
        if candidate.len() != LEN || !candidate.starts_with(PREFIX) {
            return false;
        }
        let digits = &candidate[1..];
        digits.bytes().all(|b| b.is_ascii_digit())
            && NaiveDate::parse_from_str(&digits[..8], "%Y%m%d").is_ok()
    }

    /// The folio text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The business date encoded in the folio.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0[1..9], "%Y%m%d").ok()
    }
}

impl fmt::Display for Folio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Folio> for String {
    fn from(folio: Folio) -> Self {
        folio.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_suffix_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(Folio::new(date, 7).as_str(), "V202503040007");
        assert_eq!(Folio::new(date, 9999).as_str(), "V202503049999");
        assert_eq!(Folio::new(date, 10_000).as_str(), "V202503040000");
    }

    #[test]
    fn test_generated_folios_are_well_formed_across_dates() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut date = NaiveDate::from_ymd_opt(1999, 12, 25).unwrap();

        for _ in 0..2_000 {
            let folio = Folio::generate(date, &mut rng);
            assert!(Folio::is_well_formed(folio.as_str()), "{folio}");
            assert_eq!(folio.date(), Some(date));
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_is_well_formed_rejects_bad_shapes() {
        assert!(Folio::is_well_formed("V202501010001"));

        assert!(!Folio::is_well_formed("X202501010001"));
        assert!(!Folio::is_well_formed("V20250101001"));
        assert!(!Folio::is_well_formed("V2025010100011"));
        assert!(!Folio::is_well_formed("V2025013100A1"));
        assert!(!Folio::is_well_formed("V202502300001"));
        assert!(!Folio::is_well_formed(""));
    }
}
