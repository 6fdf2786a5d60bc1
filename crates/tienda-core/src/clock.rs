//! # Store Clock
//!
//! Business dates for a single store in a fixed time zone.
//!
//! Timestamps are stored in UTC, but everything a cashier calls "today"
//! (folio dates, daily totals, the monthly figure, date-range filters) is a
//! calendar date in the store's local offset. A sale rung up at 23:30 in
//! Mexico City belongs to that day, not to the UTC day after.
//!
//! ```text
//!  2025-03-14T05:30:00Z ──with_timezone(-06:00)──► 2025-03-13 23:30
//!                                                       │
//!                                        business date: 2025-03-13
//! ```

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, Offset, Utc};

use crate::error::ValidationError;

/// Default store offset: America/Mexico_City standard time (UTC-06:00).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -360;

/// Source of "now" and of business dates.
///
/// Cheap to copy. Tests freeze it at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreClock {
    offset: FixedOffset,
    frozen_at: Option<DateTime<Utc>>,
}

impl StoreClock {
    /// A live clock in the given offset.
    pub fn new(offset: FixedOffset) -> Self {
        StoreClock {
            offset,
            frozen_at: None,
        }
    }

    /// A live clock from an offset in minutes east of UTC.
    ///
    /// Returns `None` when the offset is outside ±24 hours.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(StoreClock::new)
    }

    /// The same clock, stopped at `instant`.
    pub fn frozen_at(self, instant: DateTime<Utc>) -> Self {
        StoreClock {
            frozen_at: Some(instant),
            ..self
        }
    }

    /// Current instant in UTC.
    pub fn now(&self) -> DateTime<Utc> {
        self.frozen_at.unwrap_or_else(Utc::now)
    }

    /// The store's offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar date of `instant` at the store.
    pub fn business_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Today's calendar date at the store.
    pub fn today(&self) -> NaiveDate {
        self.business_date(self.now())
    }
}

impl Default for StoreClock {
    fn default() -> Self {
        StoreClock::new(FixedOffset::west_opt(6 * 3600).unwrap_or(Utc.fix()))
    }
}

/// First and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// `[today - days, today]`, inclusive on both ends.
pub fn trailing_window(today: NaiveDate, days: i64) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_days(Days::new(days.unsigned_abs()))
        .unwrap_or(NaiveDate::MIN);
    (start, today)
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive range of business dates for filtering sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidFormat {
                field: "fechaInicio".to_string(),
                reason: "must not be after fechaFin".to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    /// Parses optional `YYYY-MM-DD` bounds from a query string.
    ///
    /// ## Returns
    /// * `Ok(None)` - neither bound given (or both blank)
    /// * `Ok(Some(range))` - both bounds given and ordered
    /// * `Err` - only one bound, an unparsable date, or start after end
    ///
    /// A lone bound is an error, never an unfiltered listing.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>, ValidationError> {
        let start = start.map(str::trim).filter(|s| !s.is_empty());
        let end = end.map(str::trim).filter(|s| !s.is_empty());

        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = parse_date("fechaInicio", start)?;
                let end = parse_date("fechaFin", end)?;
                DateRange::new(start, end).map(Some)
            }
            (Some(_), None) => Err(ValidationError::Required {
                field: "fechaFin".to_string(),
            }),
            (None, Some(_)) => Err(ValidationError::Required {
                field: "fechaInicio".to_string(),
            }),
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
