//! # Validation Module
//!
//! Input validation rules for Tienda POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: SPA form checks (required fields, number inputs)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (barcode, folio, active email)                 │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock has no database CHECK constraint: non-negative stock is enforced
//! here, at the application boundary, and by the sale flow's stock policy.

use crate::error::ValidationError;
use crate::types::{NewCustomer, ProductInput};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for any single price: $1,000,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

fn required_within(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores (EAN/UPC codes and
///   store-assigned codes such as `GRANEL-01`)
///
/// ```rust
/// use tienda_core::validation::validate_barcode;
///
/// assert!(validate_barcode("7501055300075").is_ok());
/// assert!(validate_barcode("GRANEL-01").is_ok());
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode("75 01").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    required_within("codigoBarras", barcode, 50)?;

    if !barcode
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "codigoBarras".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: 1 to 200 characters after trimming.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_within("nombreProducto", name, 200)
}

/// Validates a person's display name (users and customers).
pub fn validate_person_name(field: &str, name: &str) -> ValidationResult<()> {
    required_within(field, name, 200)
}

/// Validates a catalog search term.
///
/// ## Returns
/// The trimmed term, or `None` when it is blank (no filtering).
pub fn validate_search_query(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "busqueda".to_string(),
            max: 100,
        });
    }

    Ok((!query.is_empty()).then(|| query.to_string()))
}

/// Validates an email address.
///
/// ## Rules
/// Deliberately loose: one `@`, a non-empty local part, and a domain that
/// contains a dot and no whitespace. At most 254 characters.
///
/// ```rust
/// use tienda_core::validation::validate_email;
///
/// assert!(validate_email("cajero@tienda.mx").is_ok());
/// assert!(validate_email("cajero@tienda").is_err());
/// assert!(validate_email("no es correo").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required_within("email", email, 254)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let email = email.trim();
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;

    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a new password's length.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "cantidad".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "cantidad".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Zero is allowed (free items, promotional lines)
/// - Negative prices are rejected
/// - Capped at [`MAX_PRICE_CENTS`] so line arithmetic cannot overflow
///
/// ```rust
/// use tienda_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("precioVenta", 1099).is_ok());
/// assert!(validate_price_cents("precioVenta", 0).is_ok());
/// assert!(validate_price_cents("precioVenta", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level or threshold (never negative when set by hand).
pub fn validate_stock_level(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every writable product field.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_barcode(&input.barcode)?;
    validate_product_name(&input.name)?;
    validate_price_cents("precioCompra", input.purchase_price.cents())?;
    validate_price_cents("precioVenta", input.sale_price.cents())?;
    validate_stock_level("stock", input.stock)?;
    validate_stock_level("stockMinimo", input.min_stock)?;
    required_within("unidadMedida", &input.unit, 20)?;
    Ok(())
}

/// Validates a customer before insert. Only the name is mandatory.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_person_name("nombreCliente", &customer.name)?;

    if let Some(email) = customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }

    if let Some(rfc) = customer.tax_id.as_deref() {
        if rfc.trim().chars().count() > 13 {
            return Err(ValidationError::TooLong {
                field: "rfc".to_string(),
                max: 13,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product() -> ProductInput {
        ProductInput {
            barcode: "7501000111206".to_string(),
            name: "Pan Blanco Grande".to_string(),
            description: None,
            category_id: Some(1),
            supplier_id: None,
            purchase_price: Money::from_cents(3000),
            sale_price: Money::from_cents(4200),
            stock: 10,
            min_stock: 3,
            unit: "pieza".to_string(),
        }
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("7501055300075").is_ok());
        assert!(validate_barcode("GRANEL_FRIJOL").is_ok());

        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("   ").is_err());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode(&"7".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  leche ").unwrap(), Some("leche".into()));
        assert_eq!(validate_search_query("   ").unwrap(), None);
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("admin@tienda.local").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("@tienda.mx").is_err());
        assert!(validate_email("a@b@c.mx").is_err());
        assert!(validate_email("admin@.mx").is_err());
        assert!(validate_email("admin @tienda.mx").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("corta").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_product_input() {
        assert!(validate_product_input(&product()).is_ok());

        let mut negative_stock = product();
        negative_stock.stock = -1;
        assert!(matches!(
            validate_product_input(&negative_stock),
            Err(ValidationError::Negative { .. })
        ));

        let mut negative_price = product();
        negative_price.sale_price = Money::from_cents(-1);
        assert!(validate_product_input(&negative_price).is_err());

        let mut no_unit = product();
        no_unit.unit = " ".to_string();
        assert!(validate_product_input(&no_unit).is_err());
    }

    #[test]
    fn test_validate_new_customer() {
        let mut customer = NewCustomer {
            name: "María López".to_string(),
            phone: Some("5512345678".to_string()),
            email: Some(String::new()),
            address: None,
            tax_id: Some("LOPM800101AB1".to_string()),
        };
        assert!(validate_new_customer(&customer).is_ok());

        customer.email = Some("maria@".to_string());
        assert!(validate_new_customer(&customer).is_err());

        customer.email = None;
        customer.name = "  ".to_string();
        assert!(validate_new_customer(&customer).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1600).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }
}
