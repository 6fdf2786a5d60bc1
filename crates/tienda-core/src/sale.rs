//! # Sale Verification
//!
//! Turns the cart a client submits into an order the database can record.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/ventas                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  NewSale (client cart + client-computed totals)                         │
//! │       │                                                                 │
//! │       ▼  into_order(user, tax_rate, clock)   ← THIS MODULE              │
//! │       │                                                                 │
//! │       ├── empty cart / too many lines?      → CoreError                 │
//! │       ├── bad quantity or price?            → ValidationError           │
//! │       ├── line subtotal ≠ qty × price?      → TotalsMismatch            │
//! │       ├── subtotal ≠ Σ lines?               → TotalsMismatch            │
//! │       ├── tax ≠ (subtotal − discount) × IVA → TotalsMismatch            │
//! │       └── total ≠ subtotal − discount + tax → TotalsMismatch            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleOrder (server-computed amounts, seller from token, business date)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tienda-db: SaleRepository::create (one transaction)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every comparison allows [`TOTALS_TOLERANCE_CENTS`] of drift so the
//! checkout screen's float arithmetic does not trip it. The order always
//! carries the recomputed values, never the stated ones.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::clock::StoreClock;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, TaxRate};
use crate::validation::{validate_price_cents, validate_quantity};
use crate::{MAX_CART_ITEMS, TOTALS_TOLERANCE_CENTS};

// =============================================================================
// Client Input
// =============================================================================

/// One cart line as submitted by the checkout screen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartLine {
    #[serde(rename = "idProducto")]
    pub product_id: i64,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Money,
    /// Client-computed `quantity × unit_price`; checked when present.
    #[serde(default)]
    pub subtotal: Option<Money>,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Efectivo
}

/// A sale as submitted by the checkout screen.
///
/// Any `idUsuario` in the body is ignored; the seller is whoever the bearer
/// token belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewSale {
    #[serde(rename = "idCliente", default)]
    pub customer_id: Option<i64>,
    #[serde(rename = "metodoPago", default = "default_payment_method")]
    pub payment_method: PaymentMethod,
    pub subtotal: Money,
    #[serde(rename = "descuento", default)]
    pub discount: Money,
    #[serde(rename = "impuesto")]
    pub tax: Money,
    pub total: Money,
    #[serde(rename = "productos")]
    pub lines: Vec<CartLine>,
}

// =============================================================================
// Verified Order
// =============================================================================

/// A cart line with its server-computed subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Sale-level amounts, all computed from the lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// Everything the sale transaction needs, already verified.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleOrder {
    pub user_id: i64,
    pub customer_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub lines: Vec<PricedLine>,
    pub totals: SaleTotals,
    pub sold_at: DateTime<Utc>,
    /// Store-local calendar date, used for the folio and all reporting.
    pub business_date: NaiveDate,
}

fn check(field: &str, stated: Money, expected: Money) -> CoreResult<()> {
    if stated.approx_eq(expected, TOTALS_TOLERANCE_CENTS) {
        Ok(())
    } else {
        Err(CoreError::TotalsMismatch {
            field: field.to_string(),
            stated,
            expected,
        })
    }
}

impl NewSale {
    /// Recomputes every amount from the lines and compares it with what the
    /// client stated.
    ///
    /// ## Returns
    /// The priced lines and sale totals, built from catalog-independent
    /// arithmetic only (unit prices are the ones on the ticket).
    pub fn price(&self, tax_rate: TaxRate) -> CoreResult<(Vec<PricedLine>, SaleTotals)> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        if self.lines.len() > MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        let mut priced = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            validate_quantity(line.quantity)?;
            validate_price_cents("precioUnitario", line.unit_price.cents())?;

            let subtotal = line.unit_price.multiply_quantity(line.quantity);
            if let Some(stated) = line.subtotal {
                check("line subtotal", stated, subtotal)?;
            }

            priced.push(PricedLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal,
            });
        }

        let subtotal: Money = priced.iter().map(|l| l.subtotal).sum();
        check("subtotal", self.subtotal, subtotal)?;

        let discount = self.discount;
        if discount.is_negative() || discount > subtotal {
            return Err(crate::ValidationError::OutOfRange {
                field: "descuento".to_string(),
                min: 0,
                max: subtotal.cents(),
            }
            .into());
        }

        let tax = (subtotal - discount).calculate_tax(tax_rate);
        check("impuesto", self.tax, tax)?;

        let total = subtotal - discount + tax;
        check("total", self.total, total)?;

        Ok((
            priced,
            SaleTotals {
                subtotal,
                discount,
                tax,
                total,
            },
        ))
    }

    /// Verifies the cart and stamps it with seller and time.
    pub fn into_order(
        self,
        user_id: i64,
        tax_rate: TaxRate,
        clock: &StoreClock,
    ) -> CoreResult<SaleOrder> {
        let (lines, totals) = self.price(tax_rate)?;
        let sold_at = clock.now();

        Ok(SaleOrder {
            user_id,
            customer_id: self.customer_id,
            payment_method: self.payment_method,
            lines,
            totals,
            sold_at,
            business_date: clock.business_date(sold_at),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
