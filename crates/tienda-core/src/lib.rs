//! # tienda-core: Pure Business Logic for Tienda POS
//!
//! This crate holds the store's business rules as pure functions and plain
//! types. Nothing here touches the database, the network or the file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tienda POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    SPA (login, inventory, checkout)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum handlers)                     │   │
//! │  │    /api/auth, /api/productos, /api/ventas, ...                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tienda-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────┐ │   │
//! │  │   │  types   │ │  money   │ │   sale   │ │validation│ │clock │ │   │
//! │  │   │ Product  │ │  Money   │ │ NewSale  │ │  rules   │ │Store │ │   │
//! │  │   │ Sale     │ │ TaxRate  │ │ SaleOrder│ │  checks  │ │Clock │ │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘ └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tienda-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, statistics, ...)
//! - [`money`] - Money type with integer arithmetic and decimal wire format
//! - [`sale`] - Cart verification: turns a client cart into a priced order
//! - [`folio`] - Human-readable sale receipt identifiers
//! - [`clock`] - Business-date calculations in the store's time zone
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use tienda_core::money::Money;
//! use tienda_core::types::TaxRate;
//!
//! let subtotal = Money::from_cents(10_000); // $100.00
//! let iva = TaxRate::from_bps(1600);        // 16%
//!
//! assert_eq!(subtotal.calculate_tax(iva).cents(), 1_600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod folio;
pub mod money;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{DateRange, StoreClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use folio::Folio;
pub use money::Money;
pub use sale::{NewSale, SaleOrder};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale.
///
/// ## Business Reason
/// Prevents runaway carts and keeps the sale transaction short.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Most recent sales returned by the sales listing.
pub const RECENT_SALES_LIMIT: i64 = 100;

/// Entries in the dashboard's best-sellers list.
pub const TOP_PRODUCTS_LIMIT: i64 = 5;

/// Trailing window (in days, inclusive of today) for best-sellers.
pub const TOP_PRODUCTS_WINDOW_DAYS: i64 = 30;

/// Tolerance when comparing caller-stated totals with recomputed ones.
pub const TOTALS_TOLERANCE_CENTS: i64 = 1;
