//! # Repository Module
//!
//! Database repository implementations for Tienda POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  state.db.products().list(&filter)                             │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self, filter)                                               │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, input)                                              │
//! │  └── update(&self, id, input, user_id)                                 │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Accounts and credentials
//! - [`product::ProductRepository`] - Catalog CRUD, search, low stock
//! - [`category::CategoryRepository`] - Active categories
//! - [`customer::CustomerRepository`] - Customer directory
//! - [`sale::SaleRepository`] - The sale transaction, history, statistics

pub mod category;
pub mod customer;
pub mod product;
pub mod sale;
pub mod user;

/// Trims an optional text column, storing blanks as NULL.
pub(crate) fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Test Fixtures
// =============================================================================
