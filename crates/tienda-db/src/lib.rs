//! # tienda-db: Database Layer for Tienda POS
//!
//! Database access for the store backend, on SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tienda POS Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (POST /api/ventas)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tienda-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐ │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │ │   │
//! │  │   │               │    │ UserRepo       │    │              │ │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │    │ 001_schema   │ │   │
//! │  │   │               │    │ CategoryRepo   │    │ 002_roles    │ │   │
//! │  │   │               │    │ CustomerRepo   │    │              │ │   │
//! │  │   │               │    │ SaleRepo       │    │              │ │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL mode, foreign keys on)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use tienda_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./tienda.db")).await?;
//! let low = db.products().list_low_stock().await?;
//! ```
//!
//! ## Queries
//! Queries use the runtime-checked `sqlx::query_as::<_, T>()` API with
//! `FromRow` types from tienda-core, so building the crate never needs a
//! live database.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;
