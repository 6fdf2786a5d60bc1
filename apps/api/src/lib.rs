//! # Tienda API
//!
//! JSON REST server for the store's web front end.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tienda API Server                              │
//! │                                                                         │
//! │  SPA ──► axum (8080) ──► middleware ──► handlers ──► tienda-db ──► SQLite│
//! │              │              │                                           │
//! │              │              ├─ CORS, request id, tracing, timeout       │
//! │              │              └─ AuthUser / RequireAdmin (bearer JWT)     │
//! │              │                                                          │
//! │              └─ /health, /api/{auth,productos,categorias,clientes,ventas}│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`] for the keys and their `TIENDA_*` environment variables.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod seed;
pub mod state;

// Re-exports
pub use config::ServerConfig;
pub use error::ApiError;
pub use router::build_app_router;
pub use state::AppState;
