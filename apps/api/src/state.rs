//! Shared application state.

use std::sync::Arc;

use tienda_core::StoreClock;
use tienda_db::Database;

use crate::auth::TokenIssuer;
use crate::config::ServerConfig;

/// State cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub tokens: Arc<TokenIssuer>,
    /// Source of "now" and business dates. Frozen in tests.
    pub clock: StoreClock,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs);
        let clock = config.clock();

        AppState {
            db,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            clock,
        }
    }

    /// Replaces the clock, e.g. with a frozen one.
    pub fn with_clock(mut self, clock: StoreClock) -> Self {
        self.clock = clock;
        self
    }
}
