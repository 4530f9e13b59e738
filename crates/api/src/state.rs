use std::sync::Arc;

use repwise_core::clock::Clock;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: repwise_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Source of "now" for date rules and status transitions.
    pub clock: Arc<dyn Clock>,
    /// In-process token buckets shared by every request.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(pool: repwise_db::DbPool, config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));
        Self {
            pool,
            config: Arc::new(config),
            clock,
            rate_limiter,
        }
    }
}
