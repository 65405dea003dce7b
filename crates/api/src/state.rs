use std::sync::Arc;

use maquette_core::rate_limit::RateLimiter;
use maquette_core::validation::TemplateValidator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: maquette_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Shared content validator with the current severity policy.
    pub validator: Arc<TemplateValidator>,
    /// Rate limiter applied to the login and register endpoints.
    pub limiter: Arc<dyn RateLimiter>,
}
