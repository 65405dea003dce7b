//! Route definitions for the `/admin` resource (admin role required).

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// GET /users                     -> list users
/// PUT /users/{id}/deactivate     -> deactivate account
/// GET /statistics                -> platform rollups
/// GET /audit                     -> activity trail
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/deactivate", put(admin::deactivate_user))
        .route("/statistics", get(admin::statistics))
        .route("/audit", get(admin::audit))
}
