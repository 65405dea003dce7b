//! Route definitions for the stateless `/validation` endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::validation;
use crate::state::AppState;

/// ```text
/// POST /validate  -> dry-run validation
/// POST /sanitize  -> strip dangerous content
/// POST /auto-fix  -> sanitize + document scaffolding
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validation::validate))
        .route("/sanitize", post(validation::sanitize))
        .route("/auto-fix", post(validation::fix))
}
