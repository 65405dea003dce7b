//! Route definitions for the version history, nested at
//! `/templates/{id}/versions`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::versions;
use crate::state::AppState;

/// ```text
/// GET    /              -> history listing (paginated)
/// GET    /compare       -> compare ?v1=&v2=
/// GET    /statistics    -> history aggregates
/// GET    /{n}           -> full version payload
/// DELETE /{n}           -> delete (latest protected)
/// POST   /{n}/restore   -> restore as new version
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(versions::list))
        .route("/compare", get(versions::compare))
        .route("/statistics", get(versions::statistics))
        .route("/{number}", get(versions::get).delete(versions::delete))
        .route("/{number}/restore", post(versions::restore))
}
