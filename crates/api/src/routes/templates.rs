//! Route definitions for the `/templates` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::templates;
use crate::routes::versions;
use crate::state::AppState;

/// Routes mounted at `/templates`. Version history routes are nested under
/// `/{id}/versions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates::list).post(templates::create))
        .route("/search", get(templates::search))
        .route("/statistics", get(templates::statistics))
        .route("/tags", get(templates::list_tags))
        .route("/categories", get(templates::list_categories))
        .route(
            "/{id}",
            get(templates::get)
                .put(templates::update)
                .delete(templates::delete),
        )
        .route("/{id}/restore", post(templates::unarchive))
        .route("/{id}/duplicate", post(templates::duplicate))
        .route("/{id}/favorite", post(templates::toggle_favorite))
        .route("/{id}/tags", post(templates::add_tag))
        .route("/{id}/tags/{tag}", delete(templates::remove_tag))
        .route("/{id}/use", post(templates::record_use))
        .route("/{id}/validation", get(templates::latest_validation))
        .nest("/{id}/versions", versions::router())
}
