pub mod admin;
pub mod auth;
pub mod health;
pub mod templates;
pub mod validation;
pub mod versions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public, rate-limited)
/// /auth/login                                      login (public, rate-limited)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /templates                                       list, create
/// /templates/search                                search by name/subject (GET)
/// /templates/statistics                            per-user counters (GET)
/// /templates/tags                                  distinct tags (GET)
/// /templates/categories                            distinct categories (GET)
/// /templates/{id}                                  get, update, delete (?hard=true)
/// /templates/{id}/restore                          un-archive (POST)
/// /templates/{id}/duplicate                        duplicate (POST)
/// /templates/{id}/favorite                         toggle favorite (POST)
/// /templates/{id}/tags                             add tag (POST)
/// /templates/{id}/tags/{tag}                       remove tag (DELETE)
/// /templates/{id}/use                              bump usage counter (POST)
/// /templates/{id}/validation                       latest stored record (GET)
///
/// /templates/{id}/versions                         history listing (GET)
/// /templates/{id}/versions/compare                 compare ?v1=&v2= (GET)
/// /templates/{id}/versions/statistics              history aggregates (GET)
/// /templates/{id}/versions/{n}                     get, delete (latest protected)
/// /templates/{id}/versions/{n}/restore             restore as new version (POST)
///
/// /validation/validate                             dry-run validation (POST)
/// /validation/sanitize                             strip dangerous content (POST)
/// /validation/auto-fix                             sanitize + scaffold (POST)
///
/// /admin/users                                     list users (admin only)
/// /admin/users/{id}/deactivate                     deactivate account (PUT)
/// /admin/statistics                                platform rollups (GET)
/// /admin/audit                                     activity trail (GET, filterable)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/templates", templates::router())
        .nest("/validation", validation::router())
        .nest("/admin", admin::router())
}
