//! Handlers for the `/templates/{id}/versions` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use maquette_core::error::CoreError;
use maquette_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use maquette_core::types::DbId;
use maquette_db::models::template_version::{
    TemplateVersion, VersionComparison, VersionStatistics, VersionSummary,
};
use maquette_db::repositories::TemplateVersionRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_meta::ClientMeta;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::services::{template_service, version_service};
use crate::state::AppState;
use crate::handlers::templates::TemplateWithVersion;

/// Query parameters for `GET /templates/{id}/versions/compare`.
#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub v1: i32,
    pub v2: i32,
}

/// A page of version summaries with the total history length.
#[derive(Debug, Serialize)]
pub struct VersionPage {
    pub versions: Vec<VersionSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/v1/templates/{id}/versions
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<VersionPage>>> {
    template_service::get_owned(&state, id, user.user_id).await?;

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let versions = TemplateVersionRepo::list(&state.pool, id, limit, offset).await?;
    let total = TemplateVersionRepo::count(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: VersionPage {
            versions,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/templates/{id}/versions/{n}
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, number)): Path<(DbId, i32)>,
) -> AppResult<Json<DataResponse<TemplateVersion>>> {
    let version = version_service::get_version(&state, &user, id, number).await?;
    Ok(Json(DataResponse { data: version }))
}

/// POST /api/v1/templates/{id}/versions/{n}/restore
pub async fn restore(
    State(state): State<AppState>,
    user: AuthUser,
    meta: ClientMeta,
    Path((id, number)): Path<(DbId, i32)>,
) -> AppResult<Json<DataResponse<TemplateWithVersion>>> {
    let outcome = version_service::restore(&state, &user, &meta, id, number).await?;
    Ok(Json(DataResponse {
        data: TemplateWithVersion {
            template: outcome.template,
            version: outcome.version,
            validation: outcome.report,
        },
    }))
}

/// GET /api/v1/templates/{id}/versions/compare?v1=&v2=
pub async fn compare(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<CompareParams>,
) -> AppResult<Json<DataResponse<VersionComparison>>> {
    template_service::get_owned(&state, id, user.user_id).await?;

    let comparison = TemplateVersionRepo::compare(&state.pool, id, params.v1, params.v2)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "template_version",
            id,
        }))?;
    Ok(Json(DataResponse { data: comparison }))
}

/// DELETE /api/v1/templates/{id}/versions/{n}
///
/// The latest version is protected and yields a 400.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    meta: ClientMeta,
    Path((id, number)): Path<(DbId, i32)>,
) -> AppResult<StatusCode> {
    version_service::delete(&state, &user, &meta, id, number).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{id}/versions/statistics
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VersionStatistics>>> {
    template_service::get_owned(&state, id, user.user_id).await?;
    let stats = TemplateVersionRepo::statistics(&state.pool, id).await?;
    Ok(Json(DataResponse { data: stats }))
}
