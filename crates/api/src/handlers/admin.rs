//! Handlers for the `/admin` resource. Every endpoint requires the admin role.

use axum::extract::{Path, Query, State};
use axum::Json;
use maquette_core::error::CoreError;
use maquette_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use maquette_core::types::DbId;
use maquette_db::models::activity_log::{ActivityLogFilter, ActivityLogPage};
use maquette_db::models::stats::PlatformStatistics;
use maquette_db::models::user::User;
use maquette_db::repositories::{ActivityLogRepo, StatsRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /admin/audit`.
#[derive(Debug, Deserialize)]
pub struct AuditParams {
    pub user_id: Option<DbId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A page of users with the total count.
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<UserPage>>> {
    user.require_admin()?;

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    let total = UserRepo::count(&state.pool).await?;

    Ok(Json(DataResponse {
        data: UserPage {
            users,
            total,
            limit,
            offset,
        },
    }))
}

/// PUT /api/v1/admin/users/{id}/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    user.require_admin()?;

    if id == user.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Admins cannot deactivate their own account".into(),
        )));
    }

    let updated = UserRepo::set_active(&state.pool, id, false)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "user", id }))?;
    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/admin/statistics
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<PlatformStatistics>>> {
    user.require_admin()?;
    let stats = StatsRepo::platform(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/admin/audit
pub async fn audit(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<AuditParams>,
) -> AppResult<Json<DataResponse<ActivityLogPage>>> {
    user.require_admin()?;

    let filter = ActivityLogFilter {
        user_id: params.user_id,
        action: params.action,
        entity_type: params.entity_type,
        entity_id: params.entity_id,
        limit: clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        offset: clamp_offset(params.offset),
    };
    let page = ActivityLogRepo::query(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: page }))
}
