//! Handlers for the `/templates` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use maquette_core::error::CoreError;
use maquette_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use maquette_core::types::DbId;
use maquette_core::validation::ValidationReport;
use maquette_db::models::template::{
    Template, TemplateFilter, TemplatePage, TemplateStatistics, TemplateStatus,
};
use maquette_db::models::template_metadata::TemplateMetadata;
use maquette_db::models::template_version::TemplateVersion;
use maquette_db::models::validation_record::ValidationRecord;
use maquette_db::repositories::{
    TemplateMetadataRepo, TemplateRepo, ValidationRecordRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_meta::ClientMeta;
use crate::response::DataResponse;
use crate::services::template_service::{self, CreateInput, UpdateInput};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /templates`.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub css_content: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for `PUT /templates/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub html_content: Option<String>,
    /// Absent keeps the stored CSS; an explicit `null` (or blank) clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub css_content: Option<Option<String>>,
    pub change_description: Option<String>,
}

/// Keeps a present-but-null field distinct from an absent one: absent leaves
/// the outer `Option` as `None` via `#[serde(default)]`, while a present
/// value (including `null`) deserializes into `Some(inner)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Request body for `POST /templates/{id}/duplicate`.
#[derive(Debug, Deserialize, Default)]
pub struct DuplicateRequest {
    pub name: Option<String>,
}

/// Request body for `POST /templates/{id}/tags`.
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub tag: String,
}

/// Query parameters for `GET /templates`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub category: Option<String>,
    pub favorite: Option<bool>,
    /// Include archived templates alongside active ones.
    #[serde(default)]
    pub include_archived: bool,
}

/// Query parameters for `GET /templates/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `DELETE /templates/{id}`.
#[derive(Debug, Deserialize, Default)]
pub struct DeleteParams {
    #[serde(default)]
    pub hard: bool,
}

/// Template plus the version a write operation appended, with the advisory
/// validation report for that content.
#[derive(Debug, Serialize)]
pub struct TemplateWithVersion {
    pub template: Template,
    pub version: TemplateVersion,
    pub validation: ValidationReport,
}

/// Update response; `version` is only present when content changed.
#[derive(Debug, Serialize)]
pub struct TemplateUpdated {
    pub template: Template,
    pub version: Option<TemplateVersion>,
    pub validation: Option<ValidationReport>,
}

/// Template with its metadata row, for single-template reads.
#[derive(Debug, Serialize)]
pub struct TemplateDetail {
    pub template: Template,
    pub metadata: Option<TemplateMetadata>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/templates
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<TemplatePage>>> {
    let filter = TemplateFilter {
        owner_id: user.user_id,
        status: if params.include_archived {
            None
        } else {
            Some(TemplateStatus::Active)
        },
        category: params.category,
        favorite: params.favorite,
        search: None,
        limit: clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        offset: clamp_offset(params.offset),
    };
    let page = TemplateRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/templates/search?q=
pub async fn search(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<TemplatePage>>> {
    let filter = TemplateFilter {
        owner_id: user.user_id,
        status: Some(TemplateStatus::Active),
        search: Some(params.q),
        limit: clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        offset: clamp_offset(params.offset),
        ..Default::default()
    };
    let page = TemplateRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/templates/statistics
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<TemplateStatistics>>> {
    let stats = TemplateRepo::statistics(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// POST /api/v1/templates
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    meta: ClientMeta,
    Json(input): Json<CreateTemplateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TemplateWithVersion>>)> {
    let outcome = template_service::create(
        &state,
        &user,
        &meta,
        CreateInput {
            name: input.name,
            subject: input.subject,
            html_content: input.html_content,
            css_content: input.css_content,
            category: input.category,
            tags: input.tags,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TemplateWithVersion {
                template: outcome.template,
                version: outcome.version,
                validation: outcome.report,
            },
        }),
    ))
}

/// GET /api/v1/templates/{id}
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TemplateDetail>>> {
    let template = template_service::get_owned(&state, id, user.user_id).await?;
    let metadata = TemplateMetadataRepo::find_by_template(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: TemplateDetail { template, metadata },
    }))
}

/// PUT /api/v1/templates/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    meta: ClientMeta,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplateRequest>,
) -> AppResult<Json<DataResponse<TemplateUpdated>>> {
    let outcome = template_service::update(
        &state,
        &user,
        &meta,
        id,
        UpdateInput {
            name: input.name,
            subject: input.subject,
            html_content: input.html_content,
            css_content: input.css_content,
            change_description: input.change_description,
        },
    )
    .await?;

    Ok(Json(DataResponse {
        data: TemplateUpdated {
            template: outcome.template,
            version: outcome.version,
            validation: outcome.report,
        },
    }))
}

/// DELETE /api/v1/templates/{id}
///
/// Archives by default; `?hard=true` removes the row and its history.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    meta: ClientMeta,
    Path(id): Path<DbId>,
    Query(params): Query<DeleteParams>,
) -> AppResult<StatusCode> {
    template_service::delete(&state, &user, &meta, id, params.hard).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/templates/{id}/restore
pub async fn unarchive(
    State(state): State<AppState>,
    user: AuthUser,
    meta: ClientMeta,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Template>>> {
    let template = template_service::unarchive(&state, &user, &meta, id).await?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /api/v1/templates/{id}/duplicate
pub async fn duplicate(
    State(state): State<AppState>,
    user: AuthUser,
    meta: ClientMeta,
    Path(id): Path<DbId>,
    Json(input): Json<DuplicateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TemplateWithVersion>>)> {
    let outcome = template_service::duplicate(&state, &user, &meta, id, input.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TemplateWithVersion {
                template: outcome.template,
                version: outcome.version,
                validation: outcome.report,
            },
        }),
    ))
}

/// POST /api/v1/templates/{id}/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TemplateMetadata>>> {
    template_service::get_owned(&state, id, user.user_id).await?;
    let metadata = TemplateMetadataRepo::toggle_favorite(&state.pool, id)
        .await?
        .ok_or_else(|| metadata_missing(id))?;
    Ok(Json(DataResponse { data: metadata }))
}

/// POST /api/v1/templates/{id}/tags
pub async fn add_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<TagRequest>,
) -> AppResult<Json<DataResponse<TemplateMetadata>>> {
    let tag = input.tag.trim();
    if tag.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "tag must not be blank".into(),
        )));
    }
    template_service::get_owned(&state, id, user.user_id).await?;
    let metadata = TemplateMetadataRepo::add_tag(&state.pool, id, tag)
        .await?
        .ok_or_else(|| metadata_missing(id))?;
    Ok(Json(DataResponse { data: metadata }))
}

/// DELETE /api/v1/templates/{id}/tags/{tag}
pub async fn remove_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, tag)): Path<(DbId, String)>,
) -> AppResult<Json<DataResponse<TemplateMetadata>>> {
    template_service::get_owned(&state, id, user.user_id).await?;
    let metadata = TemplateMetadataRepo::remove_tag(&state.pool, id, &tag)
        .await?
        .ok_or_else(|| metadata_missing(id))?;
    Ok(Json(DataResponse { data: metadata }))
}

/// POST /api/v1/templates/{id}/use
pub async fn record_use(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TemplateMetadata>>> {
    template_service::get_owned(&state, id, user.user_id).await?;
    let metadata = TemplateMetadataRepo::record_use(&state.pool, id)
        .await?
        .ok_or_else(|| metadata_missing(id))?;
    Ok(Json(DataResponse { data: metadata }))
}

/// GET /api/v1/templates/{id}/validation
///
/// Latest stored validation record for the template.
pub async fn latest_validation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ValidationRecord>>> {
    template_service::get_owned(&state, id, user.user_id).await?;
    let record = ValidationRecordRepo::find_latest(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "validation_record",
            id,
        }))?;
    Ok(Json(DataResponse { data: record }))
}

/// GET /api/v1/templates/tags
pub async fn list_tags(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let tags = TemplateMetadataRepo::list_tags(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// GET /api/v1/templates/categories
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let categories = TemplateMetadataRepo::list_categories(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// Metadata rows exist for every template; absence means the template row
/// itself vanished between the ownership check and the update.
fn metadata_missing(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "template",
        id,
    })
}
