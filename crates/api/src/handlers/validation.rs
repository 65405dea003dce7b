//! Handlers for the stateless `/validation` endpoints: dry-run validation,
//! sanitizing, and auto-fix. None of these touch the database.

use axum::extract::State;
use axum::Json;
use maquette_core::sanitize::{auto_fix, normalize_css, sanitize_css, sanitize_html};
use maquette_core::validation::ValidationReport;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body shared by the validation endpoints.
#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub html_content: String,
    pub css_content: Option<String>,
}

/// Response for `POST /validation/sanitize`.
#[derive(Debug, Serialize)]
pub struct SanitizedContent {
    pub html_content: String,
    pub css_content: String,
}

/// Response for `POST /validation/auto-fix`.
#[derive(Debug, Serialize)]
pub struct AutoFixResponse {
    pub html_content: String,
    pub css_content: String,
    pub changes: Vec<String>,
    /// Report for the fixed content, so clients can see what remains.
    pub validation: ValidationReport,
}

/// POST /api/v1/validation/validate
///
/// Pure dry-run: validates the submitted content without storing anything.
pub async fn validate(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<ContentRequest>,
) -> AppResult<Json<DataResponse<ValidationReport>>> {
    let css = normalize_css(input.css_content.as_deref());
    let report = state.validator.validate(&input.html_content, &css);
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/validation/sanitize
pub async fn sanitize(
    _user: AuthUser,
    Json(input): Json<ContentRequest>,
) -> AppResult<Json<DataResponse<SanitizedContent>>> {
    let css = normalize_css(input.css_content.as_deref());
    Ok(Json(DataResponse {
        data: SanitizedContent {
            html_content: sanitize_html(&input.html_content),
            css_content: sanitize_css(&css),
        },
    }))
}

/// POST /api/v1/validation/auto-fix
pub async fn fix(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<ContentRequest>,
) -> AppResult<Json<DataResponse<AutoFixResponse>>> {
    let css = normalize_css(input.css_content.as_deref());
    let outcome = auto_fix(&input.html_content, &css);
    let validation = state.validator.validate(&outcome.html, &outcome.css);
    Ok(Json(DataResponse {
        data: AutoFixResponse {
            html_content: outcome.html,
            css_content: outcome.css,
            changes: outcome.changes,
            validation,
        },
    }))
}
