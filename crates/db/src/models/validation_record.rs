//! Stored validation outcomes.

use maquette_core::types::{DbId, Timestamp};
use maquette_core::validation::ValidationIssue;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// Persisted result of validating a template's content.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ValidationRecord {
    pub id: DbId,
    pub template_id: DbId,
    pub is_valid: bool,
    pub html_valid: bool,
    pub css_valid: bool,
    pub errors: Json<Vec<ValidationIssue>>,
    pub warnings: Json<Vec<ValidationIssue>>,
    pub html_size: i64,
    pub css_size: i64,
    pub validated_at: Timestamp,
}
