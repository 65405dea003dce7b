//! Template version history models and DTOs.

use maquette_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One immutable snapshot in a template's history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateVersion {
    pub id: DbId,
    pub template_id: DbId,
    pub version_number: i32,
    pub html_content: String,
    pub css_content: String,
    pub change_description: String,
    pub created_by: DbId,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// Version row without content payloads, for history listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VersionSummary {
    pub id: DbId,
    pub template_id: DbId,
    pub version_number: i32,
    pub change_description: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
}

/// Request attribution recorded on version rows created on behalf of a user.
#[derive(Debug, Clone)]
pub struct VersionContext {
    pub user_id: DbId,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Field-level difference flags between two versions.
#[derive(Debug, Clone, Serialize)]
pub struct VersionDiff {
    pub html_changed: bool,
    pub css_changed: bool,
    pub any_changes: bool,
}

/// Side-by-side comparison of two versions of the same template.
#[derive(Debug, Clone, Serialize)]
pub struct VersionComparison {
    pub template_id: DbId,
    pub version_a: TemplateVersion,
    pub version_b: TemplateVersion,
    pub differences: VersionDiff,
}

/// History aggregates for one template.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VersionStatistics {
    pub version_count: i64,
    pub latest_version: Option<i32>,
    pub first_created_at: Option<Timestamp>,
    pub last_created_at: Option<Timestamp>,
    pub distinct_authors: i64,
}
