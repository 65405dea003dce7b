//! Email template entity models and DTOs.

use maquette_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle state of a template.
///
/// `Deleted` rows are retained for the audit trail and version history but are
/// invisible to every read path except a hard purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "template_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Active,
    Archived,
    Deleted,
}

impl TemplateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Active => "active",
            TemplateStatus::Archived => "archived",
            TemplateStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An email template. Live content mirrors the highest-numbered version.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub css_content: String,
    pub status: TemplateStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a template. Content is normalized before insertion.
#[derive(Debug, Clone)]
pub struct CreateTemplate {
    pub owner_id: DbId,
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub css_content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// DTO for updating a template. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub html_content: Option<String>,
    pub css_content: Option<String>,
}

/// Filters for listing and searching templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub owner_id: DbId,
    pub status: Option<TemplateStatus>,
    pub category: Option<String>,
    pub favorite: Option<bool>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// A page of templates with the unclamped total.
#[derive(Debug, Clone, Serialize)]
pub struct TemplatePage {
    pub templates: Vec<Template>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Per-owner aggregate counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateStatistics {
    pub total: i64,
    pub active: i64,
    pub archived: i64,
    pub favorites: i64,
    pub total_usage: i64,
}
