//! Organizational metadata attached 1:1 to each template.

use maquette_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// Category, tags, usage counters, and sharing flags for a template.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateMetadata {
    pub id: DbId,
    pub template_id: DbId,
    pub category: Option<String>,
    pub tags: Json<Vec<String>>,
    pub usage_count: i32,
    pub last_used_at: Option<Timestamp>,
    pub favorite: bool,
    pub shared: bool,
    pub shared_with: Json<Vec<DbId>>,
}

/// Metadata fields that may be patched. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateTemplateMetadata {
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub shared: Option<bool>,
    pub shared_with: Option<Vec<DbId>>,
}
