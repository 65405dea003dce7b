//! Append-only activity trail models.

use maquette_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One recorded action. Rows are never updated or deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending an activity entry.
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub user_id: Option<DbId>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Filters for querying the trail.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    pub user_id: Option<DbId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}

/// A page of activity entries with the unclamped total.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogPage {
    pub entries: Vec<ActivityLog>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
