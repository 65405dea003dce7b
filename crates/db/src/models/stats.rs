//! Platform-wide aggregate counters for the admin surface.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlatformStatistics {
    pub total_users: i64,
    pub active_users: i64,
    pub total_templates: i64,
    pub total_versions: i64,
    pub total_validations: i64,
}
