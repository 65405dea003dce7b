//! Fire-and-forget activity logging.
//!
//! Audit writes must never fail or slow down the request that triggered
//! them, so they run on a detached task and failures are only logged.

use maquette_core::types::DbId;
use maquette_db::models::activity_log::CreateActivityLog;
use maquette_db::repositories::ActivityLogRepo;
use maquette_db::DbPool;

use crate::middleware::client_meta::ClientMeta;

/// Record an action against an entity, detached from the request path.
pub fn record(
    pool: &DbPool,
    user_id: DbId,
    action: &str,
    entity_type: &str,
    entity_id: DbId,
    details: Option<serde_json::Value>,
    meta: &ClientMeta,
) {
    let entry = CreateActivityLog {
        user_id: Some(user_id),
        action: action.to_string(),
        entity_type: Some(entity_type.to_string()),
        entity_id: Some(entity_id),
        details,
        ip_address: meta.ip_address.clone(),
        user_agent: meta.user_agent.clone(),
    };
    let pool = pool.clone();
    tokio::spawn(async move {
        if let Err(e) = ActivityLogRepo::create(&pool, &entry).await {
            tracing::warn!(error = %e, action = %entry.action, "Failed to write activity log");
        }
    });
}
