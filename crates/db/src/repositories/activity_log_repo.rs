//! Repository for the append-only `activity_logs` table.

use maquette_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity_log::{
    ActivityLog, ActivityLogFilter, ActivityLogPage, CreateActivityLog,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, action, entity_type, entity_id, details, \
    ip_address, user_agent, created_at";

/// Provides append and query operations for the activity trail.
pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Append one entry.
    pub async fn create(
        pool: &PgPool,
        input: &CreateActivityLog,
    ) -> Result<ActivityLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_logs
                (user_id, action, entity_type, entity_id, details, ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(input.user_id)
            .bind(&input.action)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.details)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Query the trail with filters and pagination, newest first.
    pub async fn query(
        pool: &PgPool,
        filter: &ActivityLogFilter,
    ) -> Result<ActivityLogPage, sqlx::Error> {
        let (where_clause, binds, next_idx) = build_filter(filter);

        let query = format!(
            "SELECT {COLUMNS} FROM activity_logs {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${next_idx} OFFSET ${}",
            next_idx + 1
        );
        let mut q = sqlx::query_as::<_, ActivityLog>(&query);
        for value in &binds {
            q = match value {
                FilterBind::BigInt(v) => q.bind(*v),
                FilterBind::Text(v) => q.bind(v.as_str()),
            };
        }
        let entries = q
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*)::BIGINT FROM activity_logs {where_clause}");
        let mut cq = sqlx::query_scalar::<_, i64>(&count_query);
        for value in &binds {
            cq = match value {
                FilterBind::BigInt(v) => cq.bind(*v),
                FilterBind::Text(v) => cq.bind(v.as_str()),
            };
        }
        let total = cq.fetch_one(pool).await?;

        Ok(ActivityLogPage {
            entries,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }
}

/// Typed bind value for the dynamically-built trail filter.
enum FilterBind {
    BigInt(DbId),
    Text(String),
}

/// Build a WHERE clause and bind values from the filter.
///
/// Returns `(where_clause, binds, next_bind_index)`; the clause is empty when
/// no filters are active.
fn build_filter(filter: &ActivityLogFilter) -> (String, Vec<FilterBind>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut binds: Vec<FilterBind> = Vec::new();

    if let Some(user_id) = filter.user_id {
        conditions.push(format!("user_id = ${bind_idx}"));
        bind_idx += 1;
        binds.push(FilterBind::BigInt(user_id));
    }

    if let Some(ref action) = filter.action {
        conditions.push(format!("action = ${bind_idx}"));
        bind_idx += 1;
        binds.push(FilterBind::Text(action.clone()));
    }

    if let Some(ref entity_type) = filter.entity_type {
        conditions.push(format!("entity_type = ${bind_idx}"));
        bind_idx += 1;
        binds.push(FilterBind::Text(entity_type.clone()));
    }

    if let Some(entity_id) = filter.entity_id {
        conditions.push(format!("entity_id = ${bind_idx}"));
        bind_idx += 1;
        binds.push(FilterBind::BigInt(entity_id));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, binds, bind_idx)
}
