//! Platform-wide counters for the admin surface.

use sqlx::PgPool;

use crate::models::stats::PlatformStatistics;

pub struct StatsRepo;

impl StatsRepo {
    /// One-shot aggregate across users, templates, versions, and validations.
    pub async fn platform(pool: &PgPool) -> Result<PlatformStatistics, sqlx::Error> {
        sqlx::query_as::<_, PlatformStatistics>(
            "SELECT
                (SELECT COUNT(*) FROM users)::BIGINT AS total_users,
                (SELECT COUNT(*) FROM users WHERE is_active)::BIGINT AS active_users,
                (SELECT COUNT(*) FROM templates WHERE status <> 'deleted')::BIGINT
                    AS total_templates,
                (SELECT COUNT(*) FROM template_versions)::BIGINT AS total_versions,
                (SELECT COUNT(*) FROM validation_records)::BIGINT AS total_validations",
        )
        .fetch_one(pool)
        .await
    }
}
