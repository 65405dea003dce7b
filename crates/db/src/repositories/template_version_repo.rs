//! Repository for the `template_versions` table.

use maquette_core::types::DbId;
use sqlx::PgPool;

use crate::models::template_version::{
    TemplateVersion, VersionComparison, VersionDiff, VersionStatistics, VersionSummary,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, template_id, version_number, html_content, css_content, \
    change_description, created_by, ip_address, user_agent, created_at";

/// Columns for history listings, which leave the content payloads out.
const SUMMARY_COLUMNS: &str =
    "id, template_id, version_number, change_description, created_by, created_at";

/// Outcome of a version delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionDeletion {
    Deleted,
    /// The highest-numbered version backs the live content and cannot go.
    LatestProtected,
    NotFound,
}

/// Provides read and delete operations over a template's history.
///
/// Versions are appended by [`TemplateRepo`](crate::repositories::TemplateRepo)
/// inside its transactional write paths; this repo never inserts.
pub struct TemplateVersionRepo;

impl TemplateVersionRepo {
    /// Find one version by its number within a template's history.
    pub async fn find_by_number(
        pool: &PgPool,
        template_id: DbId,
        version_number: i32,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_versions \
             WHERE template_id = $1 AND version_number = $2"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(template_id)
            .bind(version_number)
            .fetch_optional(pool)
            .await
    }

    /// Find the highest-numbered version of a template.
    pub async fn find_latest(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_versions \
             WHERE template_id = $1 \
             ORDER BY version_number DESC LIMIT 1"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(template_id)
            .fetch_optional(pool)
            .await
    }

    /// List a template's history newest-first, without content payloads.
    pub async fn list(
        pool: &PgPool,
        template_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VersionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM template_versions \
             WHERE template_id = $1 \
             ORDER BY version_number DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, VersionSummary>(&query)
            .bind(template_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count the versions in a template's history.
    pub async fn count(pool: &PgPool, template_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM template_versions WHERE template_id = $1",
        )
        .bind(template_id)
        .fetch_one(pool)
        .await
    }

    /// Fetch two versions of the same template and flag which fields differ.
    /// Returns `None` if either version is missing.
    pub async fn compare(
        pool: &PgPool,
        template_id: DbId,
        version_a: i32,
        version_b: i32,
    ) -> Result<Option<VersionComparison>, sqlx::Error> {
        let Some(a) = Self::find_by_number(pool, template_id, version_a).await? else {
            return Ok(None);
        };
        let Some(b) = Self::find_by_number(pool, template_id, version_b).await? else {
            return Ok(None);
        };

        let html_changed = a.html_content != b.html_content;
        let css_changed = a.css_content != b.css_content;
        Ok(Some(VersionComparison {
            template_id,
            differences: VersionDiff {
                html_changed,
                css_changed,
                any_changes: html_changed || css_changed,
            },
            version_a: a,
            version_b: b,
        }))
    }

    /// Delete one historical version. The latest version is protected because
    /// the live template mirrors it.
    pub async fn delete(
        pool: &PgPool,
        template_id: DbId,
        version_number: i32,
    ) -> Result<VersionDeletion, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Lock the history rows so the max cannot move under us.
        let latest: Option<i32> = sqlx::query_scalar::<_, i32>(
            "SELECT version_number FROM template_versions \
             WHERE template_id = $1 \
             ORDER BY version_number DESC LIMIT 1 \
             FOR UPDATE",
        )
        .bind(template_id)
        .fetch_optional(&mut *tx)
        .await?;

        match latest {
            None => return Ok(VersionDeletion::NotFound),
            Some(max) if max == version_number => {
                return Ok(VersionDeletion::LatestProtected);
            }
            Some(_) => {}
        }

        let result = sqlx::query(
            "DELETE FROM template_versions WHERE template_id = $1 AND version_number = $2",
        )
        .bind(template_id)
        .bind(version_number)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        if result.rows_affected() > 0 {
            Ok(VersionDeletion::Deleted)
        } else {
            Ok(VersionDeletion::NotFound)
        }
    }

    /// History aggregates for one template.
    pub async fn statistics(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<VersionStatistics, sqlx::Error> {
        sqlx::query_as::<_, VersionStatistics>(
            "SELECT
                COUNT(*)::BIGINT AS version_count,
                MAX(version_number) AS latest_version,
                MIN(created_at) AS first_created_at,
                MAX(created_at) AS last_created_at,
                COUNT(DISTINCT created_by)::BIGINT AS distinct_authors
             FROM template_versions
             WHERE template_id = $1",
        )
        .bind(template_id)
        .fetch_one(pool)
        .await
    }
}
