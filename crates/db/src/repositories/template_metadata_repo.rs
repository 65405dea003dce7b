//! Repository for the `template_metadata` table.

use maquette_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::template_metadata::{TemplateMetadata, UpdateTemplateMetadata};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, template_id, category, tags, usage_count, \
    last_used_at, favorite, shared, shared_with";

/// Provides lookup and patch operations for template metadata.
pub struct TemplateMetadataRepo;

impl TemplateMetadataRepo {
    /// Find the metadata row for a template.
    pub async fn find_by_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Option<TemplateMetadata>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM template_metadata WHERE template_id = $1");
        sqlx::query_as::<_, TemplateMetadata>(&query)
            .bind(template_id)
            .fetch_optional(pool)
            .await
    }

    /// Patch metadata. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        template_id: DbId,
        input: &UpdateTemplateMetadata,
    ) -> Result<Option<TemplateMetadata>, sqlx::Error> {
        let query = format!(
            "UPDATE template_metadata SET
                category = COALESCE($2, category),
                tags = COALESCE($3, tags),
                shared = COALESCE($4, shared),
                shared_with = COALESCE($5, shared_with)
             WHERE template_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateMetadata>(&query)
            .bind(template_id)
            .bind(&input.category)
            .bind(input.tags.as_ref().map(Json))
            .bind(input.shared)
            .bind(input.shared_with.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Flip the favorite flag. Returns the updated row if it exists.
    pub async fn toggle_favorite(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Option<TemplateMetadata>, sqlx::Error> {
        let query = format!(
            "UPDATE template_metadata SET favorite = NOT favorite
             WHERE template_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateMetadata>(&query)
            .bind(template_id)
            .fetch_optional(pool)
            .await
    }

    /// Bump the usage counter and stamp the time of use.
    pub async fn record_use(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Option<TemplateMetadata>, sqlx::Error> {
        let query = format!(
            "UPDATE template_metadata SET
                usage_count = usage_count + 1,
                last_used_at = NOW()
             WHERE template_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateMetadata>(&query)
            .bind(template_id)
            .fetch_optional(pool)
            .await
    }

    /// Add a tag if not already present. Returns the updated row if it exists.
    pub async fn add_tag(
        pool: &PgPool,
        template_id: DbId,
        tag: &str,
    ) -> Result<Option<TemplateMetadata>, sqlx::Error> {
        let query = format!(
            "UPDATE template_metadata SET tags =
                CASE WHEN tags ? $2 THEN tags
                     ELSE tags || jsonb_build_array($2::text) END
             WHERE template_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateMetadata>(&query)
            .bind(template_id)
            .bind(tag)
            .fetch_optional(pool)
            .await
    }

    /// Remove a tag if present. Returns the updated row if it exists.
    pub async fn remove_tag(
        pool: &PgPool,
        template_id: DbId,
        tag: &str,
    ) -> Result<Option<TemplateMetadata>, sqlx::Error> {
        let query = format!(
            "UPDATE template_metadata SET tags = tags - $2::text
             WHERE template_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateMetadata>(&query)
            .bind(template_id)
            .bind(tag)
            .fetch_optional(pool)
            .await
    }

    /// Distinct tags across an owner's non-deleted templates, sorted.
    pub async fn list_tags(pool: &PgPool, owner_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT tag
             FROM template_metadata m
             JOIN templates t ON t.id = m.template_id,
                  jsonb_array_elements_text(m.tags) AS tag
             WHERE t.owner_id = $1 AND t.status <> 'deleted'
             ORDER BY tag",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Distinct categories across an owner's non-deleted templates, sorted.
    pub async fn list_categories(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT m.category
             FROM template_metadata m
             JOIN templates t ON t.id = m.template_id
             WHERE t.owner_id = $1 AND t.status <> 'deleted' AND m.category IS NOT NULL
             ORDER BY m.category",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }
}
