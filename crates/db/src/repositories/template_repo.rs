//! Repository for the `templates` table and its multi-row write paths.
//!
//! Creation, content updates, restores, and duplication each touch several
//! tables, so those operations run inside a single transaction here. Version
//! numbers are assigned by the store inside the insert, which keeps them
//! gap-free under concurrent writers.

use maquette_core::types::DbId;
use maquette_core::validation::ValidationReport;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::template::{
    CreateTemplate, Template, TemplateFilter, TemplatePage, TemplateStatistics, TemplateStatus,
    UpdateTemplate,
};
use crate::models::template_version::{TemplateVersion, VersionContext};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, subject, html_content, css_content, \
    status, created_at, updated_at";

/// Same columns qualified with the `t.` alias, for joined queries.
const T_COLUMNS: &str = "t.id, t.owner_id, t.name, t.subject, t.html_content, \
    t.css_content, t.status, t.created_at, t.updated_at";

/// Version columns, used by the write paths that return the appended version.
const VERSION_COLUMNS: &str = "id, template_id, version_number, html_content, css_content, \
    change_description, created_by, ip_address, user_agent, created_at";

/// Provides CRUD, search, and versioned write operations for templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Create a template together with version 1, its metadata row, and the
    /// validation record of the initial content. All four inserts commit
    /// atomically.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTemplate,
        report: &ValidationReport,
        ctx: &VersionContext,
    ) -> Result<(Template, TemplateVersion), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO templates (owner_id, name, subject, html_content, css_content)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, Template>(&query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(&input.subject)
            .bind(&input.html_content)
            .bind(&input.css_content)
            .fetch_one(&mut *tx)
            .await?;

        let version = insert_version(
            &mut tx,
            template.id,
            &input.html_content,
            &input.css_content,
            "Initial version",
            ctx,
        )
        .await?;

        sqlx::query(
            "INSERT INTO template_metadata (template_id, category, tags) VALUES ($1, $2, $3)",
        )
        .bind(template.id)
        .bind(&input.category)
        .bind(Json(&input.tags))
        .execute(&mut *tx)
        .await?;

        insert_validation_record(&mut tx, template.id, report).await?;

        tx.commit().await?;
        Ok((template, version))
    }

    /// Find a template by ID. Deleted templates are invisible.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1 AND status <> 'deleted'");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template by ID scoped to its owner. Deleted templates are invisible.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE id = $1 AND owner_id = $2 AND status <> 'deleted'"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's templates with optional filters, newest-updated first.
    /// Returns the page plus the unclamped total for the same filter.
    pub async fn list(pool: &PgPool, filter: &TemplateFilter) -> Result<TemplatePage, sqlx::Error> {
        let (where_clause, binds, next_idx) = build_filter(filter);

        let query = format!(
            "SELECT {T_COLUMNS} FROM templates t \
             JOIN template_metadata m ON m.template_id = t.id \
             {where_clause} \
             ORDER BY t.updated_at DESC \
             LIMIT ${next_idx} OFFSET ${}",
            next_idx + 1
        );
        let mut q = sqlx::query_as::<_, Template>(&query).bind(filter.owner_id);
        q = bind_filter_values(q, &binds);
        let templates = q
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*)::BIGINT FROM templates t \
             JOIN template_metadata m ON m.template_id = t.id \
             {where_clause}"
        );
        let mut cq = sqlx::query_scalar::<_, i64>(&count_query).bind(filter.owner_id);
        for value in &binds {
            cq = match value {
                FilterBind::Text(v) => cq.bind(v.as_str()),
                FilterBind::Bool(v) => cq.bind(*v),
                FilterBind::Status(v) => cq.bind(*v),
            };
        }
        let total = cq.fetch_one(pool).await?;

        Ok(TemplatePage {
            templates,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    /// Update name and subject only. Content updates go through
    /// [`TemplateRepo::update_content`] so they leave a version behind.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET
                name = COALESCE($3, name),
                subject = COALESCE($4, subject),
                updated_at = NOW()
             WHERE id = $1 AND owner_id = $2 AND status <> 'deleted'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.subject)
            .fetch_optional(pool)
            .await
    }

    /// Replace the live content and append the matching version row and
    /// validation record in one transaction. Returns `None` when the template
    /// is missing or not owned by `owner_id`.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        html_content: &str,
        css_content: &str,
        change_description: &str,
        report: &ValidationReport,
        ctx: &VersionContext,
    ) -> Result<Option<(Template, TemplateVersion)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE templates SET
                html_content = $3,
                css_content = $4,
                updated_at = NOW()
             WHERE id = $1 AND owner_id = $2 AND status <> 'deleted'
             RETURNING {COLUMNS}"
        );
        let Some(template) = sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(html_content)
            .bind(css_content)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let version = insert_version(
            &mut tx,
            id,
            html_content,
            css_content,
            change_description,
            ctx,
        )
        .await?;
        insert_validation_record(&mut tx, id, report).await?;

        tx.commit().await?;
        Ok(Some((template, version)))
    }

    /// Copy a historical version's content back into the live template and
    /// append it as a new version. The history is never rewritten.
    ///
    /// Returns `None` when the template is not owned or the version is missing.
    #[allow(clippy::too_many_arguments)]
    pub async fn restore_version(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        version_number: i32,
        change_description: &str,
        report: &ValidationReport,
        ctx: &VersionContext,
    ) -> Result<Option<(Template, TemplateVersion)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM template_versions \
             WHERE template_id = $1 AND version_number = $2"
        );
        let Some(source) = sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(id)
            .bind(version_number)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE templates SET
                html_content = $3,
                css_content = $4,
                updated_at = NOW()
             WHERE id = $1 AND owner_id = $2 AND status <> 'deleted'
             RETURNING {COLUMNS}"
        );
        let Some(template) = sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&source.html_content)
            .bind(&source.css_content)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let version = insert_version(
            &mut tx,
            id,
            &source.html_content,
            &source.css_content,
            change_description,
            ctx,
        )
        .await?;
        insert_validation_record(&mut tx, id, report).await?;

        tx.commit().await?;
        Ok(Some((template, version)))
    }

    /// Clone a template into a fresh one owned by the same user. The copy
    /// starts its own history at version 1 and inherits category and tags,
    /// but not usage counters or sharing.
    #[allow(clippy::too_many_arguments)]
    pub async fn duplicate(
        pool: &PgPool,
        source_id: DbId,
        owner_id: DbId,
        new_name: &str,
        change_description: &str,
        report: &ValidationReport,
        ctx: &VersionContext,
    ) -> Result<Option<(Template, TemplateVersion)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE id = $1 AND owner_id = $2 AND status <> 'deleted'"
        );
        let Some(source) = sqlx::query_as::<_, Template>(&query)
            .bind(source_id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO templates (owner_id, name, subject, html_content, css_content)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let copy = sqlx::query_as::<_, Template>(&query)
            .bind(owner_id)
            .bind(new_name)
            .bind(&source.subject)
            .bind(&source.html_content)
            .bind(&source.css_content)
            .fetch_one(&mut *tx)
            .await?;

        let version = insert_version(
            &mut tx,
            copy.id,
            &source.html_content,
            &source.css_content,
            change_description,
            ctx,
        )
        .await?;

        sqlx::query(
            "INSERT INTO template_metadata (template_id, category, tags)
             SELECT $1, category, tags FROM template_metadata WHERE template_id = $2",
        )
        .bind(copy.id)
        .bind(source_id)
        .execute(&mut *tx)
        .await?;

        insert_validation_record(&mut tx, copy.id, report).await?;

        tx.commit().await?;
        Ok(Some((copy, version)))
    }

    /// Move a template between lifecycle states. Returns the updated row, or
    /// `None` if the template is missing, not owned, or already deleted.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        status: TemplateStatus,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET status = $3, updated_at = NOW()
             WHERE id = $1 AND owner_id = $2 AND status <> 'deleted'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Physically remove a template; versions, metadata, and validation
    /// records go with it via cascade. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Per-owner aggregate counters across non-deleted templates.
    pub async fn statistics(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<TemplateStatistics, sqlx::Error> {
        sqlx::query_as::<_, TemplateStatistics>(
            "SELECT
                COUNT(*) FILTER (WHERE t.status <> 'deleted')::BIGINT AS total,
                COUNT(*) FILTER (WHERE t.status = 'active')::BIGINT AS active,
                COUNT(*) FILTER (WHERE t.status = 'archived')::BIGINT AS archived,
                COUNT(*) FILTER (WHERE m.favorite AND t.status <> 'deleted')::BIGINT AS favorites,
                COALESCE(SUM(m.usage_count) FILTER (WHERE t.status <> 'deleted'), 0)::BIGINT
                    AS total_usage
             FROM templates t
             JOIN template_metadata m ON m.template_id = t.id
             WHERE t.owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await
    }
}

/// Append a version row, letting the store assign the next number.
async fn insert_version(
    tx: &mut Transaction<'_, Postgres>,
    template_id: DbId,
    html_content: &str,
    css_content: &str,
    change_description: &str,
    ctx: &VersionContext,
) -> Result<TemplateVersion, sqlx::Error> {
    let query = format!(
        "INSERT INTO template_versions
            (template_id, version_number, html_content, css_content,
             change_description, created_by, ip_address, user_agent)
         VALUES (
            $1,
            (SELECT COALESCE(MAX(version_number), 0) + 1 FROM template_versions
             WHERE template_id = $1),
            $2, $3, $4, $5, $6, $7
         )
         RETURNING {VERSION_COLUMNS}"
    );
    sqlx::query_as::<_, TemplateVersion>(&query)
        .bind(template_id)
        .bind(html_content)
        .bind(css_content)
        .bind(change_description)
        .bind(ctx.user_id)
        .bind(&ctx.ip_address)
        .bind(&ctx.user_agent)
        .fetch_one(&mut **tx)
        .await
}

/// Persist a validation report inside an open transaction.
async fn insert_validation_record(
    tx: &mut Transaction<'_, Postgres>,
    template_id: DbId,
    report: &ValidationReport,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO validation_records
            (template_id, is_valid, html_valid, css_valid, errors, warnings, html_size, css_size)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(template_id)
    .bind(report.is_valid)
    .bind(report.html_valid)
    .bind(report.css_valid)
    .bind(Json(&report.errors))
    .bind(Json(&report.warnings))
    .bind(report.html_size as i64)
    .bind(report.css_size as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Typed bind value for the dynamically-built list filter.
enum FilterBind {
    Text(String),
    Bool(bool),
    Status(TemplateStatus),
}

/// Build the WHERE clause for [`TemplateRepo::list`].
///
/// `$1` is always the owner ID; returns `(where_clause, binds, next_bind_index)`.
fn build_filter(filter: &TemplateFilter) -> (String, Vec<FilterBind>, u32) {
    let mut conditions = vec![
        "t.owner_id = $1".to_string(),
        "t.status <> 'deleted'".to_string(),
    ];
    let mut bind_idx = 2u32;
    let mut binds: Vec<FilterBind> = Vec::new();

    if let Some(status) = filter.status {
        conditions.push(format!("t.status = ${bind_idx}"));
        bind_idx += 1;
        binds.push(FilterBind::Status(status));
    }

    if let Some(ref category) = filter.category {
        conditions.push(format!("m.category = ${bind_idx}"));
        bind_idx += 1;
        binds.push(FilterBind::Text(category.clone()));
    }

    if let Some(favorite) = filter.favorite {
        conditions.push(format!("m.favorite = ${bind_idx}"));
        bind_idx += 1;
        binds.push(FilterBind::Bool(favorite));
    }

    if let Some(ref search) = filter.search {
        conditions.push(format!(
            "(t.name ILIKE ${bind_idx} OR t.subject ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        binds.push(FilterBind::Text(format!("%{search}%")));
    }

    (format!("WHERE {}", conditions.join(" AND ")), binds, bind_idx)
}

/// Bind the filter values to a `QueryAs` in declaration order.
fn bind_filter_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, Postgres, O, sqlx::postgres::PgArguments>,
    binds: &'q [FilterBind],
) -> sqlx::query::QueryAs<'q, Postgres, O, sqlx::postgres::PgArguments> {
    for value in binds {
        q = match value {
            FilterBind::Text(v) => q.bind(v.as_str()),
            FilterBind::Bool(v) => q.bind(*v),
            FilterBind::Status(v) => q.bind(*v),
        };
    }
    q
}
