//! Repository for the `validation_records` table.
//!
//! Records are written inside the template repository's transactions; this
//! repo only serves reads.

use maquette_core::types::DbId;
use sqlx::PgPool;

use crate::models::validation_record::ValidationRecord;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, template_id, is_valid, html_valid, css_valid, \
    errors, warnings, html_size, css_size, validated_at";

/// Lookups over stored validation outcomes.
pub struct ValidationRecordRepo;

impl ValidationRecordRepo {
    /// The most recent validation outcome for a template.
    pub async fn find_latest(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Option<ValidationRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM validation_records \
             WHERE template_id = $1 \
             ORDER BY validated_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, ValidationRecord>(&query)
            .bind(template_id)
            .fetch_optional(pool)
            .await
    }
}
