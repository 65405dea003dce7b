//! Template lifecycle orchestration.
//!
//! Normalizes input, runs the validator, and drives the transactional write
//! paths in the repository layer. Validation is advisory: its outcome is
//! recorded alongside each version event but never blocks a save.
//! Ownership failures are reported as NotFound so template existence does
//! not leak across tenants.

use maquette_core::error::CoreError;
use maquette_core::sanitize::normalize_css;
use maquette_core::types::DbId;
use maquette_core::validation::ValidationReport;
use maquette_db::models::template::{
    CreateTemplate, Template, TemplateStatus, UpdateTemplate,
};
use maquette_db::models::template_version::{TemplateVersion, VersionContext};
use maquette_db::repositories::TemplateRepo;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_meta::ClientMeta;
use crate::services::audit;
use crate::state::AppState;

/// Input for creating a template. Content fields arrive raw from the client
/// and are normalized here.
#[derive(Debug)]
pub struct CreateInput {
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub css_content: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// Input for updating a template. `None` fields are left unchanged.
///
/// `css_content` is doubly optional: the outer `None` means the field was
/// absent (keep the stored CSS), while `Some(None)` means an explicit null
/// (clear the CSS, normalizing to the canonical empty string).
#[derive(Debug, Default)]
pub struct UpdateInput {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub html_content: Option<String>,
    pub css_content: Option<Option<String>>,
    pub change_description: Option<String>,
}

/// Outcome of a create, duplicate, or restore: the live template, the version
/// row the operation appended, and the advisory validation report.
#[derive(Debug)]
pub struct VersionedOutcome {
    pub template: Template,
    pub version: TemplateVersion,
    pub report: ValidationReport,
}

/// Outcome of an update: a version is only present when content changed.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub template: Template,
    pub version: Option<TemplateVersion>,
    pub report: Option<ValidationReport>,
}

/// Fetch a template scoped to its owner, or NotFound.
pub async fn get_owned(state: &AppState, id: DbId, owner_id: DbId) -> AppResult<Template> {
    TemplateRepo::find_owned(&state.pool, id, owner_id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Create a template with its first version, metadata, and validation record.
pub async fn create(
    state: &AppState,
    user: &AuthUser,
    meta: &ClientMeta,
    input: CreateInput,
) -> AppResult<VersionedOutcome> {
    let name = required_trimmed(&input.name, "name")?;
    let subject = required_trimmed(&input.subject, "subject")?;
    if input.html_content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "html_content must not be blank".into(),
        )));
    }
    let css = normalize_css(input.css_content.as_deref()).into_owned();

    let report = state.validator.validate(&input.html_content, &css);

    let create = CreateTemplate {
        owner_id: user.user_id,
        name,
        subject,
        html_content: input.html_content,
        css_content: css,
        category: input.category,
        tags: input.tags,
    };
    let ctx = version_context(user, meta);
    let (template, version) = TemplateRepo::create(&state.pool, &create, &report, &ctx).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "template.created",
        "template",
        template.id,
        Some(json!({ "name": template.name })),
        meta,
    );

    Ok(VersionedOutcome {
        template,
        version,
        report,
    })
}

/// Update a template. Name and subject changes never touch the history; a
/// new version is appended only when the effective HTML or CSS differs from
/// the stored content after normalization.
pub async fn update(
    state: &AppState,
    user: &AuthUser,
    meta: &ClientMeta,
    id: DbId,
    input: UpdateInput,
) -> AppResult<UpdateOutcome> {
    let current = get_owned(state, id, user.user_id).await?;

    let effective_html = input
        .html_content
        .unwrap_or_else(|| current.html_content.clone());
    let effective_css = match input.css_content {
        Some(css) => normalize_css(css.as_deref()).into_owned(),
        None => current.css_content.clone(),
    };
    let content_changed =
        effective_html != current.html_content || effective_css != current.css_content;

    let mut template = current;

    if input.name.is_some() || input.subject.is_some() {
        let fields = UpdateTemplate {
            name: input.name.as_deref().map(str::trim).map(String::from),
            subject: input.subject.as_deref().map(str::trim).map(String::from),
            ..Default::default()
        };
        if fields.name.as_deref() == Some("") || fields.subject.as_deref() == Some("") {
            return Err(AppError::Core(CoreError::Validation(
                "name and subject must not be blank".into(),
            )));
        }
        template = TemplateRepo::update_fields(&state.pool, id, user.user_id, &fields)
            .await?
            .ok_or_else(|| not_found(id))?;
    }

    if !content_changed {
        return Ok(UpdateOutcome {
            template,
            version: None,
            report: None,
        });
    }

    let report = state.validator.validate(&effective_html, &effective_css);
    let description = input
        .change_description
        .unwrap_or_else(|| "Content updated".to_string());
    let ctx = version_context(user, meta);

    let (template, version) = TemplateRepo::update_content(
        &state.pool,
        id,
        user.user_id,
        &effective_html,
        &effective_css,
        &description,
        &report,
        &ctx,
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    audit::record(
        &state.pool,
        user.user_id,
        "template.updated",
        "template",
        id,
        Some(json!({ "version": version.version_number })),
        meta,
    );

    Ok(UpdateOutcome {
        template,
        version: Some(version),
        report: Some(report),
    })
}

/// Duplicate a template into a fresh one with its own history starting at 1.
pub async fn duplicate(
    state: &AppState,
    user: &AuthUser,
    meta: &ClientMeta,
    id: DbId,
    new_name: Option<String>,
) -> AppResult<VersionedOutcome> {
    let source = get_owned(state, id, user.user_id).await?;

    let name = match new_name {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => format!("{} (copy)", source.name),
    };
    let report = state
        .validator
        .validate(&source.html_content, &source.css_content);
    let description = format!("Duplicated from \"{}\"", source.name);
    let ctx = version_context(user, meta);

    let (template, version) = TemplateRepo::duplicate(
        &state.pool,
        id,
        user.user_id,
        &name,
        &description,
        &report,
        &ctx,
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    audit::record(
        &state.pool,
        user.user_id,
        "template.duplicated",
        "template",
        template.id,
        Some(json!({ "source_id": id })),
        meta,
    );

    Ok(VersionedOutcome {
        template,
        version,
        report,
    })
}

/// Archive a template (default delete) or physically remove it (`hard`).
pub async fn delete(
    state: &AppState,
    user: &AuthUser,
    meta: &ClientMeta,
    id: DbId,
    hard: bool,
) -> AppResult<()> {
    if hard {
        let removed = TemplateRepo::hard_delete(&state.pool, id, user.user_id).await?;
        if !removed {
            return Err(not_found(id));
        }
        audit::record(
            &state.pool,
            user.user_id,
            "template.deleted",
            "template",
            id,
            None,
            meta,
        );
    } else {
        TemplateRepo::set_status(&state.pool, id, user.user_id, TemplateStatus::Archived)
            .await?
            .ok_or_else(|| not_found(id))?;
        audit::record(
            &state.pool,
            user.user_id,
            "template.archived",
            "template",
            id,
            None,
            meta,
        );
    }
    Ok(())
}

/// Bring an archived template back into circulation.
pub async fn unarchive(
    state: &AppState,
    user: &AuthUser,
    meta: &ClientMeta,
    id: DbId,
) -> AppResult<Template> {
    let template = TemplateRepo::set_status(&state.pool, id, user.user_id, TemplateStatus::Active)
        .await?
        .ok_or_else(|| not_found(id))?;
    audit::record(
        &state.pool,
        user.user_id,
        "template.restored",
        "template",
        id,
        None,
        meta,
    );
    Ok(template)
}

/// Require a non-blank field, trimming surrounding whitespace.
fn required_trimmed(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} must not be blank"
        ))));
    }
    Ok(trimmed.to_string())
}

fn version_context(user: &AuthUser, meta: &ClientMeta) -> VersionContext {
    VersionContext {
        user_id: user.user_id,
        ip_address: meta.ip_address.clone(),
        user_agent: meta.user_agent.clone(),
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "template",
        id,
    })
}
