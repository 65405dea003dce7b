//! Version ledger orchestration: ownership checks, restore, and protected
//! deletion on top of the version repository.

use maquette_core::error::CoreError;
use maquette_core::types::DbId;
use maquette_db::repositories::{TemplateRepo, TemplateVersionRepo, VersionDeletion};
use maquette_db::models::template_version::{TemplateVersion, VersionContext};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_meta::ClientMeta;
use crate::services::audit;
use crate::services::template_service;
use crate::state::AppState;

/// Fetch one version of an owned template, or NotFound.
pub async fn get_version(
    state: &AppState,
    user: &AuthUser,
    template_id: DbId,
    version_number: i32,
) -> AppResult<TemplateVersion> {
    template_service::get_owned(state, template_id, user.user_id).await?;
    TemplateVersionRepo::find_by_number(&state.pool, template_id, version_number)
        .await?
        .ok_or_else(|| version_not_found(version_number))
}

/// Copy a historical version back into the live template as a new version.
pub async fn restore(
    state: &AppState,
    user: &AuthUser,
    meta: &ClientMeta,
    template_id: DbId,
    version_number: i32,
) -> AppResult<template_service::VersionedOutcome> {
    template_service::get_owned(state, template_id, user.user_id).await?;

    let source = TemplateVersionRepo::find_by_number(&state.pool, template_id, version_number)
        .await?
        .ok_or_else(|| version_not_found(version_number))?;

    let report = state
        .validator
        .validate(&source.html_content, &source.css_content);
    let description = format!("Restored version {version_number}");
    let ctx = VersionContext {
        user_id: user.user_id,
        ip_address: meta.ip_address.clone(),
        user_agent: meta.user_agent.clone(),
    };

    let (template, version) = TemplateRepo::restore_version(
        &state.pool,
        template_id,
        user.user_id,
        version_number,
        &description,
        &report,
        &ctx,
    )
    .await?
    .ok_or_else(|| version_not_found(version_number))?;

    audit::record(
        &state.pool,
        user.user_id,
        "version.restored",
        "template",
        template_id,
        Some(json!({
            "restored_version": version_number,
            "new_version": version.version_number,
        })),
        meta,
    );

    Ok(template_service::VersionedOutcome {
        template,
        version,
        report,
    })
}

/// Delete one historical version. The latest version backs the live content
/// and is rejected with a validation error.
pub async fn delete(
    state: &AppState,
    user: &AuthUser,
    meta: &ClientMeta,
    template_id: DbId,
    version_number: i32,
) -> AppResult<()> {
    template_service::get_owned(state, template_id, user.user_id).await?;

    match TemplateVersionRepo::delete(&state.pool, template_id, version_number).await? {
        VersionDeletion::Deleted => {
            audit::record(
                &state.pool,
                user.user_id,
                "version.deleted",
                "template",
                template_id,
                Some(json!({ "version": version_number })),
                meta,
            );
            Ok(())
        }
        VersionDeletion::LatestProtected => Err(AppError::Core(CoreError::Validation(
            "The latest version cannot be deleted".into(),
        ))),
        VersionDeletion::NotFound => Err(version_not_found(version_number)),
    }
}

fn version_not_found(version_number: i32) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "template_version",
        id: version_number as i64,
    })
}
