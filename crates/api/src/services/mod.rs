//! Service layer: lifecycle orchestration and cross-cutting helpers that sit
//! between the HTTP handlers and the repositories.

pub mod audit;
pub mod template_service;
pub mod version_service;
