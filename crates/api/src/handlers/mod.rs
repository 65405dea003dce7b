//! HTTP handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod templates;
pub mod validation;
pub mod versions;
