//! Entity models and DTOs, one module per table.

pub mod activity_log;
pub mod session;
pub mod stats;
pub mod template;
pub mod template_metadata;
pub mod template_version;
pub mod user;
pub mod validation_record;
