//! Repositories: one zero-sized struct per table, methods take a `&PgPool`.

pub mod activity_log_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod template_metadata_repo;
pub mod template_repo;
pub mod template_version_repo;
pub mod user_repo;
pub mod validation_record_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use session_repo::SessionRepo;
pub use stats_repo::StatsRepo;
pub use template_metadata_repo::TemplateMetadataRepo;
pub use template_repo::TemplateRepo;
pub use template_version_repo::{TemplateVersionRepo, VersionDeletion};
pub use user_repo::UserRepo;
pub use validation_record_repo::ValidationRecordRepo;
