//! Persistence core for contact-form submissions.
//! Owns the contact record lifecycle: create, read, update, soft delete.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, LoggingError, LoggingOutcome};
pub use model::contact::{Contact, ContactId, ContactValidationError, Timestamp};
pub use repo::contact_repo::{
    ContactListQuery, ContactRepository, RepoError, RepoErrorKind, RepoResult,
    SqliteContactRepository,
};
pub use service::contact_service::{ContactService, ContactSubmission};

/// Minimal health-check API for smoke probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
