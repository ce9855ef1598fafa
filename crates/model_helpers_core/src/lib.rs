//! Helpers layered over SQLite-backed models.
//!
//! Provides deterministic unique-constraint naming, a get-or-new lookup that
//! never persists on its own, and source/modification timestamp tracking with
//! freshness checks.

pub mod config;
pub mod constraint;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod timestamp;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use constraint::{auto_unique, auto_unique_for, ConstraintError, UniqueConstraint};
pub use db::{DbError, DbResult, Migration};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{Column, ColumnType, FieldError, FieldValue, Lookup, Model, ModelId};
pub use repo::get_or_new::GetOrNew;
pub use repo::model_repo::{ModelRepository, RepoError, RepoResult, SqliteModelRepository};
pub use timestamp::{
    AwareMtime, Clock, FixedClock, InfoSource, InfoTimestamps, SystemClock, TimestampError,
    Timestamped,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
