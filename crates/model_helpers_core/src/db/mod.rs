//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for model storage.
//! - Apply caller-supplied schema migrations in deterministic order.
//! - Render model tables and their unique indexes as migration SQL.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Application data must not be read or written before migrations succeed.

use thiserror::Error;

pub mod migrations;
mod open;
pub mod schema;

pub use migrations::Migration;
pub use open::{open_db, open_db_in_memory, open_db_with_timeout, DEFAULT_BUSY_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("migration versions must strictly increase, got {next} after {previous}")]
    InvalidMigrationOrder { previous: u32, next: u32 },
}
