//! `model-helpers` command line entry point.
//!
//! Tracks files in a SQLite table, stamping each with its modification time
//! and answering whether the stored record is still fresh.

mod tracked_file;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::info;
use model_helpers_core::{
    core_version, CoreConfig, GetOrNew, Lookup, SqliteModelRepository, Timestamped,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracked_file::{migrations, TrackedFile};

const DEFAULT_DB_FILE_NAME: &str = "model_helpers.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "model-helpers")]
#[command(about = "Track files with source and modification timestamps")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file; overrides `[database] path`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record the current mtime and size of each file.
    Stamp {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Report whether a tracked file meets the given minimums.
    Check {
        file: PathBuf,
        /// Oldest acceptable source timestamp (RFC 3339).
        #[arg(long, value_parser = parse_instant)]
        min_info: Option<DateTime<Utc>>,
        /// Oldest acceptable modification timestamp (RFC 3339).
        #[arg(long, value_parser = parse_instant)]
        min_modified: Option<DateTime<Utc>>,
    },
    /// Print the core library version.
    Version,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CoreConfig::from_file(path)?,
        None => CoreConfig::default(),
    };
    config.logging.init()?;

    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }
    if config.database.path.is_none() {
        config.database.path = Some(PathBuf::from(DEFAULT_DB_FILE_NAME));
    }

    match cli.command {
        Command::Version => {
            println!("model_helpers_core version={}", core_version());
            Ok(ExitCode::SUCCESS)
        }
        Command::Stamp { files } => {
            let conn = config.database.open(&migrations()?)?;
            let repo = SqliteModelRepository::<TrackedFile>::new(&conn);
            for file in &files {
                let (tracked, created) = stamp_file(&repo, file)?;
                let status = if created { "created" } else { "updated" };
                println!("{status} {}", tracked.path);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            file,
            min_info,
            min_modified,
        } => {
            let conn = config.database.open(&migrations()?)?;
            let repo = SqliteModelRepository::<TrackedFile>::new(&conn);
            let (tracked, up_to_date) = check_file(&repo, &file, min_info, min_modified)?;
            if up_to_date {
                println!("up-to-date {}", tracked.path);
                Ok(ExitCode::SUCCESS)
            } else {
                println!("outdated {}", tracked.path);
                Ok(ExitCode::from(1))
            }
        }
    }
}

fn stamp_file(
    repo: &SqliteModelRepository<'_, TrackedFile>,
    file: &Path,
) -> Result<(TrackedFile, bool)> {
    let metadata =
        std::fs::metadata(file).with_context(|| format!("cannot stat `{}`", file.display()))?;
    let (mut tracked, created) = repo.get_or_new(&lookup_for(file))?;
    tracked.size_bytes = i64::try_from(metadata.len())
        .with_context(|| format!("`{}` is too large to track", file.display()))?;
    tracked.add_timestamps_and_save(file, repo)?;

    info!(
        "event=file_stamp module=cli status=ok created={created} path={}",
        tracked.path
    );
    Ok((tracked, created))
}

/// Untracked files are reported as outdated.
fn check_file(
    repo: &SqliteModelRepository<'_, TrackedFile>,
    file: &Path,
    min_info: Option<DateTime<Utc>>,
    min_modified: Option<DateTime<Utc>>,
) -> Result<(TrackedFile, bool)> {
    let (tracked, untracked) = repo.get_or_new(&lookup_for(file))?;
    let up_to_date = tracked.is_up_to_date(min_info, min_modified);
    info!(
        "event=file_check module=cli status=ok untracked={untracked} up_to_date={up_to_date} path={}",
        tracked.path
    );
    Ok((tracked, up_to_date))
}

/// Untracked or missing files resolve to their path as given.
fn lookup_for(file: &Path) -> Lookup {
    let key = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    Lookup::new().with("path", key.to_string_lossy().into_owned())
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}
