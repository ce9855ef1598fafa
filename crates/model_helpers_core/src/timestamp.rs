//! Source/modification timestamp tracking for models.
//!
//! # Responsibility
//! - Hold when a record's data was fetched from its external source and when
//!   the record was last changed programmatically.
//! - Answer freshness questions against caller-supplied minimums.
//!
//! # Invariants
//! - A record with either timestamp unset is never up to date.
//! - Timestamps change only through an explicit stamp; saving is separate.
//! - Stored instants are normalized to UTC.
//!
//! Hand edits are expected to leave `info_modified_timestamp` untouched, so
//! nothing here updates it implicitly on save.

use crate::model::{Column, ColumnType, FieldError, FieldValue, Model, ModelId};
use crate::repo::model_repo::{ModelRepository, RepoResult};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use log::debug;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

pub const INFO_TIMESTAMP: &str = "info_timestamp";
pub const INFO_MODIFIED_TIMESTAMP: &str = "info_modified_timestamp";

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("failed to read modification time of `{}`: {source}", path.display())]
    Mtime {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("local time `{0}` does not exist in the current timezone")]
    NonexistentLocalTime(NaiveDateTime),
}

/// Source of "now" for stamping.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant, for deterministic stamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// File modification time as an aware instant.
pub trait AwareMtime {
    fn aware_mtime(&self) -> Result<DateTime<Local>, TimestampError>;
}

impl AwareMtime for Path {
    fn aware_mtime(&self) -> Result<DateTime<Local>, TimestampError> {
        let modified = std::fs::metadata(self)
            .and_then(|metadata| metadata.modified())
            .map_err(|source| TimestampError::Mtime {
                path: self.to_path_buf(),
                source,
            })?;
        Ok(DateTime::<Local>::from(modified))
    }
}

/// Anything that can say when source data was retrieved.
pub trait InfoSource {
    fn info_timestamp(&self) -> Result<DateTime<Utc>, TimestampError>;
}

impl<Tz: TimeZone> InfoSource for DateTime<Tz> {
    fn info_timestamp(&self) -> Result<DateTime<Utc>, TimestampError> {
        Ok(self.with_timezone(&Utc))
    }
}

/// Naive values are read as local time; on a DST overlap the earlier
/// instant wins. A time inside a DST gap has no local instant and returns
/// [`TimestampError::NonexistentLocalTime`] instead of being shifted.
impl InfoSource for NaiveDateTime {
    fn info_timestamp(&self) -> Result<DateTime<Utc>, TimestampError> {
        Local
            .from_local_datetime(self)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or(TimestampError::NonexistentLocalTime(*self))
    }
}

impl InfoSource for SystemTime {
    fn info_timestamp(&self) -> Result<DateTime<Utc>, TimestampError> {
        Ok(DateTime::<Utc>::from(*self))
    }
}

impl InfoSource for Path {
    fn info_timestamp(&self) -> Result<DateTime<Utc>, TimestampError> {
        self.aware_mtime().map(|mtime| mtime.with_timezone(&Utc))
    }
}

impl InfoSource for PathBuf {
    fn info_timestamp(&self) -> Result<DateTime<Utc>, TimestampError> {
        self.as_path().info_timestamp()
    }
}

impl<T: InfoSource + ?Sized> InfoSource for &T {
    fn info_timestamp(&self) -> Result<DateTime<Utc>, TimestampError> {
        (**self).info_timestamp()
    }
}

/// The timestamp pair embedded in a tracked model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoTimestamps {
    /// When the data was last pulled from its external source.
    pub info_timestamp: Option<DateTime<Utc>>,
    /// When the data was last modified programmatically.
    pub info_modified_timestamp: Option<DateTime<Utc>>,
}

impl InfoTimestamps {
    pub fn new(info_timestamp: DateTime<Utc>, info_modified_timestamp: DateTime<Utc>) -> Self {
        Self {
            info_timestamp: Some(info_timestamp),
            info_modified_timestamp: Some(info_modified_timestamp),
        }
    }

    /// Returns whether both timestamps are set and meet the given minimums.
    ///
    /// A minimum equal to the stored value still counts as up to date.
    pub fn is_up_to_date(
        &self,
        minimum_info: Option<DateTime<Utc>>,
        minimum_modified: Option<DateTime<Utc>>,
    ) -> bool {
        let (Some(info), Some(modified)) = (self.info_timestamp, self.info_modified_timestamp)
        else {
            return false;
        };

        if minimum_info.is_some_and(|minimum| minimum > info) {
            return false;
        }

        !minimum_modified.is_some_and(|minimum| minimum > modified)
    }

    pub fn is_outdated(
        &self,
        minimum_info: Option<DateTime<Utc>>,
        minimum_modified: Option<DateTime<Utc>>,
    ) -> bool {
        !self.is_up_to_date(minimum_info, minimum_modified)
    }

    /// Records `source` as the info timestamp and `clock.now()` as the
    /// modification timestamp.
    ///
    /// # Errors
    /// Returns the source conversion error; nothing is changed in that case.
    pub fn stamp<S, C>(&mut self, source: &S, clock: &C) -> Result<(), TimestampError>
    where
        S: InfoSource + ?Sized,
        C: Clock + ?Sized,
    {
        let info = source.info_timestamp()?;
        let modified = clock.now();
        self.info_timestamp = Some(info);
        self.info_modified_timestamp = Some(modified);
        debug!(
            "event=add_timestamps module=timestamp status=ok info_timestamp={} info_modified_timestamp={}",
            info.to_rfc3339(),
            modified.to_rfc3339()
        );
        Ok(())
    }

    /// Column declarations for a model embedding this pair.
    pub fn columns() -> [Column; 2] {
        [
            Column::new(INFO_TIMESTAMP, ColumnType::Timestamp),
            Column::new(INFO_MODIFIED_TIMESTAMP, ColumnType::Timestamp),
        ]
    }

    pub fn handles_field(field: &str) -> bool {
        field == INFO_TIMESTAMP || field == INFO_MODIFIED_TIMESTAMP
    }

    pub fn field_values(&self) -> [(&'static str, FieldValue); 2] {
        [
            (INFO_TIMESTAMP, FieldValue::from(self.info_timestamp)),
            (
                INFO_MODIFIED_TIMESTAMP,
                FieldValue::from(self.info_modified_timestamp),
            ),
        ]
    }

    pub fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        let timestamp = value.optional(|value| value.into_timestamp(field))?;
        match field {
            INFO_TIMESTAMP => self.info_timestamp = timestamp,
            INFO_MODIFIED_TIMESTAMP => self.info_modified_timestamp = timestamp,
            other => {
                return Err(FieldError::UnknownField {
                    model: "InfoTimestamps",
                    field: other.to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            info_timestamp: row.get(INFO_TIMESTAMP)?,
            info_modified_timestamp: row.get(INFO_MODIFIED_TIMESTAMP)?,
        })
    }
}

/// Freshness checks and stamping for models embedding [`InfoTimestamps`].
pub trait Timestamped {
    fn timestamps(&self) -> &InfoTimestamps;

    fn timestamps_mut(&mut self) -> &mut InfoTimestamps;

    fn is_up_to_date(
        &self,
        minimum_info: Option<DateTime<Utc>>,
        minimum_modified: Option<DateTime<Utc>>,
    ) -> bool {
        self.timestamps()
            .is_up_to_date(minimum_info, minimum_modified)
    }

    fn is_outdated(
        &self,
        minimum_info: Option<DateTime<Utc>>,
        minimum_modified: Option<DateTime<Utc>>,
    ) -> bool {
        !self.is_up_to_date(minimum_info, minimum_modified)
    }

    /// Stamps with the wall clock as the modification time.
    fn add_timestamps<S: InfoSource + ?Sized>(&mut self, source: &S) -> Result<(), TimestampError> {
        self.add_timestamps_with_clock(source, &SystemClock)
    }

    fn add_timestamps_with_clock<S, C>(&mut self, source: &S, clock: &C) -> Result<(), TimestampError>
    where
        S: InfoSource + ?Sized,
        C: Clock + ?Sized,
    {
        self.timestamps_mut().stamp(source, clock)
    }

    /// Stamps, then saves through `repo`.
    fn add_timestamps_and_save<S, R>(&mut self, source: &S, repo: &R) -> RepoResult<ModelId>
    where
        Self: Model,
        S: InfoSource + ?Sized,
        R: ModelRepository<Self> + ?Sized,
    {
        self.add_timestamps(source)?;
        repo.save(self)
    }
}
