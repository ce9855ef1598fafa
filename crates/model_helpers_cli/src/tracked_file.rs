//! File record tracked by the CLI.
//!
//! # Invariants
//! - `path` is unique across the table (`TrackedFile_path`).
//! - `info_timestamp` mirrors the file mtime at the last `stamp` run.

use model_helpers_core::{
    auto_unique, Column, ColumnType, ConstraintError, FieldError, FieldValue, InfoTimestamps,
    Migration, Model, ModelId, Timestamped, UniqueConstraint,
};
use rusqlite::Row;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedFile {
    pub id: Option<ModelId>,
    pub path: String,
    pub size_bytes: i64,
    pub timestamps: InfoTimestamps,
}

impl Model for TrackedFile {
    const NAME: &'static str = "TrackedFile";
    const TABLE: &'static str = "tracked_files";

    fn columns() -> Vec<Column> {
        let mut columns = vec![
            Column::new("path", ColumnType::Text),
            Column::new("size_bytes", ColumnType::Integer),
        ];
        columns.extend(InfoTimestamps::columns());
        columns
    }

    fn unique_constraints() -> Result<Vec<UniqueConstraint>, ConstraintError> {
        Ok(vec![auto_unique::<Self>(&["path"])?])
    }

    fn id(&self) -> Option<ModelId> {
        self.id
    }

    fn set_id(&mut self, id: ModelId) {
        self.id = Some(id);
    }

    fn field_values(&self) -> Vec<(&'static str, FieldValue)> {
        let mut values = vec![
            ("path", FieldValue::from(self.path.as_str())),
            ("size_bytes", FieldValue::from(self.size_bytes)),
        ];
        values.extend(self.timestamps.field_values());
        values
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        match field {
            "path" => self.path = value.into_text(field)?,
            "size_bytes" => self.size_bytes = value.into_integer(field)?,
            _ if InfoTimestamps::handles_field(field) => {
                self.timestamps.set_field(field, value)?
            }
            other => {
                return Err(FieldError::UnknownField {
                    model: Self::NAME,
                    field: other.to_string(),
                })
            }
        }
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            path: row.get("path")?,
            size_bytes: row.get("size_bytes")?,
            timestamps: InfoTimestamps::from_row(row)?,
        })
    }
}

impl Timestamped for TrackedFile {
    fn timestamps(&self) -> &InfoTimestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut InfoTimestamps {
        &mut self.timestamps
    }
}

/// Schema for the CLI database.
pub fn migrations() -> Result<Vec<Migration>, ConstraintError> {
    Ok(vec![Migration::for_model::<TrackedFile>(1)?])
}
