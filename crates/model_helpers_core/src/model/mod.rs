//! Model contract shared by every persisted record type.
//!
//! # Responsibility
//! - Describe a record's table, columns and unique constraints.
//! - Move field values in and out of a record by field name.
//!
//! # Invariants
//! - Every model has an implicit integer primary key column named `id`.
//! - `id()` is `None` until the record has been saved.
//! - Column and table names are plain identifiers; repositories reject
//!   any field name that is not declared.

mod field;
mod lookup;

pub use field::{Column, ColumnType, FieldError, FieldValue};
pub use lookup::Lookup;

use crate::constraint::{ConstraintResult, UniqueConstraint};
use rusqlite::Row;

/// Auto-incremented primary key value.
pub type ModelId = i64;

/// Name of the implicit primary key column.
pub const ID_COLUMN: &str = "id";

/// A record type persisted in its own SQLite table.
pub trait Model: Sized {
    /// Type name used when generating constraint names.
    const NAME: &'static str;
    /// Backing table name.
    const TABLE: &'static str;

    /// Declared columns in storage order, excluding `id`.
    fn columns() -> Vec<Column>;

    /// Unique constraints enforced by the storage layer.
    ///
    /// Usually built with [`crate::auto_unique`].
    fn unique_constraints() -> ConstraintResult<Vec<UniqueConstraint>> {
        Ok(Vec::new())
    }

    fn id(&self) -> Option<ModelId>;

    fn set_id(&mut self, id: ModelId);

    /// Current values of every declared column, in `columns()` order.
    fn field_values(&self) -> Vec<(&'static str, FieldValue)>;

    /// Assigns one declared column by name.
    ///
    /// # Errors
    /// - [`FieldError::UnknownField`] when `field` is not a declared column.
    /// - [`FieldError::TypeMismatch`] when `value` has the wrong shape.
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError>;

    /// Decodes a row selected with `id` followed by every declared column.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Builds an unsaved record holding the values in `lookup`.
    ///
    /// A non-null `id` entry sets the primary key; everything else goes
    /// through [`Model::set_field`].
    fn from_lookup(lookup: &Lookup) -> Result<Self, FieldError>
    where
        Self: Default,
    {
        let mut record = Self::default();
        for (field, value) in lookup.iter() {
            if field == ID_COLUMN {
                if let Some(id) = value.clone().optional(|v| v.into_integer(ID_COLUMN))? {
                    record.set_id(id);
                }
            } else {
                record.set_field(field, value.clone())?;
            }
        }
        Ok(record)
    }

    /// `id` followed by every declared column name.
    fn column_names() -> Vec<&'static str> {
        std::iter::once(ID_COLUMN)
            .chain(Self::columns().into_iter().map(|column| column.name))
            .collect()
    }
}
