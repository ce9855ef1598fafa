//! Column declarations and dynamically typed field values.

use chrono::{DateTime, Utc};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::ToSql;
use thiserror::Error;

/// Error raised while reading or assigning a model field by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("`{model}` has no field `{field}`")]
    UnknownField { model: &'static str, field: String },
    #[error("field `{field}` expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Storage class of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Aware instant stored as text by the SQLite chrono adapter.
    Timestamp,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text | Self::Timestamp => "TEXT",
        }
    }
}

/// One persisted column of a model, excluding the implicit `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Declares a `NOT NULL` column.
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    /// Declares a column that accepts `NULL`.
    pub const fn nullable(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }

    pub(crate) fn definition_sql(&self) -> String {
        let null_clause = if self.nullable { "" } else { " NOT NULL" };
        format!("\"{}\" {}{null_clause}", self.name, self.kind.sql_type())
    }
}

/// Value assigned to, or filtered on, a single model field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
        }
    }

    fn mismatch(&self, field: &str, expected: &'static str) -> FieldError {
        FieldError::TypeMismatch {
            field: field.to_string(),
            expected,
            found: self.kind_name(),
        }
    }

    pub fn into_integer(self, field: &str) -> Result<i64, FieldError> {
        match self {
            Self::Integer(value) => Ok(value),
            other => Err(other.mismatch(field, "integer")),
        }
    }

    /// Accepts reals and integers, since SQLite stores whole reals as integers.
    pub fn into_real(self, field: &str) -> Result<f64, FieldError> {
        match self {
            Self::Real(value) => Ok(value),
            Self::Integer(value) => Ok(value as f64),
            other => Err(other.mismatch(field, "real")),
        }
    }

    pub fn into_text(self, field: &str) -> Result<String, FieldError> {
        match self {
            Self::Text(value) => Ok(value),
            other => Err(other.mismatch(field, "text")),
        }
    }

    pub fn into_timestamp(self, field: &str) -> Result<DateTime<Utc>, FieldError> {
        match self {
            Self::Timestamp(value) => Ok(value),
            other => Err(other.mismatch(field, "timestamp")),
        }
    }

    /// Maps `Null` to `None` and converts anything else with `convert`.
    pub fn optional<T>(
        self,
        convert: impl FnOnce(Self) -> Result<T, FieldError>,
    ) -> Result<Option<T>, FieldError> {
        match self {
            Self::Null => Ok(None),
            other => convert(other).map(Some),
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Null => Ok(ToSqlOutput::Owned(Value::Null)),
            Self::Integer(value) => Ok(ToSqlOutput::Owned(Value::Integer(*value))),
            Self::Real(value) => Ok(ToSqlOutput::Owned(Value::Real(*value))),
            Self::Text(value) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes()))),
            Self::Timestamp(value) => value.to_sql(),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
