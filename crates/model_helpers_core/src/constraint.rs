//! Unique-constraint naming for model declarations.
//!
//! # Responsibility
//! - Derive stable constraint names from the owning model and its fields.
//! - Render the unique index that enforces a constraint in SQLite.
//!
//! # Invariants
//! - Generated names follow `{ModelName}_{field1}_{field2}_...`.
//! - Model and field names are plain SQL identifiers.
//! - A constraint never lists the same field twice.

use crate::model::Model;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Configuration error raised while declaring a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("model name `{0}` is not a valid identifier")]
    InvalidModelName(String),
    #[error("unique constraint on `{model}` needs at least one field")]
    NoFields { model: String },
    #[error("field name `{field}` on `{model}` is not a valid identifier")]
    InvalidFieldName { model: String, field: String },
    #[error("field `{field}` is listed more than once in a unique constraint on `{model}`")]
    DuplicateField { model: String, field: String },
    #[error("unique constraint `{constraint}` references unknown field `{field}`")]
    UnknownField { constraint: String, field: String },
}

/// A named set of fields whose combined values must be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    name: String,
    fields: Vec<String>,
}

impl UniqueConstraint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Renders the `CREATE UNIQUE INDEX` statement for `table`.
    pub fn index_sql(&self, table: &str) -> String {
        let columns = self
            .fields
            .iter()
            .map(|field| format!("\"{field}\""))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"{}\" ON \"{table}\" ({columns});",
            self.name
        )
    }
}

/// Builds a unique constraint named after model `M`.
///
/// ```
/// # use model_helpers_core::{auto_unique, Model};
/// # fn demo<M: Model>() {
/// let constraint = auto_unique::<M>(&["path", "revision"]);
/// # }
/// ```
///
/// # Errors
/// - Returns [`ConstraintError`] when `M::NAME` or a field is not an
///   identifier, when `fields` is empty, or when a field repeats.
pub fn auto_unique<M: Model>(fields: &[&str]) -> ConstraintResult<UniqueConstraint> {
    auto_unique_for(M::NAME, fields)
}

/// Builds a unique constraint for an explicitly named model.
///
/// # Errors
/// Same as [`auto_unique`].
pub fn auto_unique_for(model_name: &str, fields: &[&str]) -> ConstraintResult<UniqueConstraint> {
    if !IDENTIFIER_RE.is_match(model_name) {
        return Err(ConstraintError::InvalidModelName(model_name.to_string()));
    }
    if fields.is_empty() {
        return Err(ConstraintError::NoFields {
            model: model_name.to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !IDENTIFIER_RE.is_match(field) {
            return Err(ConstraintError::InvalidFieldName {
                model: model_name.to_string(),
                field: (*field).to_string(),
            });
        }
        if !seen.insert(*field) {
            return Err(ConstraintError::DuplicateField {
                model: model_name.to_string(),
                field: (*field).to_string(),
            });
        }
    }

    let name = format!("{model_name}_{}", fields.join("_"));
    debug!("event=constraint_named module=constraint status=ok name={name}");

    Ok(UniqueConstraint {
        name,
        fields: fields.iter().map(|field| (*field).to_string()).collect(),
    })
}

/// Checks that every constrained field is one of `columns`.
pub(crate) fn ensure_fields_known(
    constraint: &UniqueConstraint,
    columns: &[&str],
) -> ConstraintResult<()> {
    match constraint
        .fields
        .iter()
        .find(|field| !columns.contains(&field.as_str()))
    {
        Some(field) => Err(ConstraintError::UnknownField {
            constraint: constraint.name.clone(),
            field: field.clone(),
        }),
        None => Ok(()),
    }
}
