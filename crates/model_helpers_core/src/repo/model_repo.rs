//! Generic model repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide `get`/`filter`/`save`/`delete` for any [`Model`].
//! - Keep SQL generation inside the persistence boundary.
//!
//! # Invariants
//! - `save` inserts when `id()` is `None` and assigns the generated id.
//! - `save` on a record whose id has no row inserts it with that id.
//! - A `Null` lookup value matches with `IS NULL`.

use crate::db::DbError;
use crate::model::{FieldError, FieldValue, Lookup, Model, ModelId, ID_COLUMN};
use crate::timestamp::TimestampError;
use log::{debug, warn};
use rusqlite::{params_from_iter, Connection};
use std::marker::PhantomData;
use thiserror::Error;

/// Upper bound on rows fetched by `get` when reporting ambiguity.
pub const MAX_GET_RESULTS: usize = 21;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{model} matching query does not exist")]
    DoesNotExist { model: &'static str },
    /// `count` is capped at [`MAX_GET_RESULTS`].
    #[error("get() returned more than one {model}; it returned {count}")]
    MultipleObjectsReturned { model: &'static str, count: usize },
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query and persistence operations for records of model `M`.
pub trait ModelRepository<M: Model> {
    /// Returns the single record matching every entry of `lookup`.
    ///
    /// # Errors
    /// - [`RepoError::DoesNotExist`] when nothing matches.
    /// - [`RepoError::MultipleObjectsReturned`] when more than one row matches.
    fn get(&self, lookup: &Lookup) -> RepoResult<M>;

    /// Returns every record matching `lookup`, ordered by id.
    fn filter(&self, lookup: &Lookup) -> RepoResult<Vec<M>>;

    /// Persists `record` and returns its id.
    fn save(&self, record: &mut M) -> RepoResult<ModelId>;

    /// Removes the record with `id`.
    fn delete(&self, id: ModelId) -> RepoResult<()>;
}

/// SQLite-backed repository for model `M`.
pub struct SqliteModelRepository<'conn, M> {
    conn: &'conn Connection,
    _model: PhantomData<fn() -> M>,
}

impl<'conn, M: Model> SqliteModelRepository<'conn, M> {
    /// Wraps a connection whose schema already contains `M::TABLE`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _model: PhantomData,
        }
    }

    fn select(&self, lookup: &Lookup, limit: Option<usize>) -> RepoResult<Vec<M>> {
        let column_names = M::column_names();
        for field in lookup.fields() {
            ensure_known::<M>(&column_names, field)?;
        }

        let mut sql = format!(
            "SELECT {} FROM \"{}\"",
            quoted_list(&column_names),
            M::TABLE
        );
        let mut binds: Vec<&FieldValue> = Vec::new();
        let mut conditions = Vec::with_capacity(lookup.len());
        for (field, value) in lookup.iter() {
            if value.is_null() {
                conditions.push(format!("\"{field}\" IS NULL"));
            } else {
                binds.push(value);
                conditions.push(format!("\"{field}\" = ?{}", binds.len()));
            }
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY \"{ID_COLUMN}\" ASC"));
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(M::from_row(row)?);
        }

        Ok(records)
    }

    fn insert(
        &self,
        values: &[(&'static str, FieldValue)],
        id: Option<ModelId>,
    ) -> RepoResult<ModelId> {
        let id_value = id.map(FieldValue::Integer);
        let mut names: Vec<&str> = Vec::with_capacity(values.len() + 1);
        let mut binds: Vec<&FieldValue> = Vec::with_capacity(values.len() + 1);
        if let Some(id_value) = id_value.as_ref() {
            names.push(ID_COLUMN);
            binds.push(id_value);
        }
        for (name, value) in values {
            names.push(*name);
            binds.push(value);
        }

        let sql = if names.is_empty() {
            format!("INSERT INTO \"{}\" DEFAULT VALUES;", M::TABLE)
        } else {
            let placeholders = (1..=names.len())
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO \"{}\" ({}) VALUES ({placeholders});",
                M::TABLE,
                quoted_list(&names)
            )
        };

        self.conn.execute(&sql, params_from_iter(binds))?;
        Ok(id.unwrap_or_else(|| self.conn.last_insert_rowid()))
    }

    fn update(&self, values: &[(&'static str, FieldValue)], id: ModelId) -> RepoResult<usize> {
        let id_value = FieldValue::Integer(id);
        let mut assignments = Vec::with_capacity(values.len());
        let mut binds: Vec<&FieldValue> = Vec::with_capacity(values.len() + 1);
        for (name, value) in values {
            binds.push(value);
            assignments.push(format!("\"{name}\" = ?{}", binds.len()));
        }
        if assignments.is_empty() {
            assignments.push(format!("\"{ID_COLUMN}\" = \"{ID_COLUMN}\""));
        }
        binds.push(&id_value);

        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE \"{ID_COLUMN}\" = ?{};",
            M::TABLE,
            assignments.join(", "),
            binds.len()
        );
        Ok(self.conn.execute(&sql, params_from_iter(binds))?)
    }
}

impl<M: Model> ModelRepository<M> for SqliteModelRepository<'_, M> {
    fn get(&self, lookup: &Lookup) -> RepoResult<M> {
        let mut records = self.select(lookup, Some(MAX_GET_RESULTS))?;
        match records.len() {
            0 => {
                debug!(
                    "event=model_get module=repo status=miss model={} fields={}",
                    M::NAME,
                    lookup.len()
                );
                Err(RepoError::DoesNotExist { model: M::NAME })
            }
            1 => Ok(records.remove(0)),
            count => {
                warn!(
                    "event=model_get module=repo status=error model={} error_code=multiple_objects count={count}",
                    M::NAME
                );
                Err(RepoError::MultipleObjectsReturned {
                    model: M::NAME,
                    count,
                })
            }
        }
    }

    fn filter(&self, lookup: &Lookup) -> RepoResult<Vec<M>> {
        self.select(lookup, None)
    }

    fn save(&self, record: &mut M) -> RepoResult<ModelId> {
        let column_names = M::column_names();
        let values = record.field_values();
        for (name, _) in &values {
            ensure_known::<M>(&column_names, name)?;
        }

        let id = match record.id() {
            None => self.insert(&values, None)?,
            Some(id) => {
                if self.update(&values, id)? == 0 {
                    self.insert(&values, Some(id))?
                } else {
                    id
                }
            }
        };
        record.set_id(id);

        debug!("event=model_save module=repo status=ok model={} id={id}", M::NAME);
        Ok(id)
    }

    fn delete(&self, id: ModelId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM \"{}\" WHERE \"{ID_COLUMN}\" = ?1;", M::TABLE),
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::DoesNotExist { model: M::NAME });
        }

        Ok(())
    }
}

fn ensure_known<M: Model>(column_names: &[&str], field: &str) -> Result<(), FieldError> {
    if column_names.contains(&field) {
        Ok(())
    } else {
        Err(FieldError::UnknownField {
            model: M::NAME,
            field: field.to_string(),
        })
    }
}

fn quoted_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
