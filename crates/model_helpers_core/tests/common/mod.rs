#![allow(dead_code)]

use model_helpers_core::db::{open_db_in_memory, Migration};
use model_helpers_core::timestamp::INFO_TIMESTAMP;
use model_helpers_core::{
    auto_unique, Column, ColumnType, ConstraintError, FieldError, FieldValue, InfoTimestamps,
    Model, ModelId, Timestamped, UniqueConstraint,
};
use rusqlite::{Connection, Row};

/// Episode of a show fetched from an external catalogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Episode {
    pub id: Option<ModelId>,
    pub show: String,
    pub number: i64,
    pub title: Option<String>,
    pub timestamps: InfoTimestamps,
}

impl Model for Episode {
    const NAME: &'static str = "Episode";
    const TABLE: &'static str = "episodes";

    fn columns() -> Vec<Column> {
        let mut columns = vec![
            Column::new("show", ColumnType::Text),
            Column::new("number", ColumnType::Integer),
            Column::nullable("title", ColumnType::Text),
        ];
        columns.extend(InfoTimestamps::columns());
        columns
    }

    fn unique_constraints() -> Result<Vec<UniqueConstraint>, ConstraintError> {
        Ok(vec![auto_unique::<Self>(&["show", "number"])?])
    }

    fn id(&self) -> Option<ModelId> {
        self.id
    }

    fn set_id(&mut self, id: ModelId) {
        self.id = Some(id);
    }

    fn field_values(&self) -> Vec<(&'static str, FieldValue)> {
        let mut values = vec![
            ("show", FieldValue::from(self.show.as_str())),
            ("number", FieldValue::from(self.number)),
            ("title", FieldValue::from(self.title.clone())),
        ];
        values.extend(self.timestamps.field_values());
        values
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        match field {
            "show" => self.show = value.into_text(field)?,
            "number" => self.number = value.into_integer(field)?,
            "title" => self.title = value.optional(|value| value.into_text(field))?,
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
            show: row.get("show")?,
            number: row.get("number")?,
            title: row.get("title")?,
            timestamps: InfoTimestamps::from_row(row)?,
        })
    }
}

impl Timestamped for Episode {
    fn timestamps(&self) -> &InfoTimestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut InfoTimestamps {
        &mut self.timestamps
    }
}

/// Same table as [`Episode`] but without the unique constraint, so
/// duplicates can be stored on purpose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LooseEpisode(pub Episode);

impl Model for LooseEpisode {
    const NAME: &'static str = "LooseEpisode";
    const TABLE: &'static str = "loose_episodes";

    fn columns() -> Vec<Column> {
        Episode::columns()
    }

    fn id(&self) -> Option<ModelId> {
        self.0.id
    }

    fn set_id(&mut self, id: ModelId) {
        self.0.id = Some(id);
    }

    fn field_values(&self) -> Vec<(&'static str, FieldValue)> {
        self.0.field_values()
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        self.0.set_field(field, value)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Episode::from_row(row).map(Self)
    }
}

/// Declares a constraint on a column the model does not have.
#[derive(Debug, Clone, Default)]
pub struct BrokenModel {
    pub id: Option<ModelId>,
}

impl Model for BrokenModel {
    const NAME: &'static str = "BrokenModel";
    const TABLE: &'static str = "broken";

    fn columns() -> Vec<Column> {
        vec![Column::new(INFO_TIMESTAMP, ColumnType::Timestamp)]
    }

    fn unique_constraints() -> Result<Vec<UniqueConstraint>, ConstraintError> {
        Ok(vec![auto_unique::<Self>(&["missing"])?])
    }

    fn id(&self) -> Option<ModelId> {
        self.id
    }

    fn set_id(&mut self, id: ModelId) {
        self.id = Some(id);
    }

    fn field_values(&self) -> Vec<(&'static str, FieldValue)> {
        Vec::new()
    }

    fn set_field(&mut self, field: &str, _value: FieldValue) -> Result<(), FieldError> {
        Err(FieldError::UnknownField {
            model: Self::NAME,
            field: field.to_string(),
        })
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self { id: row.get("id")? })
    }
}

pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::for_model::<Episode>(1).unwrap(),
        Migration::for_model::<LooseEpisode>(2).unwrap(),
    ]
}

pub fn open_test_db() -> Connection {
    open_db_in_memory(&migrations()).unwrap()
}
