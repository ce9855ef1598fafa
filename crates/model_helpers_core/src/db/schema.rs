//! DDL rendering for model declarations.

use crate::constraint::{ensure_fields_known, ConstraintResult};
use crate::model::{Model, ID_COLUMN};

/// Renders `CREATE TABLE IF NOT EXISTS` for model `M`.
pub fn create_table_sql<M: Model>() -> String {
    let mut definitions = vec![format!("\"{ID_COLUMN}\" INTEGER PRIMARY KEY AUTOINCREMENT")];
    definitions.extend(M::columns().iter().map(|column| column.definition_sql()));
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n);",
        M::TABLE,
        definitions.join(",\n    ")
    )
}

/// Renders the table of `M` followed by one unique index per constraint.
///
/// # Errors
/// Returns the first invalid constraint, including constraints that name a
/// field `M` does not declare.
pub fn model_schema_sql<M: Model>() -> ConstraintResult<String> {
    let column_names = M::column_names();
    let mut statements = vec![create_table_sql::<M>()];
    for constraint in M::unique_constraints()? {
        ensure_fields_known(&constraint, &column_names)?;
        statements.push(constraint.index_sql(M::TABLE));
    }
    Ok(statements.join("\n"))
}
