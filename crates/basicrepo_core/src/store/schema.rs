//! Table declaration for record types.
//!
//! Creates a record table from its `Record` mapping when it is missing.
//! Existing tables are left as they are: there is no versioning and no
//! column diffing.

use super::{quoted, validate_mapping, Record, StoreResult};
use log::{error, info};
use rusqlite::Connection;

/// Creates the table backing `T` if it does not exist yet.
///
/// # Errors
/// - `StoreError::InvalidData` when the mapping of `T` is unusable.
/// - `StoreError::Sqlite` when SQLite rejects the statement.
pub fn ensure_table<T: Record>(conn: &Connection) -> StoreResult<()> {
    validate_mapping::<T>()?;

    match conn.execute_batch(&create_table_sql::<T>()) {
        Ok(()) => {
            info!(
                "event=ensure_table module=store status=ok table={}",
                T::TABLE
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=ensure_table module=store status=error table={} error={}",
                T::TABLE,
                err
            );
            Err(err.into())
        }
    }
}

fn create_table_sql<T: Record>() -> String {
    let mut definitions = vec![
        "\"id\" TEXT PRIMARY KEY NOT NULL".to_string(),
        "\"created_at\" INTEGER NOT NULL".to_string(),
        "\"updated_at\" INTEGER NOT NULL".to_string(),
    ];
    definitions.extend(T::COLUMNS.iter().map(|column| {
        let null_clause = if column.nullable { "" } else { " NOT NULL" };
        format!("{} {}{}", quoted(column.name), column.kind.as_sql(), null_clause)
    }));

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
        quoted(T::TABLE),
        definitions.join(",\n    ")
    )
}
