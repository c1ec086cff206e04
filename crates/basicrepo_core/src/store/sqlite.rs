//! SQLite-backed `Store`.
//!
//! # Invariants
//! - Borrows the connection; never opens, reconfigures or closes it.
//! - `find_all` returns rows in `rowid` order, which upserts preserve.
//! - Upsert conflict updates never touch `created_at`.

use super::{quoted, validate_mapping, Record, Store, StoreError, StoreResult, META_COLUMNS};
use crate::model::entity::EntityId;
use crate::model::meta::RecordMeta;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use uuid::Uuid;

/// `Store` over a caller-owned SQLite connection.
///
/// Cheap to copy, so one connection can back any number of repositories.
#[derive(Debug, Clone, Copy)]
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Underlying connection, for callers that need raw SQL next to the store.
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

impl Store for SqliteStore<'_> {
    fn find_one<T: Record>(&self, id: EntityId) -> StoreResult<Option<T>> {
        validate_mapping::<T>()?;

        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1;", select_sql::<T>()))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn find_all<T: Record>(&self) -> StoreResult<Vec<T>> {
        validate_mapping::<T>()?;

        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY rowid ASC;", select_sql::<T>()))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn upsert<T: Record>(&self, record: &T) -> StoreResult<()> {
        validate_mapping::<T>()?;

        let meta = record.meta();
        let id = meta.id().ok_or_else(|| {
            StoreError::InvalidData(format!(
                "refusing to write an unstamped record into `{}`",
                T::TABLE
            ))
        })?;

        let values = record.to_values();
        if values.len() != T::COLUMNS.len() {
            return Err(StoreError::InvalidData(format!(
                "`{}` declares {} columns but the record produced {} values",
                T::TABLE,
                T::COLUMNS.len(),
                values.len()
            )));
        }

        let mut bind_values = Vec::with_capacity(values.len() + META_COLUMNS.len());
        bind_values.push(Value::Text(id.to_string()));
        bind_values.push(Value::Integer(meta.created_at()));
        bind_values.push(Value::Integer(meta.updated_at()));
        bind_values.extend(values);

        self.conn
            .execute(&upsert_sql::<T>(), params_from_iter(bind_values))?;
        Ok(())
    }

    fn delete_one<T: Record>(&self, id: EntityId) -> StoreResult<usize> {
        validate_mapping::<T>()?;

        let removed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", quoted(T::TABLE)),
            [id.to_string()],
        )?;
        Ok(removed)
    }

    fn count<T: Record>(&self) -> StoreResult<u64> {
        validate_mapping::<T>()?;

        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", quoted(T::TABLE)),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count).map_err(|_| {
            StoreError::InvalidData(format!("negative row count {count} for `{}`", T::TABLE))
        })
    }
}

fn column_list<T: Record>() -> String {
    META_COLUMNS
        .iter()
        .copied()
        .chain(T::COLUMNS.iter().map(|column| column.name))
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_sql<T: Record>() -> String {
    format!("SELECT {} FROM {}", column_list::<T>(), quoted(T::TABLE))
}

fn upsert_sql<T: Record>() -> String {
    let placeholders = (1..=META_COLUMNS.len() + T::COLUMNS.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let assignments = std::iter::once("updated_at")
        .chain(T::COLUMNS.iter().map(|column| column.name))
        .map(|name| {
            let name = quoted(name);
            format!("{name} = excluded.{name}")
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders})
         ON CONFLICT(id) DO UPDATE SET {assignments};",
        table = quoted(T::TABLE),
        columns = column_list::<T>(),
    )
}

fn parse_record_row<T: Record>(row: &Row<'_>) -> StoreResult<T> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid uuid value `{id_text}` in {}.id",
            T::TABLE
        ))
    })?;
    let meta = RecordMeta::from_stored(id, row.get("created_at")?, row.get("updated_at")?);
    Ok(T::from_row(meta, row)?)
}
