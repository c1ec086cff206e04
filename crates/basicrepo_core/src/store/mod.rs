//! Store boundary between repositories and the relational backend.
//!
//! # Responsibility
//! - Define the one-request-per-call `Store` contract repositories delegate to.
//! - Define how a record type maps onto a table (`Record`, `Column`).
//! - Keep SQL details inside the SQLite implementation.
//!
//! # Invariants
//! - Every record table leads with `id`, `created_at`, `updated_at`.
//! - Table and column names are validated before they reach SQL text.
//! - Stores never stamp metadata; they persist what they are given.

use crate::model::entity::{Entity, EntityId};
use crate::model::meta::RecordMeta;
use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

/// Metadata columns shared by every record table, in storage order.
pub const META_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// SQLite row-id aliases; `find_all` orders by `rowid`, so a declared column
/// under any of these names would shadow insertion order.
const ROWID_ALIASES: [&str; 3] = ["rowid", "oid", "_rowid_"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by the underlying store.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid store data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// SQLite type affinity of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Blob,
}

impl ColumnType {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

/// A non-metadata column of a record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::new(name, ColumnType::Real)
    }

    pub const fn blob(name: &'static str) -> Self {
        Self::new(name, ColumnType::Blob)
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

/// Table mapping for an entity type.
///
/// `to_values` must yield exactly one value per entry of `COLUMNS`, in the
/// same order. `from_row` receives the already-decoded metadata; the row also
/// exposes every declared column by name.
pub trait Record: Entity + Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [Column];

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;
    fn to_values(&self) -> Vec<Value>;
    fn from_row(meta: RecordMeta, row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Persistence operations a repository delegates to.
///
/// Each call is one request against the backend. Absence is reported as
/// `Ok(None)` / `Ok(0)`, never as an error.
pub trait Store {
    fn find_one<T: Record>(&self, id: EntityId) -> StoreResult<Option<T>>;
    fn find_all<T: Record>(&self) -> StoreResult<Vec<T>>;
    /// Inserts the record, or updates every column but `created_at` when the
    /// id already exists.
    fn upsert<T: Record>(&self, record: &T) -> StoreResult<()>;
    /// Returns the number of rows removed.
    fn delete_one<T: Record>(&self, id: EntityId) -> StoreResult<usize>;
    fn count<T: Record>(&self) -> StoreResult<u64>;
}

/// Checks the table mapping of `T` before it is spliced into SQL.
///
/// A mapping with no declared columns is valid: such records carry only
/// their metadata.
pub(crate) fn validate_mapping<T: Record>() -> StoreResult<()> {
    validate_identifier(T::TABLE, "table")?;
    for (index, column) in T::COLUMNS.iter().enumerate() {
        validate_identifier(column.name, "column")?;
        if META_COLUMNS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(column.name))
        {
            return Err(StoreError::InvalidData(format!(
                "column `{}` of `{}` clashes with a metadata column",
                column.name,
                T::TABLE
            )));
        }
        if ROWID_ALIASES
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(column.name))
        {
            return Err(StoreError::InvalidData(format!(
                "column `{}` of `{}` shadows the SQLite rowid",
                column.name,
                T::TABLE
            )));
        }
        if T::COLUMNS[..index]
            .iter()
            .any(|earlier| earlier.name.eq_ignore_ascii_case(column.name))
        {
            return Err(StoreError::InvalidData(format!(
                "column `{}` of `{}` is declared twice",
                column.name,
                T::TABLE
            )));
        }
    }
    Ok(())
}

/// Quotes a validated identifier so SQL keywords can be used as names.
pub(crate) fn quoted(name: &str) -> String {
    format!("\"{name}\"")
}

fn validate_identifier(name: &str, what: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Ok(());
    }
    Err(StoreError::InvalidData(format!(
        "invalid {what} name `{name}`"
    )))
}
