//! SQLite connection bootstrap.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for repositories to borrow.
//! - Apply connection pragmas from explicit `OpenOptions`.
//!
//! # Invariants
//! - Core code never closes a connection it did not open for the caller.
//! - Schema creation is left to `store::schema`; nothing here touches tables.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod open;

pub use open::{open_db, open_db_in_memory, open_db_with};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// SQLite journal modes accepted by `OpenOptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    Delete,
    Truncate,
    Wal,
    Memory,
}

impl JournalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Wal => "WAL",
            Self::Memory => "MEMORY",
        }
    }
}

/// Connection settings applied right after open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// `PRAGMA foreign_keys`.
    pub foreign_keys: bool,
    /// How long SQLite retries on a locked database before failing.
    pub busy_timeout: Duration,
    /// `None` keeps SQLite's default for the database kind.
    pub journal_mode: Option<JournalMode>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            foreign_keys: true,
            busy_timeout: Duration::from_secs(5),
            journal_mode: None,
        }
    }
}
