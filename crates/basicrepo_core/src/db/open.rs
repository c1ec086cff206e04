//! Connection open helpers.
//!
//! # Invariants
//! - Returned connections have every `OpenOptions` pragma applied.
//! - Every open emits a `db_open` start event and one ok/error event with
//!   duration.

use super::{DbResult, OpenOptions};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Opens a SQLite database file with default `OpenOptions`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with(path, &OpenOptions::default())
}

/// Opens a SQLite database file with explicit options.
///
/// The file is created when missing.
pub fn open_db_with(path: impl AsRef<Path>, options: &OpenOptions) -> DbResult<Connection> {
    open_logged("file", options, || Connection::open(path))
}

/// Opens a private in-memory SQLite database with default `OpenOptions`.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged("memory", &OpenOptions::default(), Connection::open_in_memory)
}

fn open_logged<F>(mode: &str, options: &OpenOptions, open: F) -> DbResult<Connection>
where
    F: FnOnce() -> rusqlite::Result<Connection>,
{
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    if let Err(err) = configure_connection(&conn, options) {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_configure_failed error={}",
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err.into());
    }

    info!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn configure_connection(conn: &Connection, options: &OpenOptions) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", options.foreign_keys)?;
    conn.busy_timeout(options.busy_timeout)?;
    if let Some(mode) = options.journal_mode {
        // journal_mode answers with the mode actually in effect.
        conn.pragma_update_and_check(None, "journal_mode", mode.as_str(), |row| {
            row.get::<_, String>(0)
        })?;
    }
    Ok(())
}
