use basicrepo_core::db::{open_db, open_db_in_memory, open_db_with, JournalMode, OpenOptions};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_db_in_memory_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
}

#[test]
fn opening_same_database_file_twice_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("basicrepo.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute_batch("CREATE TABLE marks (value INTEGER); INSERT INTO marks VALUES (7);")
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    let value: i64 = conn_second
        .query_row("SELECT value FROM marks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, 7);
}

#[test]
fn open_options_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let options = OpenOptions {
        foreign_keys: false,
        busy_timeout: Duration::from_millis(250),
        journal_mode: Some(JournalMode::Wal),
    };

    let conn = open_db_with(dir.path().join("wal.db"), &options).unwrap();

    assert_eq!(pragma_i64(&conn, "foreign_keys"), 0);
    assert_eq!(pragma_i64(&conn, "busy_timeout"), 250);
    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_uppercase(), "WAL");
}

#[test]
fn default_options_match_documented_values() {
    let options = OpenOptions::default();
    assert!(options.foreign_keys);
    assert_eq!(options.busy_timeout, Duration::from_secs(5));
    assert_eq!(options.journal_mode, None);
}

fn pragma_i64(conn: &Connection, name: &str) -> i64 {
    conn.query_row(&format!("PRAGMA {name};"), [], |row| row.get(0))
        .unwrap()
}
