//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `basicrepo_core` linkage and one repository round trip.
//! - Optionally write core log events to a rotating file directory.
//! - Keep output deterministic apart from the generated id.

use basicrepo_core::db::{open_db, open_db_in_memory};
use basicrepo_core::{
    default_log_level, ensure_table, init_logging, BasicRepository, Column, Entity, EntityId,
    Record, RecordMeta, SqliteRepository,
};
use clap::Parser;
use log::info;
use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Save one heartbeat record through a basicrepo repository and print the row count"
)]
struct Cli {
    #[arg(
        value_name = "DB_PATH",
        help = "SQLite database file; an in-memory database is used when omitted"
    )]
    db_path: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for rotating log files; logging stays off when omitted"
    )]
    log_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "LEVEL",
        help = "trace|debug|info|warn|error (defaults to debug in debug builds, info otherwise)"
    )]
    log_level: Option<String>,
}

#[derive(Debug, Default)]
struct Heartbeat {
    meta: RecordMeta,
    host: String,
}

impl Entity for Heartbeat {
    fn id(&self) -> Option<EntityId> {
        self.meta.id()
    }
}

impl Record for Heartbeat {
    const TABLE: &'static str = "cli_heartbeats";
    const COLUMNS: &'static [Column] = &[Column::text("host")];

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_values(&self) -> Vec<Value> {
        vec![Value::Text(self.host.clone())]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            meta,
            host: row.get("host")?,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    println!("basicrepo_core ping={}", basicrepo_core::ping());
    println!("basicrepo_core version={}", basicrepo_core::core_version());

    match run(&cli) {
        Ok((id, count)) => {
            println!("heartbeat id={id} count={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("heartbeat failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(EntityId, u64), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        start_logging(log_dir, cli.log_level.as_deref())?;
    }

    let conn = match &cli.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    ensure_table::<Heartbeat>(&conn)?;

    let repo = SqliteRepository::<Heartbeat>::sqlite(&conn);
    let saved = repo.save(Heartbeat {
        host: std::env::consts::OS.to_string(),
        ..Heartbeat::default()
    })?;
    let id = saved.id().ok_or("saved heartbeat carries no id")?;
    let count = repo.count()?;

    info!("event=cli_heartbeat module=cli status=ok id={id} count={count}");
    Ok((id, count))
}

fn start_logging(log_dir: &Path, level: Option<&str>) -> Result<(), Box<dyn Error>> {
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(log_dir)
    };
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", log_dir.display()))?;

    init_logging(level.unwrap_or_else(|| default_log_level()), log_dir)?;
    Ok(())
}
