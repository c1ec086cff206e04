//! Generic CRUD repositories over SQLite.
//! Records declare their table once; repositories stamp identity and
//! timestamps on save and delegate every operation to a `Store`.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{Entity, EntityId};
pub use model::meta::RecordMeta;
pub use repo::basic_repo::{BasicRepository, RepoError, RepoResult, Repository, SqliteRepository};
pub use store::schema::ensure_table;
pub use store::{Column, ColumnType, Record, SqliteStore, Store, StoreError, StoreResult};

/// Minimal health-check API for linkage checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
