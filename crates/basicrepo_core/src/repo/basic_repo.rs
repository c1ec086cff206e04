//! Generic repository contract and its store-backed implementation.

use crate::model::entity::{Entity, EntityId};
use crate::model::meta::{now_epoch_ms, stamp_for_insert, stamp_for_update};
use crate::store::{Record, SqliteStore, Store, StoreError};
use log::{debug, error};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    NotFound(EntityId),
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// CRUD contract shared by every record type.
pub trait BasicRepository<T: Entity> {
    /// Returns `RepoError::NotFound` when no record has `id`.
    fn find_by_id(&self, id: EntityId) -> RepoResult<T>;
    /// All records in store-default (insertion) order.
    fn find_all(&self) -> RepoResult<Vec<T>>;
    /// Inserts a new record or updates an existing one, returning it stamped.
    fn save(&self, record: T) -> RepoResult<T>;
    /// Removing an id that is not stored is a no-op.
    fn delete(&self, id: EntityId) -> RepoResult<()>;
    /// `NotFound` is reported as `Ok(false)`, other failures are propagated.
    fn exists(&self, id: EntityId) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<u64>;
}

/// Stateless repository bound to record type `T` and store handle `S`.
pub struct Repository<T, S> {
    store: S,
    _record: PhantomData<fn() -> T>,
}

/// Repository over a borrowed SQLite connection.
pub type SqliteRepository<'conn, T> = Repository<T, SqliteStore<'conn>>;

impl<T: Record, S: Store> Repository<T, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<'conn, T: Record> Repository<T, SqliteStore<'conn>> {
    /// Builds a repository borrowing `conn`; the table must already exist.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(SqliteStore::new(conn))
    }
}

impl<T: Record, S: Store> BasicRepository<T> for Repository<T, S> {
    fn find_by_id(&self, id: EntityId) -> RepoResult<T> {
        match self.store.find_one::<T>(id) {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(RepoError::NotFound(id)),
            Err(err) => Err(store_failure::<T>("repo_find_by_id", err)),
        }
    }

    fn find_all(&self) -> RepoResult<Vec<T>> {
        self.store
            .find_all::<T>()
            .map_err(|err| store_failure::<T>("repo_find_all", err))
    }

    fn save(&self, mut record: T) -> RepoResult<T> {
        let now_ms = now_epoch_ms();
        let (mode, stamped) = if record.meta().is_new() {
            ("insert", stamp_for_insert(now_ms))
        } else {
            ("update", stamp_for_update(record.meta(), now_ms))
        };
        *record.meta_mut() = stamped;

        self.store
            .upsert(&record)
            .map_err(|err| store_failure::<T>("repo_save", err))?;

        debug!(
            "event=repo_save module=repo status=ok table={} mode={} id={}",
            T::TABLE,
            mode,
            display_id(record.id())
        );
        Ok(record)
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        let removed = self
            .store
            .delete_one::<T>(id)
            .map_err(|err| store_failure::<T>("repo_delete", err))?;

        debug!(
            "event=repo_delete module=repo status=ok table={} id={} removed={}",
            T::TABLE,
            id,
            removed
        );
        Ok(())
    }

    fn exists(&self, id: EntityId) -> RepoResult<bool> {
        match self.find_by_id(id) {
            Ok(_) => Ok(true),
            Err(RepoError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn count(&self) -> RepoResult<u64> {
        self.store
            .count::<T>()
            .map_err(|err| store_failure::<T>("repo_count", err))
    }
}

fn store_failure<T: Record>(event: &str, err: StoreError) -> RepoError {
    error!(
        "event={event} module=repo status=error table={} error={}",
        T::TABLE,
        err
    );
    RepoError::Store(err)
}

fn display_id(id: Option<EntityId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::{BasicRepository, RepoError, Repository};
    use crate::model::entity::{Entity, EntityId};
    use crate::model::meta::RecordMeta;
    use crate::store::{Column, Record, Store, StoreError, StoreResult};
    use rusqlite::types::Value;
    use rusqlite::Row;
    use std::cell::RefCell;
    use uuid::Uuid;

    #[derive(Debug, Clone, Default)]
    struct Gauge {
        meta: RecordMeta,
        label: String,
    }

    impl Entity for Gauge {
        fn id(&self) -> Option<EntityId> {
            self.meta.id()
        }
    }

    impl Record for Gauge {
        const TABLE: &'static str = "gauges";
        const COLUMNS: &'static [Column] = &[Column::text("label")];

        fn meta(&self) -> &RecordMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }

        fn to_values(&self) -> Vec<Value> {
            vec![Value::Text(self.label.clone())]
        }

        fn from_row(meta: RecordMeta, row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Self {
                meta,
                label: row.get("label")?,
            })
        }
    }

    /// Accepts writes, remembers stamped metadata, stores nothing.
    #[derive(Default)]
    struct RecordingStore {
        written: RefCell<Vec<RecordMeta>>,
    }

    impl Store for RecordingStore {
        fn find_one<T: Record>(&self, _id: EntityId) -> StoreResult<Option<T>> {
            Ok(None)
        }

        fn find_all<T: Record>(&self) -> StoreResult<Vec<T>> {
            Ok(Vec::new())
        }

        fn upsert<T: Record>(&self, record: &T) -> StoreResult<()> {
            self.written.borrow_mut().push(*record.meta());
            Ok(())
        }

        fn delete_one<T: Record>(&self, _id: EntityId) -> StoreResult<usize> {
            Ok(0)
        }

        fn count<T: Record>(&self) -> StoreResult<u64> {
            Ok(0)
        }
    }

    struct OfflineStore;

    fn offline() -> StoreError {
        StoreError::InvalidData("backend offline".to_string())
    }

    impl Store for OfflineStore {
        fn find_one<T: Record>(&self, _id: EntityId) -> StoreResult<Option<T>> {
            Err(offline())
        }

        fn find_all<T: Record>(&self) -> StoreResult<Vec<T>> {
            Err(offline())
        }

        fn upsert<T: Record>(&self, _record: &T) -> StoreResult<()> {
            Err(offline())
        }

        fn delete_one<T: Record>(&self, _id: EntityId) -> StoreResult<usize> {
            Err(offline())
        }

        fn count<T: Record>(&self) -> StoreResult<u64> {
            Err(offline())
        }
    }

    fn is_offline(err: &RepoError) -> bool {
        matches!(err, RepoError::Store(StoreError::InvalidData(message)) if message == "backend offline")
    }

    #[test]
    fn save_stamps_before_handing_record_to_store() {
        let repo: Repository<Gauge, RecordingStore> = Repository::new(RecordingStore::default());

        let saved = repo
            .save(Gauge {
                label: "first".to_string(),
                ..Gauge::default()
            })
            .unwrap();
        let resaved = repo.save(saved.clone()).unwrap();

        let written = repo.store().written.borrow();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0], saved.meta);
        assert_eq!(written[1], resaved.meta);
        assert!(written[0].id().is_some());
        assert_eq!(written[0].created_at(), written[0].updated_at());
        assert_eq!(written[1].id(), written[0].id());
        assert_eq!(written[1].created_at(), written[0].created_at());
        assert!(written[1].updated_at() > written[1].created_at());
    }

    #[test]
    fn missing_lookup_maps_to_not_found_and_exists_false() {
        let repo: Repository<Gauge, RecordingStore> = Repository::new(RecordingStore::default());
        let id = Uuid::new_v4();

        let err = repo.find_by_id(id).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
        assert!(!repo.exists(id).unwrap());
    }

    #[test]
    fn delete_of_unknown_id_is_a_no_op() {
        let repo: Repository<Gauge, RecordingStore> = Repository::new(RecordingStore::default());
        repo.delete(Uuid::new_v4()).unwrap();
    }

    #[test]
    fn store_failures_propagate_from_every_operation() {
        let repo: Repository<Gauge, OfflineStore> = Repository::new(OfflineStore);
        let id = Uuid::new_v4();

        assert!(is_offline(&repo.find_by_id(id).unwrap_err()));
        assert!(is_offline(&repo.find_all().unwrap_err()));
        assert!(is_offline(&repo.save(Gauge::default()).unwrap_err()));
        assert!(is_offline(&repo.delete(id).unwrap_err()));
        assert!(is_offline(&repo.exists(id).unwrap_err()));
        assert!(is_offline(&repo.count().unwrap_err()));
    }

    #[test]
    fn repo_error_exposes_store_source() {
        let err = RepoError::from(offline());
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "invalid store data: backend offline");

        let id = Uuid::nil();
        assert_eq!(
            RepoError::NotFound(id).to_string(),
            format!("record not found: {id}")
        );
    }
}
