//! Record metadata and pre-write stamping.
//!
//! # Responsibility
//! - Hold identifier and timestamps managed by the persistence layer.
//! - Provide pure `stamp_for_insert` / `stamp_for_update` transformations.
//!
//! # Invariants
//! - `created_at == updated_at` right after `stamp_for_insert`.
//! - `stamp_for_update` keeps `id` and `created_at`, and always yields an
//!   `updated_at` strictly greater than the previous one.
//! - Timestamps are Unix epoch milliseconds.

use crate::model::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Identifier and timestamps embedded in every persisted record.
///
/// Fields are private: callers read them, the persistence layer writes them.
/// `Deserialize` exists for import paths and trusts its input; values read
/// that way are persisted as given on the next save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordMeta {
    id: Option<EntityId>,
    created_at: i64,
    updated_at: i64,
}

impl RecordMeta {
    /// Rebuilds metadata decoded from a stored row.
    pub(crate) fn from_stored(id: EntityId, created_at: i64, updated_at: i64) -> Self {
        Self {
            id: Some(id),
            created_at,
            updated_at,
        }
    }

    /// Assigned identifier, `None` until the first save.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    /// Unix epoch milliseconds of the first save, `0` while unsaved.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Unix epoch milliseconds of the latest save, `0` while unsaved.
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Returns whether this metadata has never been stamped.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

/// Stamps metadata for a first write: fresh UUID v4, both timestamps `now_ms`.
pub(crate) fn stamp_for_insert(now_ms: i64) -> RecordMeta {
    RecordMeta {
        id: Some(Uuid::new_v4()),
        created_at: now_ms,
        updated_at: now_ms,
    }
}

/// Stamps metadata for a subsequent write.
///
/// Millisecond clocks can repeat (or step back), so the refreshed value is
/// bumped to stay strictly after the previous `updated_at`.
pub(crate) fn stamp_for_update(meta: &RecordMeta, now_ms: i64) -> RecordMeta {
    RecordMeta {
        id: meta.id,
        created_at: meta.created_at,
        updated_at: now_ms.max(meta.updated_at.saturating_add(1)),
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, stamp_for_insert, stamp_for_update, RecordMeta};
    use uuid::Uuid;

    #[test]
    fn default_meta_is_new() {
        let meta = RecordMeta::default();
        assert!(meta.is_new());
        assert_eq!(meta.id(), None);
        assert_eq!(meta.created_at(), 0);
        assert_eq!(meta.updated_at(), 0);
    }

    #[test]
    fn insert_stamp_assigns_id_and_equal_timestamps() {
        let meta = stamp_for_insert(1_700_000_000_000);
        let id = meta.id().expect("insert stamp must assign an id");
        assert!(!id.is_nil());
        assert_eq!(meta.created_at(), 1_700_000_000_000);
        assert_eq!(meta.created_at(), meta.updated_at());
    }

    #[test]
    fn insert_stamps_never_reuse_ids() {
        let first = stamp_for_insert(10);
        let second = stamp_for_insert(10);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn update_stamp_keeps_identity_and_created_at() {
        let inserted = stamp_for_insert(1_000);
        let updated = stamp_for_update(&inserted, 5_000);
        assert_eq!(updated.id(), inserted.id());
        assert_eq!(updated.created_at(), 1_000);
        assert_eq!(updated.updated_at(), 5_000);
    }

    #[test]
    fn update_stamp_is_strict_within_same_millisecond() {
        let inserted = stamp_for_insert(1_000);
        let updated = stamp_for_update(&inserted, 1_000);
        assert_eq!(updated.updated_at(), 1_001);

        let skewed = stamp_for_update(&updated, 400);
        assert_eq!(skewed.updated_at(), 1_002);
        assert!(skewed.updated_at() > skewed.created_at());
    }

    #[test]
    fn stored_meta_is_not_new() {
        let id = Uuid::new_v4();
        let meta = RecordMeta::from_stored(id, 1, 2);
        assert!(!meta.is_new());
        assert_eq!(meta.id(), Some(id));
    }

    #[test]
    fn clock_is_after_epoch() {
        assert!(now_epoch_ms() > 0);
    }
}
