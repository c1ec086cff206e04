//! Entity capability.

use uuid::Uuid;

/// Stable identifier of a persisted record.
pub type EntityId = Uuid;

/// A domain record that can report its unique identifier.
///
/// Returns `None` while the record has never been saved.
pub trait Entity {
    fn id(&self) -> Option<EntityId>;
}
