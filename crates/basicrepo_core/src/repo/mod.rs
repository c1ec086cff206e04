//! Repository layer.
//!
//! # Responsibility
//! - Expose one CRUD contract for every record type.
//! - Own the pre-write stamping policy; stores only persist.
//!
//! # Invariants
//! - `save` is the only path that assigns ids and timestamps.
//! - Each operation issues exactly one store request.
//! - Store failures surface unchanged as `RepoError::Store`.

pub mod basic_repo;
