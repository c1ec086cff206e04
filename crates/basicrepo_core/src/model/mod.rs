//! Entity contract and record metadata.
//!
//! # Responsibility
//! - Define the identity capability every persisted record must expose.
//! - Define the metadata block (`id`, `created_at`, `updated_at`) embedded in
//!   every record, and the pure stamping rules applied before writes.
//!
//! # Invariants
//! - Metadata is only populated by stamping or by decoding a stored row.
//! - An assigned `id` never changes for the lifetime of a record.

pub mod entity;
pub mod meta;
