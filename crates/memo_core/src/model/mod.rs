//! Domain model for memos and tags.
//!
//! # Responsibility
//! - Define the persisted record shapes (`StoredMemo`, `Tag`).
//! - Define the derived read shape (`HydratedMemo`) and write payloads.
//!
//! # Invariants
//! - Memos reference tags by id only; tag data lives in the tag registry.
//! - `HydratedMemo` is recomputed from storage and never persisted.

pub mod memo;
pub mod tag;
