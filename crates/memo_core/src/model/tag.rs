//! Tag domain model.
//!
//! # Invariants
//! - `id` is the identity; `label` is mutable and may repeat across tags.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable tag identifier, stored as a string in the `TAGS` record.
pub type TagId = String;

/// User-defined label attachable to any number of memos.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

impl Tag {
    /// Creates a tag with a freshly generated id.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), label)
    }

    /// Creates a tag with a caller-provided id.
    ///
    /// Used when the id already exists outside core (selector state, imports).
    pub fn with_id(id: impl Into<TagId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}
