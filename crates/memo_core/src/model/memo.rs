//! Memo domain model.
//!
//! # Responsibility
//! - Define the persisted memo record and its hydrated projection.
//! - Define create/update payloads used by the service facade.
//!
//! # Invariants
//! - `StoredMemo::tag_ids` may reference tags that no longer exist.
//! - Order of `tag_ids` carries no meaning.
//!
//! # See also
//! - `view::join` for id resolution.

use crate::model::tag::{Tag, TagId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable memo identifier, stored as a string in the `MEMOS` record.
pub type MemoId = String;

/// Persisted memo shape.
///
/// Serialized as `{ "id", "title", "body", "tagIds" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMemo {
    pub id: MemoId,
    pub title: String,
    /// Older records stored the body under `markdown`.
    #[serde(alias = "markdown")]
    pub body: String,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

impl StoredMemo {
    /// Creates a memo with a freshly generated 128-bit random id.
    pub fn new(title: impl Into<String>, body: impl Into<String>, tag_ids: Vec<TagId>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            body: body.into(),
            tag_ids,
        }
    }

    /// Applies every field present in `patch`.
    ///
    /// Returns `true` when at least one field actually changed.
    pub fn apply(&mut self, patch: &MemoPatch) -> bool {
        let mut changed = false;
        if let Some(title) = patch.title.as_ref() {
            if *title != self.title {
                self.title = title.clone();
                changed = true;
            }
        }
        if let Some(body) = patch.body.as_ref() {
            if *body != self.body {
                self.body = body.clone();
                changed = true;
            }
        }
        if let Some(tag_ids) = patch.tag_ids.as_ref() {
            if *tag_ids != self.tag_ids {
                self.tag_ids = tag_ids.clone();
                changed = true;
            }
        }
        changed
    }
}

/// Memo with tag ids resolved against the live tag registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydratedMemo {
    pub id: MemoId,
    pub title: String,
    pub body: String,
    pub tags: Vec<Tag>,
}

impl HydratedMemo {
    /// Returns whether a tag with `tag_id` is attached.
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|tag| tag.id == tag_id)
    }
}

/// Form payload for creating or fully replacing a memo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoDraft {
    pub title: String,
    pub body: String,
    /// Selected tags; only their ids are persisted.
    pub tags: Vec<Tag>,
}

impl MemoDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tags,
        }
    }

    /// Validates user-facing constraints before persistence.
    ///
    /// # Errors
    /// - `MemoValidationError::BlankTitle` when the title is empty after trim.
    pub fn validate(&self) -> Result<(), MemoValidationError> {
        if self.title.trim().is_empty() {
            return Err(MemoValidationError::BlankTitle);
        }
        Ok(())
    }

    /// Ids of the selected tags, in selection order.
    pub fn tag_ids(&self) -> Vec<TagId> {
        self.tags.iter().map(|tag| tag.id.clone()).collect()
    }

    /// Full-replacement patch equivalent to this draft.
    pub fn to_patch(&self) -> MemoPatch {
        MemoPatch {
            title: Some(self.title.clone()),
            body: Some(self.body.clone()),
            tag_ids: Some(self.tag_ids()),
        }
    }
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tag_ids: Option<Vec<TagId>>,
}

impl MemoPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn tag_ids(mut self, tag_ids: Vec<TagId>) -> Self {
        self.tag_ids = Some(tag_ids);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.tag_ids.is_none()
    }
}

/// Validation errors for memo write payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoValidationError {
    BlankTitle,
}

impl Display for MemoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "memo title cannot be blank"),
        }
    }
}

impl Error for MemoValidationError {}
