//! Tag registry persisted under the `TAGS` key.
//!
//! # Invariants
//! - Tag ids are unique; `add` rejects duplicates.
//! - Insertion order is preserved.

use crate::model::tag::Tag;
use crate::repo::{RepoError, RepoResult};
use crate::store::{load_json_or_else, save_json, KeyValueStore};
use log::debug;

/// Key under which the tag list is persisted.
pub const TAGS_KEY: &str = "TAGS";

/// Ordered collection of tags backed by a key-value store.
pub struct TagRepository<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
    tags: Vec<Tag>,
    revision: u64,
}

impl<'s, S: KeyValueStore + ?Sized> TagRepository<'s, S> {
    /// Loads the registry, starting empty when nothing usable is stored.
    pub fn open(store: &'s S) -> RepoResult<Self> {
        let tags: Vec<Tag> = load_json_or_else(store, TAGS_KEY, Vec::new)?;
        debug!(
            "event=repo_open module=repo status=ok key={TAGS_KEY} count={}",
            tags.len()
        );
        Ok(Self {
            store,
            tags,
            revision: 0,
        })
    }

    /// Appends `tag`.
    ///
    /// # Errors
    /// - `RepoError::DuplicateId` when a tag with the same id exists.
    pub fn add(&mut self, tag: Tag) -> RepoResult<()> {
        if self.get(&tag.id).is_some() {
            return Err(RepoError::DuplicateId(tag.id));
        }
        let mut next = self.tags.clone();
        next.push(tag);
        self.commit(next)
    }

    /// Replaces the label of tag `id`.
    ///
    /// Returns `false` (and writes nothing) when the id is unknown or the
    /// label is unchanged.
    pub fn update(&mut self, id: &str, label: impl Into<String>) -> RepoResult<bool> {
        let label = label.into();
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        if self.tags[index].label == label {
            return Ok(false);
        }
        let mut next = self.tags.clone();
        next[index].label = label;
        self.commit(next)?;
        Ok(true)
    }

    /// Removes tag `id`. Returns `false` when it was not present.
    pub fn remove(&mut self, id: &str) -> RepoResult<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut next = self.tags.clone();
        next.remove(index);
        self.commit(next)?;
        Ok(true)
    }

    /// All tags in insertion order.
    pub fn list(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    /// Counter bumped on every committed change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tags.iter().position(|tag| tag.id == id)
    }

    fn commit(&mut self, next: Vec<Tag>) -> RepoResult<()> {
        save_json(self.store, TAGS_KEY, &next)?;
        self.tags = next;
        self.revision += 1;
        Ok(())
    }
}
