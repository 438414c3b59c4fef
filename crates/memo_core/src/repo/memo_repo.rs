//! Memo store persisted under the `MEMOS` key.
//!
//! # Responsibility
//! - Create memos with fresh random ids.
//! - Merge partial updates and delete by id.
//!
//! # Invariants
//! - Memo ids are unique (UUID v4, collisions are not handled).
//! - Insertion order is preserved.
//! - `tag_ids` are stored as given; they are not checked against the tag
//!   registry.

use crate::model::memo::{MemoId, MemoPatch, StoredMemo};
use crate::model::tag::TagId;
use crate::repo::RepoResult;
use crate::store::{load_json_or_else, save_json, KeyValueStore};
use log::debug;

/// Key under which the memo list is persisted.
pub const MEMOS_KEY: &str = "MEMOS";

/// Ordered collection of stored memos backed by a key-value store.
pub struct MemoRepository<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
    memos: Vec<StoredMemo>,
    revision: u64,
}

impl<'s, S: KeyValueStore + ?Sized> MemoRepository<'s, S> {
    /// Loads the memo list, starting empty when nothing usable is stored.
    pub fn open(store: &'s S) -> RepoResult<Self> {
        let memos: Vec<StoredMemo> = load_json_or_else(store, MEMOS_KEY, Vec::new)?;
        debug!(
            "event=repo_open module=repo status=ok key={MEMOS_KEY} count={}",
            memos.len()
        );
        Ok(Self {
            store,
            memos,
            revision: 0,
        })
    }

    /// Appends a new memo and returns its generated id.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        tag_ids: Vec<TagId>,
    ) -> RepoResult<MemoId> {
        let memo = StoredMemo::new(title, body, tag_ids);
        let id = memo.id.clone();
        let mut next = self.memos.clone();
        next.push(memo);
        self.commit(next)?;
        Ok(id)
    }

    /// Merges `patch` into memo `id`.
    ///
    /// Returns `false` (and writes nothing) when the id is unknown or no field
    /// changes.
    pub fn update(&mut self, id: &str, patch: &MemoPatch) -> RepoResult<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut next = self.memos.clone();
        if !next[index].apply(patch) {
            return Ok(false);
        }
        self.commit(next)?;
        Ok(true)
    }

    /// Removes memo `id`. Returns `false` when it was not present.
    pub fn delete(&mut self, id: &str) -> RepoResult<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut next = self.memos.clone();
        next.remove(index);
        self.commit(next)?;
        Ok(true)
    }

    /// All memos in insertion order.
    pub fn list(&self) -> &[StoredMemo] {
        &self.memos
    }

    /// Looks a memo up by id; `None` is the not-found signal.
    pub fn find_by_id(&self, id: &str) -> Option<&StoredMemo> {
        self.memos.iter().find(|memo| memo.id == id)
    }

    /// Drops every tag id for which `keep` returns `false`.
    ///
    /// Returns the number of memos whose `tag_ids` changed.
    pub fn prune_tag_ids(&mut self, keep: impl Fn(&str) -> bool) -> RepoResult<usize> {
        let mut next = self.memos.clone();
        let mut touched = 0;
        for memo in &mut next {
            let before = memo.tag_ids.len();
            memo.tag_ids.retain(|tag_id| keep(tag_id.as_str()));
            if memo.tag_ids.len() != before {
                touched += 1;
            }
        }
        if touched > 0 {
            self.commit(next)?;
        }
        Ok(touched)
    }

    /// Counter bumped on every committed change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.memos.iter().position(|memo| memo.id == id)
    }

    fn commit(&mut self, next: Vec<StoredMemo>) -> RepoResult<()> {
        save_json(self.store, MEMOS_KEY, &next)?;
        self.memos = next;
        self.revision += 1;
        Ok(())
    }
}
