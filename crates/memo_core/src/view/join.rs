//! Memo/tag join: resolves stored tag ids into live tag records.
//!
//! # Invariants
//! - `hydrate` is pure and never fails; unknown tag ids are skipped.
//! - Resolved tags follow registry order, so duplicate ids collapse.
//! - `JoinView` only serves a cached result while both source revisions match.

use crate::model::memo::{HydratedMemo, StoredMemo};
use crate::model::tag::Tag;
use log::trace;
use std::cell::RefCell;
use std::collections::HashSet;

/// Resolves every memo's `tag_ids` against `tags`.
pub fn hydrate(memos: &[StoredMemo], tags: &[Tag]) -> Vec<HydratedMemo> {
    memos.iter().map(|memo| hydrate_one(memo, tags)).collect()
}

/// Resolves one memo's `tag_ids` against `tags`.
pub fn hydrate_one(memo: &StoredMemo, tags: &[Tag]) -> HydratedMemo {
    let wanted: HashSet<&str> = memo.tag_ids.iter().map(String::as_str).collect();
    HydratedMemo {
        id: memo.id.clone(),
        title: memo.title.clone(),
        body: memo.body.clone(),
        tags: tags
            .iter()
            .filter(|tag| wanted.contains(tag.id.as_str()))
            .cloned()
            .collect(),
    }
}

struct Snapshot {
    memo_revision: u64,
    tag_revision: u64,
    memos: Vec<HydratedMemo>,
}

/// Revision-keyed cache of the hydrated memo list.
#[derive(Default)]
pub struct JoinView {
    cache: RefCell<Option<Snapshot>>,
}

impl JoinView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the hydrated list, recomputing when either revision moved.
    pub fn resolve(
        &self,
        memos: &[StoredMemo],
        memo_revision: u64,
        tags: &[Tag],
        tag_revision: u64,
    ) -> Vec<HydratedMemo> {
        let mut cache = self.cache.borrow_mut();
        if let Some(snapshot) = cache.as_ref() {
            if snapshot.memo_revision == memo_revision && snapshot.tag_revision == tag_revision {
                return snapshot.memos.clone();
            }
        }

        trace!(
            "event=join_recompute module=view memo_revision={memo_revision} tag_revision={tag_revision} memos={}",
            memos.len()
        );
        let hydrated = hydrate(memos, tags);
        *cache = Some(Snapshot {
            memo_revision,
            tag_revision,
            memos: hydrated.clone(),
        });
        hydrated
    }
}
