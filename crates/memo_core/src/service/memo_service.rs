//! Memo/tag use-case service.
//!
//! # Responsibility
//! - Expose the presentation-facing operations over both repositories.
//! - Validate user input before it reaches storage.
//! - Serve hydrated and filtered memo views that reflect the latest writes.
//!
//! # Invariants
//! - Unknown ids on update/delete are reported as "nothing changed"
//!   (`false` / `None`), never as errors.
//! - Views are recomputed whenever either repository revision moves.
//! - Tag deletion keeps stale ids in stored memos unless
//!   `ServiceOptions::prune_on_tag_delete` is set.
//! - Log events carry ids and counts only, never titles, bodies or labels.

use crate::config::CoreConfig;
use crate::model::memo::{HydratedMemo, MemoDraft, MemoPatch, MemoValidationError};
use crate::model::tag::Tag;
use crate::repo::memo_repo::MemoRepository;
use crate::repo::tag_repo::TagRepository;
use crate::repo::RepoError;
use crate::search::filter::filter_memos;
use crate::store::KeyValueStore;
use crate::view::join::{hydrate_one, JoinView};
use log::{debug, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for memo/tag use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Memo payload failed validation.
    InvalidMemo(MemoValidationError),
    /// Tag label is empty after trim.
    InvalidTagLabel(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMemo(err) => write!(f, "invalid memo: {err}"),
            Self::InvalidTagLabel(label) => write!(f, "invalid tag label: `{label}`"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent memo state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMemo(err) => Some(err),
            Self::InvalidTagLabel(_) | Self::InconsistentState(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<MemoValidationError> for ServiceError {
    fn from(value: MemoValidationError) -> Self {
        Self::InvalidMemo(value)
    }
}

/// Behavior switches for [`MemoService`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    pub prune_on_tag_delete: bool,
}

impl From<&CoreConfig> for ServiceOptions {
    fn from(config: &CoreConfig) -> Self {
        Self {
            prune_on_tag_delete: config.prune_on_tag_delete,
        }
    }
}

/// Facade owning the memo store and tag registry of one application instance.
pub struct MemoService<'s, S: KeyValueStore + ?Sized> {
    memos: MemoRepository<'s, S>,
    tags: TagRepository<'s, S>,
    join: JoinView,
    options: ServiceOptions,
}

impl<'s, S: KeyValueStore + ?Sized> MemoService<'s, S> {
    /// Loads both collections from `store` with default options.
    pub fn open(store: &'s S) -> ServiceResult<Self> {
        Self::with_options(store, ServiceOptions::default())
    }

    /// Loads both collections from `store`.
    pub fn with_options(store: &'s S, options: ServiceOptions) -> ServiceResult<Self> {
        let memos = MemoRepository::open(store)?;
        let tags = TagRepository::open(store)?;
        info!(
            "event=service_open module=service status=ok memos={} tags={} prune_on_tag_delete={}",
            memos.list().len(),
            tags.list().len(),
            options.prune_on_tag_delete
        );
        Ok(Self {
            memos,
            tags,
            join: JoinView::new(),
            options,
        })
    }

    /// Creates a memo from form data and returns its hydrated view.
    pub fn create_memo(&mut self, draft: MemoDraft) -> ServiceResult<HydratedMemo> {
        draft.validate()?;
        let tag_ids = draft.tag_ids();
        let tag_count = tag_ids.len();
        let id = self.memos.create(draft.title, draft.body, tag_ids)?;
        info!("event=memo_create module=service status=ok memo_id={id} tag_count={tag_count}");
        self.hydrated_by_id(&id)
            .ok_or(ServiceError::InconsistentState("created memo not found in read-back"))
    }

    /// Replaces title, body and tags of memo `id` with the form data.
    ///
    /// Returns `None` when the memo does not exist.
    pub fn update_memo(
        &mut self,
        id: &str,
        draft: MemoDraft,
    ) -> ServiceResult<Option<HydratedMemo>> {
        draft.validate()?;
        self.patch_memo(id, draft.to_patch())?;
        Ok(self.hydrated_by_id(id))
    }

    /// Merges a partial update into memo `id`.
    ///
    /// Returns whether anything changed.
    pub fn patch_memo(&mut self, id: &str, patch: MemoPatch) -> ServiceResult<bool> {
        if let Some(title) = patch.title.as_ref() {
            if title.trim().is_empty() {
                return Err(MemoValidationError::BlankTitle.into());
            }
        }
        let changed = self.memos.update(id, &patch)?;
        info!(
            "event=memo_update module=service status={} memo_id={id}",
            change_status(changed)
        );
        Ok(changed)
    }

    /// Deletes memo `id`. Returns whether it existed.
    pub fn delete_memo(&mut self, id: &str) -> ServiceResult<bool> {
        let removed = self.memos.delete(id)?;
        info!(
            "event=memo_delete module=service status={} memo_id={id}",
            change_status(removed)
        );
        Ok(removed)
    }

    /// Registers a tag created elsewhere (e.g. by a tag selector).
    pub fn add_tag(&mut self, tag: Tag) -> ServiceResult<()> {
        validate_label(&tag.label)?;
        let tag_id = tag.id.clone();
        self.tags.add(tag)?;
        info!("event=tag_add module=service status=ok tag_id={tag_id}");
        Ok(())
    }

    /// Creates and registers a tag with a fresh id.
    pub fn create_tag(&mut self, label: impl Into<String>) -> ServiceResult<Tag> {
        let tag = Tag::new(label);
        self.add_tag(tag.clone())?;
        Ok(tag)
    }

    /// Renames tag `id`. Returns whether anything changed.
    pub fn update_tag(&mut self, id: &str, label: impl Into<String>) -> ServiceResult<bool> {
        let label = label.into();
        validate_label(&label)?;
        let changed = self.tags.update(id, label)?;
        info!(
            "event=tag_update module=service status={} tag_id={id}",
            change_status(changed)
        );
        Ok(changed)
    }

    /// Deletes tag `id`. Returns whether it existed.
    ///
    /// Memos keep referencing the id unless pruning on delete is enabled.
    /// Pruning is written before the tag is removed; if removing the tag
    /// then fails, the tag stays registered and a retry completes the delete.
    pub fn delete_tag(&mut self, id: &str) -> ServiceResult<bool> {
        if self.tags.get(id).is_none() {
            info!("event=tag_delete module=service status=noop tag_id={id} pruned_memos=0");
            return Ok(false);
        }
        let mut pruned = 0;
        if self.options.prune_on_tag_delete {
            pruned = self.memos.prune_tag_ids(|tag_id| tag_id != id)?;
        }
        let removed = self.tags.remove(id)?;
        info!(
            "event=tag_delete module=service status={} tag_id={id} pruned_memos={pruned}",
            change_status(removed)
        );
        Ok(removed)
    }

    /// Removes tag ids that no longer resolve from every stored memo.
    ///
    /// Returns the number of memos rewritten.
    pub fn prune_dangling_tag_ids(&mut self) -> ServiceResult<usize> {
        let live: HashSet<String> = self.tags.list().iter().map(|tag| tag.id.clone()).collect();
        let pruned = self
            .memos
            .prune_tag_ids(|tag_id| live.contains(tag_id))?;
        info!("event=tag_prune module=service status=ok pruned_memos={pruned}");
        Ok(pruned)
    }

    /// Tags in registry order.
    pub fn available_tags(&self) -> &[Tag] {
        self.tags.list()
    }

    pub fn find_tag(&self, id: &str) -> Option<&Tag> {
        self.tags.get(id)
    }

    /// All memos with tag ids resolved against the live registry.
    pub fn memos_with_tags(&self) -> Vec<HydratedMemo> {
        self.join.resolve(
            self.memos.list(),
            self.memos.revision(),
            self.tags.list(),
            self.tags.revision(),
        )
    }

    /// Looks up one hydrated memo; `None` signals "not found".
    pub fn find_memo(&self, id: &str) -> Option<HydratedMemo> {
        self.hydrated_by_id(id)
    }

    /// Memos matching `title_query` and carrying every tag in `required_tags`.
    pub fn filtered_view(&self, title_query: &str, required_tags: &[Tag]) -> Vec<HydratedMemo> {
        let memos = self.memos_with_tags();
        let filtered = filter_memos(&memos, title_query, required_tags);
        debug!(
            "event=memo_filter module=service status=ok total={} matched={} required_tags={}",
            memos.len(),
            filtered.len(),
            required_tags.len()
        );
        filtered
    }

    fn hydrated_by_id(&self, id: &str) -> Option<HydratedMemo> {
        self.memos
            .find_by_id(id)
            .map(|memo| hydrate_one(memo, self.tags.list()))
    }
}

fn validate_label(label: &str) -> ServiceResult<()> {
    if label.trim().is_empty() {
        return Err(ServiceError::InvalidTagLabel(label.to_string()));
    }
    Ok(())
}

fn change_status(changed: bool) -> &'static str {
    if changed {
        "ok"
    } else {
        "noop"
    }
}
