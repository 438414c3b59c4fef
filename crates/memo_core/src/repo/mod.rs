//! Repositories owning the persisted memo and tag collections.
//!
//! # Responsibility
//! - Hold the in-memory copy of one keyed record each (`MEMOS`, `TAGS`).
//! - Write the whole collection back through the key-value store on change.
//!
//! # Invariants
//! - Writes happen before in-memory state changes; a failed write leaves the
//!   repository untouched.
//! - Unknown ids on update/delete are no-ops reported as `false`, not errors.
//! - `revision()` increases on every committed change and only then.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memo_repo;
pub mod tag_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository-level error.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    /// A record with the same id already exists.
    DuplicateId(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "duplicate id: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
