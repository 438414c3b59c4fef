//! Key-value persistence seam and JSON adapter.
//!
//! # Responsibility
//! - Define the opaque string key-value contract core persists through.
//! - Provide typed JSON load/save helpers on top of any backend.
//!
//! # Invariants
//! - A `set` fully replaces the previous value for that key.
//! - Backends never interpret stored text; parsing happens in `json`.
//!
//! # See also
//! - `repo` for the `MEMOS` and `TAGS` records stored here.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod json;
pub mod memory;
pub mod sqlite;

pub use json::{load_json, load_json_or_else, save_json};
pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of the storage medium or of value serialization.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "key-value store is missing required table `{table}`")
            }
            Self::Serialize { key, source } => {
                write!(f, "failed to serialize value for key `{key}`: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
            Self::Serialize { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Opaque persistent string key-value store.
///
/// Methods take `&self` so several repositories can share one store; backends
/// that need mutation use interior mutability.
pub trait KeyValueStore {
    /// Reads the raw text stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Writes `value` under `key`, replacing any prior value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}
