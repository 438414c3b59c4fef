//! Core domain logic for the memos app.
//! This crate is the single source of truth for memo/tag invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;
pub mod view;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::memo::{HydratedMemo, MemoDraft, MemoId, MemoPatch, MemoValidationError, StoredMemo};
pub use model::tag::{Tag, TagId};
pub use repo::memo_repo::{MemoRepository, MEMOS_KEY};
pub use repo::tag_repo::{TagRepository, TAGS_KEY};
pub use repo::{RepoError, RepoResult};
pub use search::filter::{filter_memos, MemoFilter};
pub use service::memo_service::{MemoService, ServiceError, ServiceOptions, ServiceResult};
pub use store::{
    load_json, load_json_or_else, save_json, KeyValueStore, MemoryKvStore, SqliteKvStore,
    StoreError, StoreResult,
};
pub use view::join::{hydrate, JoinView};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
