//! Runtime configuration for core consumers.
//!
//! # Responsibility
//! - Resolve store location, log settings and tag pruning policy.
//! - Read environment overrides through an injectable lookup.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Resolution never fails; unparsable values fall back to defaults.

use crate::logging::default_log_level;
use log::warn;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "MEMOS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "MEMOS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MEMOS_LOG_DIR";
pub const ENV_PRUNE_DANGLING_TAGS: &str = "MEMOS_PRUNE_DANGLING_TAGS";

/// Default database file name, placed in the system temp directory.
pub const DEFAULT_DB_FILE_NAME: &str = "memos.sqlite3";

/// Resolved settings shared by the FFI and CLI front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file backing the key-value store.
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is enabled only when a directory is set.
    pub log_dir: Option<PathBuf>,
    /// Strip deleted tag ids from stored memos when a tag is deleted.
    pub prune_on_tag_delete: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            prune_on_tag_delete: false,
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = value(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(raw) = value(ENV_PRUNE_DANGLING_TAGS) {
            match parse_flag(&raw) {
                Some(flag) => config.prune_on_tag_delete = flag,
                None => warn!(
                    "event=config_resolve module=config status=fallback key={ENV_PRUNE_DANGLING_TAGS} error_code=invalid_flag"
                ),
            }
        }
        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
