//! Typed JSON values over a [`KeyValueStore`].
//!
//! # Invariants
//! - A missing key yields the caller default; the default is produced lazily.
//! - Malformed stored text is recovered to the default and logged at `warn`.
//!   The stored text is left untouched until the next save.
//! - Backend failures always propagate.

use super::{KeyValueStore, StoreError, StoreResult};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Loads `key` as JSON, returning `default` when absent or malformed.
pub fn load_json<T, S>(store: &S, key: &str, default: T) -> StoreResult<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    load_json_or_else(store, key, || default)
}

/// Loads `key` as JSON, invoking `default` only when a fallback is needed.
pub fn load_json_or_else<T, S, F>(store: &S, key: &str, default: F) -> StoreResult<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
    F: FnOnce() -> T,
{
    let Some(raw) = store.get(key)? else {
        return Ok(default());
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!(
                "event=kv_load module=store status=fallback key={key} error_code=malformed_json line={} column={}",
                err.line(),
                err.column()
            );
            Ok(default())
        }
    }
}

/// Serializes `value` as JSON and writes it under `key`.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}
