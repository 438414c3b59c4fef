//! In-process key-value backend.

use super::{KeyValueStore, StoreResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Map-backed store for tests and ephemeral sessions.
///
/// Counts writes so callers can observe persistence side effects.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<BTreeMap<String, String>>,
    writes: Cell<u64>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls served so far.
    pub fn write_count(&self) -> u64 {
        self.writes.get()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
