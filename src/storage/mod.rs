//! Keyed document storage for taskflow
//!
//! Every collection lives as one JSON array under a single key:
//!
//! ```text
//! <data_dir>/
//!   taskflow_tasks.json         # Task collection
//!   taskflow_tasks.json.lock    # Write lock (fs2)
//!   taskflow_tasks.seed.lock    # Initialization lock
//!   taskflow_tasks_seq.json     # Last issued task id
//!   taskflow_categories.json    # Category collection
//!   attachments/                # Files accepted by `taskflow upload`
//! ```
//!
//! Reads are forgiving: a document that cannot be read or parsed is treated
//! as absent, which makes the repositories reseed it. So does a stored empty
//! array unless `seed.reseed_empty` is off. Writes propagate their failures.

use std::sync::{Arc, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::config::{StorageConfig, StoreBackend};
use crate::error::{Error, Result};
use crate::lock::FileLock;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Store keys for the two collections
pub mod keys {
    pub const TASKS: &str = "taskflow_tasks";
    pub const CATEGORIES: &str = "taskflow_categories";
}

/// Guard serializing collection initialization for one key
#[derive(Debug)]
pub enum SeedGuard<'a> {
    File(FileLock),
    Memory(MutexGuard<'a, ()>),
}

/// Persistence facade over a key-value medium
pub trait KeyedStore: Send + Sync {
    /// Raw document stored under `key`, `None` if never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Exclusive guard held while a collection is checked and seeded.
    fn seed_lock(&self, key: &str) -> Result<SeedGuard<'_>>;

    /// Human-readable location, e.g. `file:/home/me/.local/share/taskflow`.
    fn describe(&self) -> String;
}

/// Open the backend selected by configuration
pub fn open(config: &StorageConfig) -> Result<Arc<dyn KeyedStore>> {
    match config.backend {
        StoreBackend::File => {
            let dir = config.resolved_data_dir()?;
            debug!(dir = %dir.display(), "opening file store");
            Ok(Arc::new(FileStore::new(dir, config.lock_timeout_ms)?))
        }
        StoreBackend::Memory => {
            debug!("opening memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Load a typed collection, mapping unavailable or corrupt documents to `None`
pub fn load_collection<T: DeserializeOwned>(store: &dyn KeyedStore, key: &str) -> Option<Vec<T>> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(key, error = %err, "store unavailable; treating collection as absent");
            return None;
        }
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => {
            debug!(key, count = items.len(), "loaded collection");
            Some(items)
        }
        Err(err) => {
            warn!(key, error = %err, "corrupt collection; treating as absent");
            None
        }
    }
}

/// Serialize and store a whole collection
pub fn save_collection<T: Serialize>(store: &dyn KeyedStore, key: &str, items: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    store.set(key, &json)?;
    debug!(key, count = items.len(), "saved collection");
    Ok(())
}

/// Return the stored collection, writing `seed` first if none exists
///
/// Runs the check-and-seed under the key's seed lock, so concurrent callers
/// seed at most once. With `reseed_empty` a stored empty array also counts
/// as missing. An empty seed never overwrites anything.
pub fn ensure_initialized<T>(
    store: &dyn KeyedStore,
    key: &str,
    seed: &[T],
    reseed_empty: bool,
) -> Result<Vec<T>>
where
    T: Serialize + DeserializeOwned + Clone,
{
    let keep = |items: &[T]| !items.is_empty() || !reseed_empty || seed.is_empty();

    if let Some(items) = load_collection(store, key).filter(|items| keep(items.as_slice())) {
        return Ok(items);
    }

    let _guard = store.seed_lock(key)?;
    if let Some(items) = load_collection(store, key).filter(|items| keep(items.as_slice())) {
        return Ok(items);
    }

    save_collection(store, key, seed)?;
    info!(key, count = seed.len(), "seeded collection");
    Ok(seed.to_vec())
}

/// Allocate the next record id for the collection under `key`
///
/// The id is one past the larger of `max_existing` and the last id issued
/// for the key (kept under `<key>_seq`), so deleting the newest record does
/// not free its id. A missing or unreadable counter counts as 0.
pub fn allocate_id(store: &dyn KeyedStore, key: &str, max_existing: i64) -> Result<i64> {
    let seq_key = format!("{key}_seq");
    let last_issued = store
        .get(&seq_key)
        .ok()
        .flatten()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(0);

    let id = max_existing
        .max(last_issued)
        .checked_add(1)
        .ok_or_else(|| Error::OperationFailed(format!("id space exhausted for '{key}'")))?;
    store.set(&seq_key, &id.to_string())?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i64,
    }

    #[test]
    fn absent_key_loads_as_none() {
        let store = MemoryStore::new();
        assert!(load_collection::<Item>(&store, "missing").is_none());
    }

    #[test]
    fn corrupt_document_loads_as_none() {
        let store = MemoryStore::new();
        store.set("items", "{not json").unwrap();
        assert!(load_collection::<Item>(&store, "items").is_none());

        store.set("items", "{\"id\": 1}").unwrap();
        assert!(load_collection::<Item>(&store, "items").is_none());
    }

    #[test]
    fn ensure_initialized_seeds_once() {
        let store = MemoryStore::new();
        let seed = vec![Item { id: 1 }, Item { id: 2 }];

        let first = ensure_initialized(&store, "items", &seed, true).unwrap();
        assert_eq!(first, seed);

        save_collection(&store, "items", &[Item { id: 7 }]).unwrap();
        let second = ensure_initialized(&store, "items", &seed, true).unwrap();
        assert_eq!(second, vec![Item { id: 7 }]);
    }

    #[test]
    fn stored_empty_collection_is_reseeded_by_default() {
        let store = MemoryStore::new();
        save_collection::<Item>(&store, "items", &[]).unwrap();

        let items = ensure_initialized(&store, "items", &[Item { id: 1 }], true).unwrap();
        assert_eq!(items, vec![Item { id: 1 }]);
    }

    #[test]
    fn stored_empty_collection_kept_when_reseed_disabled() {
        let store = MemoryStore::new();
        save_collection::<Item>(&store, "items", &[]).unwrap();

        let items = ensure_initialized(&store, "items", &[Item { id: 1 }], false).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn empty_seed_leaves_empty_collection_alone() {
        let store = MemoryStore::new();
        let items = ensure_initialized::<Item>(&store, "items", &[], true).unwrap();
        assert!(items.is_empty());
        assert_eq!(store.get("items").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn allocate_id_never_goes_backwards() {
        let store = MemoryStore::new();
        assert_eq!(allocate_id(&store, "items", 0).unwrap(), 1);
        assert_eq!(allocate_id(&store, "items", 1).unwrap(), 2);
        // Highest record deleted: the counter still remembers 2.
        assert_eq!(allocate_id(&store, "items", 1).unwrap(), 3);
        // Records imported above the counter push it forward.
        assert_eq!(allocate_id(&store, "items", 10).unwrap(), 11);
    }

    #[test]
    fn allocate_id_reports_exhausted_id_space() {
        let store = MemoryStore::new();
        store.set("items_seq", &i64::MAX.to_string()).unwrap();
        assert!(matches!(
            allocate_id(&store, "items", 3),
            Err(Error::OperationFailed(_))
        ));
        assert!(matches!(
            allocate_id(&MemoryStore::new(), "items", i64::MAX),
            Err(Error::OperationFailed(_))
        ));
    }

    #[test]
    fn allocate_id_ignores_garbage_counter() {
        let store = MemoryStore::new();
        store.set("items_seq", "not a number").unwrap();
        assert_eq!(allocate_id(&store, "items", 4).unwrap(), 5);
    }

    #[test]
    fn corrupt_document_is_reseeded() {
        let store = MemoryStore::new();
        store.set("items", "garbage").unwrap();

        let items = ensure_initialized(&store, "items", &[Item { id: 3 }], true).unwrap();
        assert_eq!(items, vec![Item { id: 3 }]);
        assert_eq!(
            load_collection::<Item>(&store, "items"),
            Some(vec![Item { id: 3 }])
        );
    }
}
