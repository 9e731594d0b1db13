use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;

use super::{KeyedStore, SeedGuard};

/// Process-local store; contents are dropped with the store
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
    seed: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyedStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let documents = self
            .documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut documents = self
            .documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        documents.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn seed_lock(&self, _key: &str) -> Result<SeedGuard<'_>> {
        let guard = self.seed.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(SeedGuard::Memory(guard))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
