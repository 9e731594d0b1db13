use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::lock::{self, FileLock};

use super::{KeyedStore, SeedGuard};

/// Store keeping one `<key>.json` document per key in a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: PathBuf, lock_timeout_ms: u64) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock_timeout_ms,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document stored under `key`
    pub fn document_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn seed_lock_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.seed.lock")))
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("invalid store key '{key}'")))
    }
}

impl KeyedStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.document_path(key)?;
        lock::write_atomic_locked(&path, value.as_bytes(), self.lock_timeout_ms)?;
        debug!(path = %path.display(), bytes = value.len(), "wrote document");
        Ok(())
    }

    fn seed_lock(&self, key: &str) -> Result<SeedGuard<'_>> {
        let path = self.seed_lock_path(key)?;
        Ok(SeedGuard::File(FileLock::acquire(path, self.lock_timeout_ms)?))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.dir.display())
    }
}
