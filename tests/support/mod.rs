#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::Command;
use serde_json::Value;
use taskflow::config::Config;
use taskflow::service::Services;
use taskflow::storage::{FileStore, KeyedStore, MemoryStore};
use tempfile::TempDir;

/// Isolated config file and data directory for one test
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    /// Environment with seeding disabled, so stores start empty
    pub fn new() -> Self {
        Self::with_config("[seed]\nenabled = false\n")
    }

    pub fn with_config(contents: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        fs::write(dir.path().join("config.toml"), contents).expect("write config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn write_file(&self, rel_path: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskflow").expect("binary");
        cmd.env_remove("TASKFLOW_CONFIG")
            .env_remove("TASKFLOW_DATA_DIR")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.config_path())
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }

    /// Run with `--json`, assert success, and return the `data` payload
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(value["status"], "success");
        value["data"].clone()
    }

    pub fn file_services(&self) -> Services {
        let store: Arc<dyn KeyedStore> =
            Arc::new(FileStore::new(self.data_dir(), 1000).expect("file store"));
        Services::with_store(store, &unseeded_config()).expect("services")
    }
}

pub fn unseeded_config() -> Config {
    let mut config = Config::default();
    config.seed.enabled = false;
    config
}

/// Repositories over a fresh memory store with no seed data
pub fn memory_services() -> Services {
    Services::with_store(Arc::new(MemoryStore::new()), &unseeded_config()).expect("services")
}
