//! taskflow - task and category management library
//!
//! This library provides the data layer behind the taskflow CLI: tasks and
//! categories kept as whole JSON collections in a keyed store, plus the date
//! and upload helpers used when presenting them.
//!
//! # Core Concepts
//!
//! - **Keyed store**: one JSON document per collection, file or memory backed
//! - **Lazy seeding**: an absent or unreadable collection is replaced by the
//!   bundled sample data on first access
//! - **Repositories**: stateless CRUD over the task and category collections
//! - **Weak references**: a task's category may be deleted under it
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `storage`: `KeyedStore` trait, file and memory backends, seeding
//! - `lock`: File locking and atomic writes for the file backend
//! - `task`: Task model and repository
//! - `category`: Category model and repository
//! - `dates`: Relative date labels, overdue checks, due-date ordering
//! - `upload`: Upload validation and attachment storage
//! - `seed`: Bundled sample data
//! - `service`: Repository wiring from configuration
//! - `output`: JSON envelopes and human-readable command output

pub mod category;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod lock;
pub mod output;
pub mod seed;
pub mod service;
pub mod storage;
pub mod task;
pub mod upload;

pub use error::{Error, Result};
