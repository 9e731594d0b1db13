//! Task records and the task repository.
//!
//! Tasks live as one JSON array under [`keys::TASKS`]. The repository keeps
//! no state between calls: each operation reads the whole collection,
//! changes it, and writes it back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::dates;
use crate::error::{Error, Result};
use crate::storage::{self, keys, KeyedStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::InvalidArgument(format!(
                "invalid priority '{other}' (expected low|medium|high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "Id", alias = "id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Weak reference to a category; may dangle.
    #[serde(default, deserialize_with = "lenient_id")]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Accepts `3`, `"3"`, `""` and `null` for an optional id.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse()
                    .map(Some)
                    .map_err(|_| serde::de::Error::custom(format!("invalid id '{text}'")))
            }
        }
    }
}

/// Input for [`TaskRepository::create`]
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for [`TaskRepository::update`]
///
/// `None` leaves a field alone. For nullable fields `Some(None)` clears the
/// value. `completed_at` is derived from `completed` and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub category_id: Option<Option<i64>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Values applied to fields a caller leaves out on create
#[derive(Debug, Clone, Default)]
pub struct TaskDefaults {
    pub priority: Priority,
}

pub struct TaskRepository {
    store: Arc<dyn KeyedStore>,
    seed: Vec<Task>,
    defaults: TaskDefaults,
    reseed_empty: bool,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn KeyedStore>, seed: Vec<Task>, defaults: TaskDefaults) -> Self {
        Self {
            store,
            seed,
            defaults,
            reseed_empty: true,
        }
    }

    /// Whether a stored empty collection is replaced by the seed (default on)
    pub fn with_reseed_empty(mut self, reseed_empty: bool) -> Self {
        self.reseed_empty = reseed_empty;
        self
    }

    /// Seed the collection if the store has none. Idempotent.
    pub fn ensure_initialized(&self) -> Result<()> {
        self.load().map(|_| ())
    }

    /// All tasks in storage order
    pub fn get_all(&self) -> Result<Vec<Task>> {
        self.load()
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.load()?.into_iter().find(|task| task.id == id))
    }

    pub fn create(&self, input: NewTask) -> Result<Task> {
        let title = require_title(input.title)?;
        let mut tasks = self.load()?;
        let max_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        let id = storage::allocate_id(self.store.as_ref(), keys::TASKS, max_id)?;
        let now = dates::now();

        let task = Task {
            id,
            title,
            description: input.description.unwrap_or_default(),
            priority: input.priority.unwrap_or(self.defaults.priority),
            due_date: input.due_date.map(dates::normalize),
            category_id: input.category_id,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        tasks.push(task.clone());
        self.save(&tasks)?;
        info!(task_id = id, "created task");
        Ok(task)
    }

    pub fn update(&self, id: i64, patch: TaskPatch) -> Result<Task> {
        let mut tasks = self.load()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        let now = dates::now();

        if let Some(title) = patch.title {
            task.title = require_title(title)?;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date.map(dates::normalize);
        }
        if let Some(category_id) = patch.category_id {
            task.category_id = category_id;
        }
        match patch.completed {
            Some(true) if !task.completed || task.completed_at.is_none() => {
                task.completed = true;
                task.completed_at = Some(now);
            }
            Some(false) => {
                task.completed = false;
                task.completed_at = None;
            }
            _ => {}
        }
        task.updated_at = now;

        let updated = task.clone();
        self.save(&tasks)?;
        info!(task_id = id, "updated task");
        Ok(updated)
    }

    pub fn complete(&self, id: i64) -> Result<Task> {
        self.set_completion(id, true)
    }

    /// Mark a completed task active again
    pub fn reopen(&self, id: i64) -> Result<Task> {
        self.set_completion(id, false)
    }

    /// Remove the task; returns whether one matched
    ///
    /// The collection is written back either way.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let mut tasks = self.load()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        let removed = tasks.len() != before;
        self.save(&tasks)?;
        info!(task_id = id, removed, "deleted task");
        Ok(removed)
    }

    /// Remove the task if present; succeeds whether or not it existed
    pub fn delete_idempotent(&self, id: i64) -> Result<()> {
        self.delete(id).map(|_| ())
    }

    fn set_completion(&self, id: i64, completed: bool) -> Result<Task> {
        let mut tasks = self.load()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        let now = dates::now();

        task.completed = completed;
        task.completed_at = completed.then_some(now);
        task.updated_at = now;

        let updated = task.clone();
        self.save(&tasks)?;
        info!(task_id = id, completed, "changed task completion");
        Ok(updated)
    }

    fn load(&self) -> Result<Vec<Task>> {
        storage::ensure_initialized(
            self.store.as_ref(),
            keys::TASKS,
            &self.seed,
            self.reseed_empty,
        )
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        storage::save_collection(self.store.as_ref(), keys::TASKS, tasks)
    }
}

/// Blank titles are rejected; anything else is stored exactly as given.
fn require_title(title: String) -> Result<String> {
    if title.trim().is_empty() {
        return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
    }
    Ok(title)
}

/// Split into (active, completed), each in input order
pub fn partition_by_completion(tasks: &[Task]) -> (Vec<Task>, Vec<Task>) {
    let (completed, active): (Vec<Task>, Vec<Task>) =
        tasks.iter().cloned().partition(|task| task.completed);
    (active, completed)
}
