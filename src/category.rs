//! Categories and the category repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dates;
use crate::error::{Error, Result};
use crate::storage::{self, keys, KeyedStore};
use crate::task::Task;

/// Color given to categories created without one
pub const DEFAULT_COLOR: &str = "#6b7280";

/// Icon given to categories created without one
pub const DEFAULT_ICON: &str = "Folder";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "Id", alias = "id")]
    pub id: i64,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    /// Informational; repository mutations never recompute it.
    #[serde(default)]
    pub task_count: u32,
    pub created_at: DateTime<Utc>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub task_count: Option<u32>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct CategoryDefaults {
    pub color: String,
    pub icon: String,
}

impl Default for CategoryDefaults {
    fn default() -> Self {
        Self {
            color: default_color(),
            icon: default_icon(),
        }
    }
}

pub struct CategoryRepository {
    store: Arc<dyn KeyedStore>,
    seed: Vec<Category>,
    defaults: CategoryDefaults,
    reseed_empty: bool,
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn KeyedStore>, seed: Vec<Category>, defaults: CategoryDefaults) -> Self {
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

    pub fn ensure_initialized(&self) -> Result<()> {
        self.load().map(|_| ())
    }

    pub fn get_all(&self) -> Result<Vec<Category>> {
        self.load()
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.load()?.into_iter().find(|category| category.id == id))
    }

    pub fn create(&self, input: NewCategory) -> Result<Category> {
        let name = require_non_blank("name", input.name)?;
        let mut categories = self.load()?;
        let max_id = categories.iter().map(|category| category.id).max().unwrap_or(0);
        let id = storage::allocate_id(self.store.as_ref(), keys::CATEGORIES, max_id)?;

        let category = Category {
            id,
            name,
            color: non_blank(input.color).unwrap_or_else(|| self.defaults.color.clone()),
            icon: non_blank(input.icon).unwrap_or_else(|| self.defaults.icon.clone()),
            task_count: 0,
            created_at: dates::now(),
        };

        categories.push(category.clone());
        self.save(&categories)?;
        info!(category_id = id, "created category");
        Ok(category)
    }

    pub fn update(&self, id: i64, patch: CategoryPatch) -> Result<Category> {
        let mut categories = self.load()?;
        let category = categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or(Error::CategoryNotFound(id))?;

        if let Some(name) = patch.name {
            category.name = require_non_blank("name", name)?;
        }
        if let Some(color) = patch.color {
            category.color = require_non_blank("color", color)?;
        }
        if let Some(icon) = patch.icon {
            category.icon = require_non_blank("icon", icon)?;
        }
        if let Some(task_count) = patch.task_count {
            category.task_count = task_count;
        }

        let updated = category.clone();
        self.save(&categories)?;
        info!(category_id = id, "updated category");
        Ok(updated)
    }

    /// Remove the category; returns whether one matched
    ///
    /// Tasks pointing at it keep their `category_id`.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let mut categories = self.load()?;
        let before = categories.len();
        categories.retain(|category| category.id != id);
        let removed = categories.len() != before;
        self.save(&categories)?;
        info!(category_id = id, removed, "deleted category");
        Ok(removed)
    }

    pub fn delete_idempotent(&self, id: i64) -> Result<()> {
        self.delete(id).map(|_| ())
    }

    fn load(&self) -> Result<Vec<Category>> {
        storage::ensure_initialized(
            self.store.as_ref(),
            keys::CATEGORIES,
            &self.seed,
            self.reseed_empty,
        )
    }

    fn save(&self, categories: &[Category]) -> Result<()> {
        storage::save_collection(self.store.as_ref(), keys::CATEGORIES, categories)
    }
}

/// Stored color, icon and name are never blank. Values are kept as given.
fn require_non_blank(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!(
            "category {field} cannot be empty"
        )));
    }
    Ok(value)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Category a task points at, if it still exists
pub fn category_for_task<'a>(task: &Task, categories: &'a [Category]) -> Option<&'a Category> {
    let id = task.category_id?;
    categories.iter().find(|category| category.id == id)
}

/// Live task counts keyed by category id
///
/// Counts every task with a `category_id`, dangling references included.
pub fn count_tasks_by_category(tasks: &[Task]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for id in tasks.iter().filter_map(|task| task.category_id) {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}
