//! Sample data written into an empty store on first access.

use crate::category::Category;
use crate::error::Result;
use crate::task::Task;

const TASKS_JSON: &str = include_str!("../data/seed/tasks.json");
const CATEGORIES_JSON: &str = include_str!("../data/seed/categories.json");

/// Seed collections handed to the repositories
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
}

impl SeedData {
    /// The sample tasks and categories compiled into the binary
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            tasks: serde_json::from_str(TASKS_JSON)?,
            categories: serde_json::from_str(CATEGORIES_JSON)?,
        })
    }

    /// Empty collections (seeding disabled)
    pub fn empty() -> Self {
        Self::default()
    }
}
