//! Wiring of store, seed data and repositories from configuration.

use std::sync::Arc;

use crate::category::{CategoryDefaults, CategoryRepository};
use crate::config::Config;
use crate::error::Result;
use crate::seed::SeedData;
use crate::storage::{self, KeyedStore};
use crate::task::{TaskDefaults, TaskRepository};

/// Both repositories sharing one store
pub struct Services {
    store: Arc<dyn KeyedStore>,
    pub tasks: TaskRepository,
    pub categories: CategoryRepository,
}

impl Services {
    /// Open the configured backend and build the repositories
    pub fn open(config: &Config) -> Result<Self> {
        let store = storage::open(&config.storage)?;
        Self::with_store(store, config)
    }

    /// Build the repositories over an already opened store
    pub fn with_store(store: Arc<dyn KeyedStore>, config: &Config) -> Result<Self> {
        let seed = if config.seed.enabled {
            SeedData::bundled()?
        } else {
            SeedData::empty()
        };

        let tasks = TaskRepository::new(
            Arc::clone(&store),
            seed.tasks,
            TaskDefaults {
                priority: config.tasks.default_priority,
            },
        )
        .with_reseed_empty(config.seed.reseed_empty);
        let categories = CategoryRepository::new(
            Arc::clone(&store),
            seed.categories,
            CategoryDefaults {
                color: config.categories.default_color.clone(),
                icon: config.categories.default_icon.clone(),
            },
        )
        .with_reseed_empty(config.seed.reseed_empty);

        Ok(Self {
            store,
            tasks,
            categories,
        })
    }

    /// Seed both collections if needed
    pub fn ensure_initialized(&self) -> Result<()> {
        self.categories.ensure_initialized()?;
        self.tasks.ensure_initialized()
    }

    pub fn store_location(&self) -> String {
        self.store.describe()
    }
}
