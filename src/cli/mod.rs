//! Command-line interface for taskflow
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::service::Services;

mod category;
mod config;
mod task;
mod upload;

/// taskflow - tasks and categories in a local JSON store
#[derive(Parser, Debug)]
#[command(name = "taskflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "TASKFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory for the file store (overrides storage.data_dir)
    #[arg(long, global = true, env = "TASKFLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Validate a file and copy it into the attachments directory
    Upload {
        /// File to upload
        path: PathBuf,

        /// Accepted types, e.g. ".pdf,.png" (overrides uploads.accept)
        #[arg(long)]
        accept: Option<String>,

        /// Maximum size in bytes (overrides uploads.max_size)
        #[arg(long)]
        max_size: Option<u64>,
    },

    /// Configuration helpers
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks (active only unless --completed or --all)
    List {
        /// Show only completed tasks
        #[arg(long, conflicts_with = "all")]
        completed: bool,

        /// Show active and completed tasks
        #[arg(long)]
        all: bool,

        /// Ordering: storage or due
        #[arg(long, default_value = "storage")]
        sort: String,
    },

    /// Show one task
    Show {
        /// Task id
        id: i64,
    },

    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Category id
        #[arg(short, long)]
        category: Option<i64>,
    },

    /// Change fields of a task
    Edit {
        /// Task id
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// Category id
        #[arg(short, long, conflicts_with = "clear_category")]
        category: Option<i64>,

        /// Remove the category
        #[arg(long)]
        clear_category: bool,

        /// Set completion state
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Mark a task completed
    Done {
        /// Task id
        id: i64,
    },

    /// Mark a completed task active again
    Undo {
        /// Task id
        id: i64,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: i64,

        /// Succeed even if the task does not exist
        #[arg(long)]
        force: bool,
    },
}

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories with live task counts
    List,

    /// Show one category
    Show {
        /// Category id
        id: i64,
    },

    /// Create a category
    Add {
        /// Category name
        name: String,

        /// Color value, e.g. "#3b82f6"
        #[arg(long)]
        color: Option<String>,

        /// Icon identifier
        #[arg(long)]
        icon: Option<String>,
    },

    /// Change fields of a category
    Edit {
        /// Category id
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a category (tasks keep their reference)
    Rm {
        /// Category id
        id: i64,

        /// Succeed even if the category does not exist
        #[arg(long)]
        force: bool,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration and resolved paths
    Show,
}

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    /// Effective configuration with command-line overrides applied
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::InvalidArgument("--data-dir cannot be empty".to_string()));
            }
            config.storage.data_dir = Some(dir.clone());
        }
        Ok(config)
    }

    pub fn open_services(&self) -> Result<Services> {
        Services::open(&self.load_config()?)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            config: self.config,
            data_dir: self.data_dir,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Task(cmd) => match cmd {
                TaskCommands::List {
                    completed,
                    all,
                    sort,
                } => task::run_list(&global, task::ListOptions {
                    completed,
                    all,
                    sort,
                }),
                TaskCommands::Show { id } => task::run_show(&global, id),
                TaskCommands::Add {
                    title,
                    description,
                    priority,
                    due,
                    category,
                } => task::run_add(&global, task::AddOptions {
                    title,
                    description,
                    priority,
                    due,
                    category,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    priority,
                    due,
                    clear_due,
                    category,
                    clear_category,
                    completed,
                } => task::run_edit(&global, task::EditOptions {
                    id,
                    title,
                    description,
                    priority,
                    due,
                    clear_due,
                    category,
                    clear_category,
                    completed,
                }),
                TaskCommands::Done { id } => task::run_done(&global, id),
                TaskCommands::Undo { id } => task::run_undo(&global, id),
                TaskCommands::Rm { id, force } => task::run_rm(&global, id, force),
            },
            Commands::Category(cmd) => match cmd {
                CategoryCommands::List => category::run_list(&global),
                CategoryCommands::Show { id } => category::run_show(&global, id),
                CategoryCommands::Add { name, color, icon } => {
                    category::run_add(&global, category::AddOptions { name, color, icon })
                }
                CategoryCommands::Edit {
                    id,
                    name,
                    color,
                    icon,
                } => category::run_edit(&global, category::EditOptions {
                    id,
                    name,
                    color,
                    icon,
                }),
                CategoryCommands::Rm { id, force } => category::run_rm(&global, id, force),
            },
            Commands::Upload {
                path,
                accept,
                max_size,
            } => upload::run(&global, upload::UploadOptions {
                path,
                accept,
                max_size,
            }),
            Commands::Config(ConfigCommands::Show) => config::run_show(&global),
        }
    }
}
