//! taskflow task command implementations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::category::{category_for_task, Category};
use crate::dates;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::task::{partition_by_completion, NewTask, Priority, Task, TaskPatch};

use super::GlobalOptions;

pub struct ListOptions {
    pub completed: bool,
    pub all: bool,
    pub sort: String,
}

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub category: Option<i64>,
}

pub struct EditOptions {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub category: Option<i64>,
    pub clear_category: bool,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Storage,
    Due,
}

impl std::str::FromStr for SortOrder {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "storage" => Ok(SortOrder::Storage),
            "due" => Ok(SortOrder::Due),
            other => Err(Error::InvalidArgument(format!(
                "invalid sort '{other}' (expected storage|due)"
            ))),
        }
    }
}

/// Task plus the presentation fields derived from it
#[derive(Serialize)]
struct TaskView {
    #[serde(flatten)]
    task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_name: Option<String>,
    due_label: String,
    overdue: bool,
}

impl TaskView {
    fn new(task: Task, categories: &[Category]) -> Self {
        let category_name = category_for_task(&task, categories).map(|c| c.name.clone());
        let due_label = dates::format_relative(task.due_date.as_ref());
        let overdue = !task.completed && dates::is_overdue(task.due_date.as_ref());
        Self {
            task,
            category_name,
            due_label,
            overdue,
        }
    }

    fn line(&self) -> String {
        let task = &self.task;
        let mut line = format!("#{} [{}] {}", task.id, task.priority, task.title);
        if let Some(name) = &self.category_name {
            line.push_str(&format!(" ({name})"));
        }
        if !self.due_label.is_empty() {
            line.push_str(&format!(" due {}", self.due_label));
        }
        if self.overdue {
            line.push_str(" OVERDUE");
        }
        line
    }
}

#[derive(Serialize)]
struct TaskListReport {
    tasks: Vec<TaskView>,
    active: usize,
    completed: usize,
}

#[derive(Serialize)]
struct TaskDeleteReport {
    id: i64,
    force: bool,
}

pub fn run_list(global: &GlobalOptions, options: ListOptions) -> Result<()> {
    let sort: SortOrder = options.sort.parse()?;
    let services = global.open_services()?;
    let categories = services.categories.get_all()?;
    let mut tasks = services.tasks.get_all()?;
    if sort == SortOrder::Due {
        tasks = dates::sort_by_due_date(&tasks);
    }

    let (active, completed) = partition_by_completion(&tasks);
    let (active_count, completed_count) = (active.len(), completed.len());
    let to_view = |tasks: Vec<Task>| -> Vec<TaskView> {
        tasks
            .into_iter()
            .map(|task| TaskView::new(task, &categories))
            .collect()
    };

    let mut human = HumanOutput::new(format!(
        "taskflow tasks: {active_count} active, {completed_count} completed"
    ));
    let shown = if options.completed {
        let completed = to_view(completed);
        push_section(&mut human, "completed", &completed);
        completed
    } else if options.all {
        let mut shown = to_view(active);
        push_section(&mut human, "active", &shown);
        let completed = to_view(completed);
        push_section(&mut human, "completed", &completed);
        shown.extend(completed);
        shown
    } else {
        let active = to_view(active);
        push_section(&mut human, "active", &active);
        if completed_count > 0 {
            human.push_next_step("taskflow task list --completed");
        }
        active
    };
    if shown.is_empty() {
        human.push_detail("no tasks");
    }

    let report = TaskListReport {
        tasks: shown,
        active: active_count,
        completed: completed_count,
    };
    emit_success(global.output(), "task list", &report, Some(&human))
}

fn push_section(human: &mut HumanOutput, label: &str, views: &[TaskView]) {
    for view in views {
        human.push_detail(format!("{label}: {}", view.line()));
    }
}

pub fn run_show(global: &GlobalOptions, id: i64) -> Result<()> {
    let services = global.open_services()?;
    let task = services.tasks.get_by_id(id)?.ok_or(Error::TaskNotFound(id))?;
    let categories = services.categories.get_all()?;
    let view = TaskView::new(task, &categories);

    let human = describe(&format!("taskflow task #{id}"), &view);
    emit_success(global.output(), "task show", &view, Some(&human))
}

pub fn run_add(global: &GlobalOptions, options: AddOptions) -> Result<()> {
    let priority = parse_priority(options.priority.as_deref())?;
    let due_date = options.due.as_deref().map(dates::parse_due_date).transpose()?;

    let services = global.open_services()?;
    let task = services.tasks.create(NewTask {
        title: options.title,
        description: options.description,
        priority,
        due_date,
        category_id: options.category,
    })?;
    let categories = services.categories.get_all()?;
    let view = TaskView::new(task, &categories);

    let mut human = describe(&format!("taskflow task add: #{}", view.task.id), &view);
    warn_dangling_category(&mut human, &view);
    human.push_next_step(format!("taskflow task done {}", view.task.id));
    emit_success(global.output(), "task add", &view, Some(&human))
}

pub fn run_edit(global: &GlobalOptions, options: EditOptions) -> Result<()> {
    let due_date = if options.clear_due {
        Some(None)
    } else {
        options
            .due
            .as_deref()
            .map(dates::parse_due_date)
            .transpose()?
            .map(Some)
    };
    let category_id = if options.clear_category {
        Some(None)
    } else {
        options.category.map(Some)
    };

    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        priority: parse_priority(options.priority.as_deref())?,
        due_date,
        category_id,
        completed: options.completed,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass at least one field".to_string(),
        ));
    }

    let services = global.open_services()?;
    let task = services.tasks.update(options.id, patch)?;
    let categories = services.categories.get_all()?;
    let view = TaskView::new(task, &categories);

    let mut human = describe(&format!("taskflow task edit: #{}", options.id), &view);
    warn_dangling_category(&mut human, &view);
    emit_success(global.output(), "task edit", &view, Some(&human))
}

pub fn run_done(global: &GlobalOptions, id: i64) -> Result<()> {
    let services = global.open_services()?;
    let task = services.tasks.complete(id)?;
    let categories = services.categories.get_all()?;
    let view = TaskView::new(task, &categories);

    let mut human = describe(&format!("taskflow task done: #{id}"), &view);
    human.push_next_step(format!("taskflow task undo {id}"));
    emit_success(global.output(), "task done", &view, Some(&human))
}

pub fn run_undo(global: &GlobalOptions, id: i64) -> Result<()> {
    let services = global.open_services()?;
    let task = services.tasks.reopen(id)?;
    let categories = services.categories.get_all()?;
    let view = TaskView::new(task, &categories);

    let human = describe(&format!("taskflow task undo: #{id}"), &view);
    emit_success(global.output(), "task undo", &view, Some(&human))
}

pub fn run_rm(global: &GlobalOptions, id: i64, force: bool) -> Result<()> {
    let services = global.open_services()?;
    if force {
        services.tasks.delete_idempotent(id)?;
    } else if !services.tasks.delete(id)? {
        return Err(Error::TaskNotFound(id));
    }

    let human = HumanOutput::new(format!("taskflow task rm: #{id}"));
    let report = TaskDeleteReport { id, force };
    emit_success(global.output(), "task rm", &report, Some(&human))
}

fn parse_priority(value: Option<&str>) -> Result<Option<Priority>> {
    value.map(str::parse::<Priority>).transpose()
}

fn describe(header: &str, view: &TaskView) -> HumanOutput {
    let task = &view.task;
    let mut human = HumanOutput::new(header);
    human.push_summary("title", task.title.clone());
    if !task.description.is_empty() {
        human.push_summary("description", task.description.clone());
    }
    human.push_summary("priority", task.priority.to_string());
    if task.due_date.is_some() {
        human.push_summary("due", dates::format_full(task.due_date.as_ref()));
    }
    if let Some(name) = &view.category_name {
        human.push_summary("category", name.clone());
    }
    human.push_summary("completed", completion_label(task.completed_at.as_ref()));
    human.push_summary("updated", task.updated_at.to_rfc3339());
    if view.overdue {
        human.push_warning("task is overdue");
    }
    human
}

fn completion_label(completed_at: Option<&DateTime<Utc>>) -> String {
    match completed_at {
        Some(at) => format!("yes ({})", dates::format_full(Some(at))),
        None => "no".to_string(),
    }
}

fn warn_dangling_category(human: &mut HumanOutput, view: &TaskView) {
    if let (Some(id), None) = (view.task.category_id, &view.category_name) {
        human.push_warning(format!("category {id} does not exist"));
    }
}
