//! taskflow category command implementations.

use serde::Serialize;

use crate::category::{count_tasks_by_category, Category, CategoryPatch, NewCategory};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

use super::GlobalOptions;

pub struct AddOptions {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

pub struct EditOptions {
    pub id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Serialize)]
struct CategoryView {
    #[serde(flatten)]
    category: Category,
    /// Tasks currently pointing at this category
    live_task_count: usize,
}

#[derive(Serialize)]
struct CategoryListReport {
    categories: Vec<CategoryView>,
}

#[derive(Serialize)]
struct CategoryDeleteReport {
    id: i64,
    force: bool,
    orphaned_tasks: usize,
}

pub fn run_list(global: &GlobalOptions) -> Result<()> {
    let services = global.open_services()?;
    let counts = count_tasks_by_category(&services.tasks.get_all()?);
    let categories: Vec<CategoryView> = services
        .categories
        .get_all()?
        .into_iter()
        .map(|category| CategoryView {
            live_task_count: counts.get(&category.id).copied().unwrap_or(0),
            category,
        })
        .collect();

    let mut human = HumanOutput::new(format!("taskflow categories: {}", categories.len()));
    for view in &categories {
        human.push_detail(format!(
            "#{} {} [{} {}] {} task(s)",
            view.category.id,
            view.category.name,
            view.category.icon,
            view.category.color,
            view.live_task_count
        ));
    }

    let report = CategoryListReport { categories };
    emit_success(global.output(), "category list", &report, Some(&human))
}

pub fn run_show(global: &GlobalOptions, id: i64) -> Result<()> {
    let services = global.open_services()?;
    let category = services
        .categories
        .get_by_id(id)?
        .ok_or(Error::CategoryNotFound(id))?;
    let counts = count_tasks_by_category(&services.tasks.get_all()?);
    let view = CategoryView {
        live_task_count: counts.get(&id).copied().unwrap_or(0),
        category,
    };

    let human = describe(&format!("taskflow category #{id}"), &view);
    emit_success(global.output(), "category show", &view, Some(&human))
}

pub fn run_add(global: &GlobalOptions, options: AddOptions) -> Result<()> {
    let services = global.open_services()?;
    let category = services.categories.create(NewCategory {
        name: options.name,
        color: options.color,
        icon: options.icon,
    })?;
    let view = CategoryView {
        category,
        live_task_count: 0,
    };

    let mut human = describe(&format!("taskflow category add: #{}", view.category.id), &view);
    human.push_next_step(format!(
        "taskflow task add <title> --category {}",
        view.category.id
    ));
    emit_success(global.output(), "category add", &view, Some(&human))
}

pub fn run_edit(global: &GlobalOptions, options: EditOptions) -> Result<()> {
    let patch = CategoryPatch {
        name: options.name,
        color: options.color,
        icon: options.icon,
        task_count: None,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass at least one field".to_string(),
        ));
    }

    let services = global.open_services()?;
    let category = services.categories.update(options.id, patch)?;
    let counts = count_tasks_by_category(&services.tasks.get_all()?);
    let view = CategoryView {
        live_task_count: counts.get(&category.id).copied().unwrap_or(0),
        category,
    };

    let human = describe(&format!("taskflow category edit: #{}", options.id), &view);
    emit_success(global.output(), "category edit", &view, Some(&human))
}

pub fn run_rm(global: &GlobalOptions, id: i64, force: bool) -> Result<()> {
    let services = global.open_services()?;
    if force {
        services.categories.delete_idempotent(id)?;
    } else if !services.categories.delete(id)? {
        return Err(Error::CategoryNotFound(id));
    }
    let orphaned_tasks = count_tasks_by_category(&services.tasks.get_all()?)
        .get(&id)
        .copied()
        .unwrap_or(0);

    let mut human = HumanOutput::new(format!("taskflow category rm: #{id}"));
    if orphaned_tasks > 0 {
        human.push_warning(format!(
            "{orphaned_tasks} task(s) still reference category {id}"
        ));
    }
    let report = CategoryDeleteReport {
        id,
        force,
        orphaned_tasks,
    };
    emit_success(global.output(), "category rm", &report, Some(&human))
}

fn describe(header: &str, view: &CategoryView) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("name", view.category.name.clone());
    human.push_summary("color", view.category.color.clone());
    human.push_summary("icon", view.category.icon.clone());
    human.push_summary("tasks", view.live_task_count.to_string());
    human
}
