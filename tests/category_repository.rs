mod support;

use std::sync::Arc;

use taskflow::category::{
    category_for_task, count_tasks_by_category, Category, CategoryPatch, NewCategory,
    DEFAULT_COLOR, DEFAULT_ICON,
};
use taskflow::error::Error;
use taskflow::storage::{keys, KeyedStore, MemoryStore};
use taskflow::task::NewTask;

use support::{memory_services, unseeded_config, TestEnv};

#[test]
fn create_and_fetch_categories() -> Result<(), Box<dyn std::error::Error>> {
    let services = memory_services();
    let work = services.categories.create(NewCategory {
        color: Some("#3b82f6".to_string()),
        icon: Some("Briefcase".to_string()),
        ..NewCategory::new("Work")
    })?;
    let home = services.categories.create(NewCategory::new("Home"))?;

    assert_eq!(work.id, 1);
    assert_eq!(home.id, 2);
    assert_eq!(services.categories.get_by_id(1)?, Some(work));
    assert_eq!(services.categories.get_all()?.len(), 2);
    Ok(())
}

#[test]
fn blank_name_is_rejected() {
    let services = memory_services();
    let err = services.categories.create(NewCategory::new("  ")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn configured_defaults_apply_to_new_categories() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = unseeded_config();
    config.categories.default_color = "#000000".to_string();
    config.categories.default_icon = "Star".to_string();
    let services = taskflow::service::Services::with_store(
        Arc::new(MemoryStore::new()),
        &config,
    )?;

    let category = services.categories.create(NewCategory::new("Ideas"))?;
    assert_eq!(category.color, "#000000");
    assert_eq!(category.icon, "Star");
    Ok(())
}

#[test]
fn deleting_category_leaves_dangling_task_reference() -> Result<(), Box<dyn std::error::Error>> {
    let services = memory_services();
    let errands = services.categories.create(NewCategory::new("Errands"))?;
    let task = services.tasks.create(NewTask {
        category_id: Some(errands.id),
        ..NewTask::new("Buy stamps")
    })?;

    assert!(services.categories.delete(errands.id)?);
    assert!(!services.categories.delete(errands.id)?);

    let task = services.tasks.get_by_id(task.id)?.expect("task kept");
    assert_eq!(task.category_id, Some(errands.id));
    let categories = services.categories.get_all()?;
    assert!(category_for_task(&task, &categories).is_none());

    let counts = count_tasks_by_category(&services.tasks.get_all()?);
    assert_eq!(counts.get(&errands.id), Some(&1));
    Ok(())
}

#[test]
fn task_count_field_is_only_changed_explicitly() -> Result<(), Box<dyn std::error::Error>> {
    let services = memory_services();
    let work = services.categories.create(NewCategory::new("Work"))?;
    for title in ["a", "b"] {
        services.tasks.create(NewTask {
            category_id: Some(work.id),
            ..NewTask::new(title)
        })?;
    }
    assert_eq!(services.categories.get_by_id(work.id)?.expect("exists").task_count, 0);

    let patched = services.categories.update(
        work.id,
        CategoryPatch {
            task_count: Some(2),
            ..CategoryPatch::default()
        },
    )?;
    assert_eq!(patched.task_count, 2);
    assert_eq!(patched.name, "Work");
    Ok(())
}

#[test]
fn category_ids_are_not_reused_after_delete() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new();
    let services = env.file_services();
    services.categories.create(NewCategory::new("One"))?;
    let two = services.categories.create(NewCategory::new("Two"))?;
    services.categories.delete(two.id)?;

    let three = env.file_services().categories.create(NewCategory::new("Three"))?;
    assert_eq!(three.id, 3);
    Ok(())
}

#[test]
fn record_without_color_or_icon_keeps_the_collection() -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    store.set(
        keys::CATEGORIES,
        r##"[
            {"Id": 1, "name": "Mine", "color": "#ff0000", "icon": "Star", "createdAt": "2026-01-01T00:00:00.000Z"},
            {"Id": 2, "name": "NoColor", "createdAt": "2026-01-02T00:00:00.000Z"}
        ]"##,
    )?;
    let services = taskflow::service::Services::with_store(
        Arc::clone(&store),
        &taskflow::config::Config::default(),
    )?;

    let categories: Vec<Category> = services.categories.get_all()?;
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Mine", "NoColor"]);
    assert_eq!(categories[1].color, DEFAULT_COLOR);
    assert_eq!(categories[1].icon, DEFAULT_ICON);
    Ok(())
}

#[test]
fn stored_empty_categories_are_reseeded() -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    store.set(keys::CATEGORIES, "[]")?;
    let services = taskflow::service::Services::with_store(
        Arc::clone(&store),
        &taskflow::config::Config::default(),
    )?;

    let seed = taskflow::seed::SeedData::bundled()?;
    assert_eq!(services.categories.get_all()?, seed.categories);
    Ok(())
}

#[test]
fn patched_name_reads_back_exactly() -> Result<(), Box<dyn std::error::Error>> {
    let services = memory_services();
    let category = services.categories.create(NewCategory::new("Work"))?;

    services.categories.update(
        category.id,
        CategoryPatch {
            name: Some(" Deep Work ".to_string()),
            ..CategoryPatch::default()
        },
    )?;
    let stored = services.categories.get_by_id(category.id)?.expect("exists");
    assert_eq!(stored.name, " Deep Work ");

    let blank = services.categories.update(
        category.id,
        CategoryPatch {
            name: Some("   ".to_string()),
            ..CategoryPatch::default()
        },
    );
    assert!(matches!(blank, Err(Error::InvalidArgument(_))));
    Ok(())
}

#[test]
fn stored_color_is_never_blank() -> Result<(), Box<dyn std::error::Error>> {
    let services = memory_services();
    let created = services.categories.create(NewCategory {
        color: Some(" ".to_string()),
        ..NewCategory::new("Blank")
    })?;
    assert_eq!(created.color, DEFAULT_COLOR);

    let padded = services.categories.update(
        created.id,
        CategoryPatch {
            color: Some(" #123456 ".to_string()),
            ..CategoryPatch::default()
        },
    )?;
    assert_eq!(padded.color, " #123456 ");

    let blank = services.categories.update(
        created.id,
        CategoryPatch {
            color: Some(String::new()),
            ..CategoryPatch::default()
        },
    );
    assert!(matches!(blank, Err(Error::InvalidArgument(_))));
    assert_eq!(
        services.categories.get_by_id(created.id)?.expect("exists").color,
        " #123456 "
    );
    Ok(())
}
