mod support;

use predicates::str::contains;

use support::TestEnv;

#[test]
fn add_edit_list_categories() {
    let env = TestEnv::new();

    let work = env.json(&["category", "add", "Work", "--color", "#3b82f6", "--icon", "Briefcase"]);
    assert_eq!(work["Id"], 1);
    assert_eq!(work["name"], "Work");
    assert_eq!(work["taskCount"], 0);
    assert_eq!(work["live_task_count"], 0);

    let home = env.json(&["category", "add", "Home"]);
    assert_eq!(home["color"], "#6b7280");
    assert_eq!(home["icon"], "Folder");

    let renamed = env.json(&["category", "edit", "2", "--name", "House"]);
    assert_eq!(renamed["name"], "House");
    assert_eq!(renamed["color"], "#6b7280");

    env.json(&["task", "add", "Report", "-c", "1"]);
    env.json(&["task", "add", "Slides", "-c", "1"]);

    let list = env.json(&["category", "list"]);
    let categories = list["categories"].as_array().expect("categories");
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["live_task_count"], 2);
    assert_eq!(categories[0]["taskCount"], 0);
    assert_eq!(categories[1]["live_task_count"], 0);
}

#[test]
fn category_defaults_come_from_config() {
    let env = TestEnv::with_config(
        "[seed]\nenabled = false\n\n[categories]\ndefault_color = \"#111111\"\ndefault_icon = \"Tag\"\n",
    );
    let created = env.json(&["category", "add", "Misc"]);
    assert_eq!(created["color"], "#111111");
    assert_eq!(created["icon"], "Tag");
}

#[test]
fn rm_reports_orphaned_tasks() {
    let env = TestEnv::new();
    env.json(&["category", "add", "Errands"]);
    env.json(&["task", "add", "Post office", "-c", "1"]);

    let removed = env.json(&["category", "rm", "1"]);
    assert_eq!(removed["orphaned_tasks"], 1);

    let task = env.json(&["task", "show", "1"]);
    assert_eq!(task["categoryId"], 1);
    assert!(task.get("category_name").is_none());
}

#[test]
fn missing_category_errors() {
    let env = TestEnv::new();
    env.cmd()
        .args(["category", "show", "5"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Category not found: 5"));

    env.cmd()
        .args(["--json", "category", "edit", "5", "--name", "x"])
        .assert()
        .failure()
        .code(2)
        .stdout(contains("\"entity\": \"category\""));

    env.cmd()
        .args(["category", "rm", "5"])
        .assert()
        .failure()
        .code(2);

    let forced = env.json(&["category", "rm", "5", "--force"]);
    assert_eq!(forced["force"], true);
    assert_eq!(forced["orphaned_tasks"], 0);
}

#[test]
fn seeded_categories_are_listed() {
    let env = TestEnv::with_config("");
    env.cmd()
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(contains("taskflow categories: 3"))
        .stdout(contains("Shopping"));
}
