use degree_planner::db::{FilePlanStore, PlanStore, SqlitePlanStore, sanitize_student_name};
use degree_planner::models::Plan;

async fn exercise(store: &dyn PlanStore) {
    let fresh = store.load("alice").await.expect("load unsaved");
    assert!(fresh.selections.is_empty());
    assert!(store.list().await.expect("list").is_empty());

    let mut plan = Plan::new();
    plan.add_course("Fall 2025", "BIBL101_Fall2025_Smith");
    store.save("alice", &plan).await.expect("save");
    store.save("bob", &Plan::new()).await.expect("save");

    let loaded = store.load("alice").await.expect("load");
    assert_eq!(loaded.courses_for_semester("Fall 2025"), ["BIBL101_Fall2025_Smith"]);

    plan.add_course("Spring 2026", "SW501_Spring2026_Lee");
    store.save("alice", &plan).await.expect("overwrite");
    assert_eq!(store.load("alice").await.expect("load").iter_selections().count(), 2);

    assert_eq!(store.list().await.expect("list"), ["alice", "bob"]);
    assert!(store.delete("bob").await.expect("delete"));
    assert!(!store.delete("bob").await.expect("delete again"));
    assert_eq!(store.list().await.expect("list"), ["alice"]);
}

#[tokio::test]
async fn file_store_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FilePlanStore::new(dir.path().join("plans")).await.expect("store");
    exercise(&store).await;
}

#[tokio::test]
async fn sqlite_store_round_trip() {
    let store = SqlitePlanStore::connect("sqlite::memory:").await.expect("store");
    exercise(&store).await;
}

#[tokio::test]
async fn file_store_keeps_names_inside_its_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FilePlanStore::new(dir.path()).await.expect("store");
    store.save("../escape", &Plan::new()).await.expect("save");

    assert!(dir.path().join("___escape.json").is_file());
    assert_eq!(sanitize_student_name("../escape"), "___escape");
    assert_eq!(sanitize_student_name("jane-doe_2"), "jane-doe_2");
}
