use degree_planner::models::Plan;

#[test]
fn adding_twice_keeps_one_entry() {
    let mut plan = Plan::new();
    assert!(plan.add_course("Fall 2025", "BIBL101_Fall2025_Smith"));
    assert!(!plan.add_course("Fall 2025", "BIBL101_Fall2025_Smith"));
    assert_eq!(plan.courses_for_semester("Fall 2025"), ["BIBL101_Fall2025_Smith"]);
}

#[test]
fn same_course_may_appear_in_two_semesters() {
    let mut plan = Plan::new();
    plan.add_course("Fall 2025", "X");
    plan.add_course("Spring 2026", "X");
    assert_eq!(plan.iter_selections().count(), 2);
}

#[test]
fn removing_an_absent_course_changes_nothing() {
    let mut plan = Plan::new();
    plan.add_course("Fall 2025", "A");
    let before = plan.clone();

    assert!(!plan.remove_course("Fall 2025", "B"));
    assert!(!plan.remove_course("Spring 2026", "A"));
    assert_eq!(plan, before);

    assert!(plan.remove_course("Fall 2025", "A"));
    assert!(plan.courses_for_semester("Fall 2025").is_empty());
    assert!(plan.updated_at >= before.updated_at);
}

#[test]
fn json_round_trip_preserves_order() {
    let mut plan = Plan::new();
    plan.add_course("Spring 2026", "C");
    plan.add_course("Fall 2025", "B");
    plan.add_course("Fall 2025", "A");
    plan.notes = "field ed next year".to_string();

    let restored = Plan::from_json(&plan.to_json().expect("serialize")).expect("deserialize");
    assert_eq!(restored.courses_for_semester("Fall 2025"), ["B", "A"]);
    assert_eq!(restored.notes, plan.notes);
    assert_eq!(restored.created_at, plan.created_at);
}

#[test]
fn accepts_naive_timestamps_and_repeated_ids() {
    let raw = r#"{
        "selections": {"Fall 2025": ["A", "B", "A"]},
        "notes": "",
        "created_at": "2025-08-01T09:30:00.123456",
        "updated_at": "2025-08-02T10:00:00"
    }"#;
    let plan = Plan::from_json(raw).expect("lenient parse");
    assert_eq!(plan.courses_for_semester("Fall 2025"), ["A", "B"]);
    assert_eq!(plan.created_at.to_rfc3339(), "2025-08-01T09:30:00.123456+00:00");
}

#[test]
fn missing_fields_default() {
    let plan = Plan::from_json("{}").expect("empty object");
    assert!(plan.selections.is_empty());
    assert!(plan.notes.is_empty());
}

#[test]
fn file_round_trip_and_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plan.json");

    let fresh = Plan::load_from_file(&path).expect("missing file is a fresh plan");
    assert!(fresh.selections.is_empty());

    let mut plan = Plan::new();
    plan.add_course("Fall 2025", "A");
    plan.save_to_file(&path).expect("save");
    assert_eq!(Plan::load_from_file(&path).expect("load"), plan);
}
