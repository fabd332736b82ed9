use chrono::NaiveDate;
use serde_json::json;
use tasktree_core::{FuzzyDate, Task, TaskDate, TaskStatus};

#[test]
fn dates_serialize_with_snake_case_variants() {
    assert_eq!(
        serde_json::to_value(TaskDate::NoDate).unwrap(),
        json!("no_date")
    );
    assert_eq!(
        serde_json::to_value(TaskDate::Fuzzy(FuzzyDate::Soon)).unwrap(),
        json!({ "fuzzy": "soon" })
    );
    let date = NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();
    assert_eq!(
        serde_json::to_value(TaskDate::Concrete(date)).unwrap(),
        json!({ "concrete": "2026-09-15" })
    );
}

#[test]
fn statuses_serialize_as_lowercase_strings() {
    assert_eq!(
        serde_json::to_value(TaskStatus::Dismissed).unwrap(),
        json!("dismissed")
    );
    let parsed: TaskStatus = serde_json::from_value(json!("done")).unwrap();
    assert_eq!(parsed, TaskStatus::Done);
}

#[test]
fn tasks_round_trip_through_json() {
    let mut task = Task::new("t1", true).unwrap();
    task.set_title("Buy milk");
    task.set_text("@home\n\nbefore the shop closes");
    task.tags.push("home".to_string());
    task.due_date = TaskDate::Fuzzy(FuzzyDate::Now);
    task.recurring = true;
    task.recurring_term = Some("day".to_string());
    task.set_attribute("backend", "etag", "abc");

    let encoded = serde_json::to_string(&task).unwrap();
    let decoded: Task = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded.tid, "t1");
    assert_eq!(decoded.title, "Buy milk");
    assert_eq!(decoded.text(), "@home\n\nbefore the shop closes");
    assert_eq!(decoded.tags, vec!["home".to_string()]);
    assert_eq!(decoded.due_date, TaskDate::Fuzzy(FuzzyDate::Now));
    assert!(decoded.recurring);
    assert_eq!(decoded.recurring_term.as_deref(), Some("day"));
    assert_eq!(decoded.get_attribute("backend", "etag"), Some("abc"));
    assert_eq!(decoded.status, TaskStatus::Active);
}
