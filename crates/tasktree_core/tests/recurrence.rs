use chrono::{Duration, Local};
use tasktree_core::{TaskDate, TaskStatus, TaskTree};

fn titled(tree: &mut TaskTree, title: &str) -> String {
    let tid = tree.new_task();
    tree.set_title(&tid, title).unwrap();
    tid
}

fn today_plus(days: i64) -> TaskDate {
    TaskDate::Concrete(Local::now().date_naive() + Duration::days(days))
}

#[test]
fn arming_with_a_valid_term_stores_term_and_stamp() {
    let mut tree = TaskTree::new();
    let tid = titled(&mut tree, "standup notes");

    tree.set_recurring(&tid, true, Some("day"), true).unwrap();

    let task = tree.get(&tid).unwrap();
    assert!(task.recurring);
    assert_eq!(task.recurring_term.as_deref(), Some("day"));
    assert_eq!(task.recurring_updated_date, TaskDate::today());
    // A brand-new rule writes its first occurrence to the due date.
    assert_eq!(task.due_date, today_plus(0));
}

#[test]
fn arming_with_an_invalid_term_disarms_and_clears() {
    let mut tree = TaskTree::new();
    let tid = titled(&mut tree, "bad rule");

    tree.set_recurring(&tid, true, Some("blorp"), false).unwrap();

    let task = tree.get(&tid).unwrap();
    assert!(!task.recurring);
    assert_eq!(task.recurring_term, None);
}

#[test]
fn disarm_with_valid_term_still_arms_recurrence() {
    let mut tree = TaskTree::new();
    let tid = titled(&mut tree, "weekly review");

    tree.set_recurring(&tid, false, Some("week"), false).unwrap();

    let task = tree.get(&tid).unwrap();
    assert!(task.recurring);
    assert_eq!(task.recurring_term.as_deref(), Some("week"));
}

#[test]
fn disarm_without_a_valid_term_keeps_the_previous_term() {
    let mut tree = TaskTree::new();
    let tid = titled(&mut tree, "daily log");
    tree.set_recurring(&tid, true, Some("day"), false).unwrap();

    tree.set_recurring(&tid, false, None, false).unwrap();

    let task = tree.get(&tid).unwrap();
    assert!(!task.recurring);
    assert_eq!(task.recurring_term.as_deref(), Some("day"));
}

#[test]
fn toggle_defaults_to_a_daily_term() {
    let mut tree = TaskTree::new();
    let tid = titled(&mut tree, "exercise");

    tree.toggle_recurring(&tid).unwrap();

    let task = tree.get(&tid).unwrap();
    assert!(task.recurring);
    assert_eq!(task.recurring_term.as_deref(), Some("day"));
    assert_eq!(task.due_date, today_plus(0));

    tree.toggle_recurring(&tid).unwrap();
    assert!(!tree.get(&tid).unwrap().recurring);
}

#[test]
fn fresh_subtasks_inherit_the_parent_rule_and_due_date() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "groceries");
    tree.set_recurring(&parent, true, Some("week"), true).unwrap();

    let child = tree.new_subtask(&parent).unwrap();

    let task = tree.get(&child).unwrap();
    assert!(task.recurring);
    assert_eq!(task.recurring_term.as_deref(), Some("week"));
    assert_eq!(task.due_date, tree.get(&parent).unwrap().due_date);
}

#[test]
fn rule_changes_mirror_onto_active_children() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "reports");
    let child = tree.new_subtask(&parent).unwrap();
    tree.set_title(&child, "collect numbers").unwrap();

    tree.set_recurring(&parent, true, Some("monday"), false).unwrap();

    let task = tree.get(&child).unwrap();
    assert!(task.recurring);
    assert_eq!(task.recurring_term.as_deref(), Some("monday"));
}

#[test]
fn next_occurrence_is_strictly_after_an_upcoming_due() {
    let mut tree = TaskTree::new();
    let tid = titled(&mut tree, "on time");
    tree.set_due_date(&tid, today_plus(3)).unwrap();
    tree.set_recurring(&tid, true, Some("day"), false).unwrap();

    assert_eq!(tree.get_next_occurrence(&tid).unwrap(), today_plus(4));
}

#[test]
fn next_occurrence_catches_up_to_today_after_a_late_close() {
    let mut tree = TaskTree::new();
    let tid = titled(&mut tree, "overdue");
    tree.set_due_date(&tid, today_plus(-10)).unwrap();
    tree.set_recurring(&tid, true, Some("day"), false).unwrap();

    // Late closes land on today, not strictly after the old due date.
    assert_eq!(tree.get_next_occurrence(&tid).unwrap(), today_plus(0));
}

#[test]
fn next_occurrence_without_a_term_is_an_error() {
    let mut tree = TaskTree::new();
    let tid = titled(&mut tree, "unarmed");
    tree.set_due_date(&tid, today_plus(1)).unwrap();

    assert!(tree.get_next_occurrence(&tid).is_err());
}

#[test]
fn closing_a_recurring_task_spawns_its_successor_subtree() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "garden");
    let child = tree.new_subtask(&parent).unwrap();
    tree.set_title(&child, "water plants").unwrap();
    tree.set_recurring(&child, true, Some("day"), true).unwrap();
    tree.add_tag(&child, "chores").unwrap();
    let grandchild = tree.new_subtask(&child).unwrap();
    tree.set_title(&grandchild, "fill can").unwrap();

    tree.set_status(&child, Some(TaskStatus::Done), None, false, false)
        .unwrap();

    assert_eq!(tree.get(&child).unwrap().status, TaskStatus::Done);
    assert_eq!(tree.get(&grandchild).unwrap().status, TaskStatus::Done);

    let children = tree.children(&parent).to_vec();
    assert_eq!(children.len(), 2);
    let clone = children[1].clone();
    let clone_task = tree.get(&clone).unwrap();
    assert_eq!(clone_task.status, TaskStatus::Active);
    assert_eq!(clone_task.title, "water plants");
    assert!(clone_task.recurring);
    assert_eq!(clone_task.due_date, today_plus(1));
    assert!(clone_task.tags.contains(&"chores".to_string()));
    assert!(tree.get_tag("chores").unwrap().tasks.contains(&clone));

    // The subtree shape is cloned along with the task.
    let clone_children = tree.children(&clone).to_vec();
    assert_eq!(clone_children.len(), 1);
    let grandchild_clone = tree.get(&clone_children[0]).unwrap();
    assert_eq!(grandchild_clone.title, "fill can");
    assert_eq!(grandchild_clone.status, TaskStatus::Active);
}

#[test]
fn children_of_a_recurring_parent_do_not_spawn_on_their_own() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "routine");
    tree.set_recurring(&parent, true, Some("day"), true).unwrap();
    let child = tree.new_subtask(&parent).unwrap();
    tree.set_title(&child, "step one").unwrap();

    tree.set_status(&child, Some(TaskStatus::Done), None, false, false)
        .unwrap();

    // The recurring parent owns the spawning; the child spawns nothing.
    assert_eq!(tree.children(&parent).len(), 1);
}

#[test]
fn cascaded_closes_do_not_spawn_duplicates() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "cleanup");
    let child = titled(&mut tree, "repeating step");
    tree.set_recurring(&child, true, Some("day"), true).unwrap();
    // Attached after arming, so the rule is the child's own.
    tree.add_child(&parent, &child).unwrap();

    let before = tree.len();
    tree.set_status(&parent, Some(TaskStatus::Done), None, false, false)
        .unwrap();

    assert_eq!(tree.len(), before);
}
