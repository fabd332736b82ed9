use chrono::NaiveDate;
use tasktree_core::{TaskDate, TaskTree};

fn titled(tree: &mut TaskTree, title: &str) -> String {
    let tid = tree.new_task();
    tree.set_title(&tid, title).unwrap();
    tid
}

fn concrete(y: i32, m: u32, d: u32) -> TaskDate {
    TaskDate::Concrete(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

#[test]
fn new_subtask_wires_both_directions() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "project");

    let child = tree.new_subtask(&parent).unwrap();

    assert_eq!(tree.children(&parent), &[child.clone()]);
    assert_eq!(tree.parents(&child), &[parent]);
}

#[test]
fn blank_children_inherit_schedule_and_tags() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "trip");
    tree.set_start_date(&parent, concrete(2026, 9, 1)).unwrap();
    tree.set_due_date(&parent, concrete(2026, 9, 10)).unwrap();
    tree.add_tag(&parent, "travel").unwrap();

    let child = tree.new_subtask(&parent).unwrap();

    let task = tree.get(&child).unwrap();
    assert_eq!(task.start_date, concrete(2026, 9, 1));
    assert_eq!(task.due_date, concrete(2026, 9, 10));
    assert!(task.tags.contains(&"travel".to_string()));
}

#[test]
fn children_with_their_own_state_keep_it_on_attach() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "trip");
    tree.set_due_date(&parent, concrete(2026, 9, 10)).unwrap();
    let child = titled(&mut tree, "independent");
    tree.set_due_date(&child, concrete(2026, 9, 5)).unwrap();

    tree.add_child(&parent, &child).unwrap();

    assert_eq!(tree.get(&child).unwrap().due_date, concrete(2026, 9, 5));
    assert!(tree.get(&child).unwrap().tags.is_empty());
}

#[test]
fn remove_child_deletes_only_blank_children() {
    let mut tree = TaskTree::new();
    let parent = titled(&mut tree, "inbox");
    let blank = tree.new_subtask(&parent).unwrap();
    let kept = tree.new_subtask(&parent).unwrap();
    tree.set_title(&kept, "still needed").unwrap();

    assert!(tree.remove_child(&parent, &blank).unwrap());
    assert!(!tree.contains(&blank));

    assert!(!tree.remove_child(&parent, &kept).unwrap());
    assert!(tree.contains(&kept));
    assert!(tree.children(&parent).is_empty());
}

#[test]
fn set_parent_none_detaches_from_everything() {
    let mut tree = TaskTree::new();
    let first = titled(&mut tree, "one");
    let second = titled(&mut tree, "two");
    let child = titled(&mut tree, "shared");
    tree.add_child(&first, &child).unwrap();
    tree.add_child(&second, &child).unwrap();

    tree.set_parent(&child, None).unwrap();

    assert!(tree.parents(&child).is_empty());
    assert!(tree.children(&first).is_empty());
    assert!(tree.children(&second).is_empty());
}
