//! In-memory task tree: arena, edges, tag registry, notifications.
//!
//! # Responsibility
//! - Own the id -> task mapping and the parent/child edge lists.
//! - Own the tag registry and the outbound notification queue.
//! - Provide the raw structural primitives the engine builds on.
//!
//! # Invariants
//! - Child listings are deterministic: attach order is preserved.
//! - Edge lists never contain duplicates.
//! - Notifications are queued, never delivered inline; the host drains
//!   them after the mutating call returns.
//! - Cycle prevention is the caller's job; propagation assumes an acyclic
//!   graph.

use crate::model::tag::Tag;
use crate::model::task::{ModelError, Task, TaskStatus};
use std::collections::{HashMap, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Process-unique task identifier.
pub type TaskId = String;

/// Change notification emitted by completed mutations.
///
/// Events are queued and drained by the host event loop, so observers see
/// them after the mutating call returns; no internal state depends on the
/// delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// A task entered the arena.
    Added(TaskId),
    /// A loaded task changed.
    Modified(TaskId),
    /// A status transition was applied by a live edit.
    StatusChanged {
        tid: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },
    /// A task left the arena.
    Deleted(TaskId),
}

/// Errors from structural tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No task with this id exists in the arena.
    TaskNotFound(TaskId),
    /// A task with this id already exists.
    DuplicateTask(TaskId),
    /// The task record itself is invalid.
    Model(ModelError),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(tid) => write!(f, "task not found: {tid}"),
            Self::DuplicateTask(tid) => write!(f, "task already exists: {tid}"),
            Self::Model(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for TreeError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

/// Arena of task records plus the edge structure relating them.
///
/// All cross-task operations go through `&mut TaskTree` with explicit id
/// lookups; tasks never hold references to each other.
#[derive(Debug, Default)]
pub struct TaskTree {
    pub(crate) tasks: HashMap<TaskId, Task>,
    pub(crate) child_ids: HashMap<TaskId, Vec<TaskId>>,
    pub(crate) parent_ids: HashMap<TaskId, Vec<TaskId>>,
    pub(crate) tags: HashMap<String, Tag>,
    pub(crate) events: VecDeque<TaskEvent>,
    next_id: u64,
}

impl TaskTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh, still-deletable task and returns its id.
    pub fn new_task(&mut self) -> TaskId {
        self.next_id += 1;
        let tid = format!("t{}", self.next_id);
        let task = Task::new(tid.clone(), true).expect("generated tid is non-empty");
        self.tasks.insert(tid.clone(), task);
        self.events.push_back(TaskEvent::Added(tid.clone()));
        tid
    }

    /// Inserts a caller-constructed task, e.g. from a persistence loader.
    ///
    /// # Errors
    /// - `TreeError::DuplicateTask` when the id is already present.
    pub fn insert(&mut self, task: Task) -> Result<(), TreeError> {
        if self.tasks.contains_key(&task.tid) {
            return Err(TreeError::DuplicateTask(task.tid));
        }
        let tid = task.tid.clone();
        self.tasks.insert(tid.clone(), task);
        self.events.push_back(TaskEvent::Added(tid));
        Ok(())
    }

    /// Looks up a task by id.
    pub fn get(&self, tid: &str) -> Option<&Task> {
        self.tasks.get(tid)
    }

    pub(crate) fn get_mut(&mut self, tid: &str) -> Option<&mut Task> {
        self.tasks.get_mut(tid)
    }

    /// Whether the arena holds this id.
    pub fn contains(&self, tid: &str) -> bool {
        self.tasks.contains_key(tid)
    }

    /// Number of tasks in the arena.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Ordered child ids of `tid`.
    pub fn children(&self, tid: &str) -> &[TaskId] {
        self.child_ids.get(tid).map_or(&[][..], Vec::as_slice)
    }

    /// Parent ids of `tid`, in attach order.
    pub fn parents(&self, tid: &str) -> &[TaskId] {
        self.parent_ids.get(tid).map_or(&[][..], Vec::as_slice)
    }

    /// Whether `tid` has at least one child.
    pub fn has_child(&self, tid: &str) -> bool {
        !self.children(tid).is_empty()
    }

    /// Whether `tid` has at least one parent.
    pub fn has_parent(&self, tid: &str) -> bool {
        !self.parents(tid).is_empty()
    }

    /// Wires a parent/child edge in both directions, ignoring duplicates.
    pub(crate) fn attach_edge(&mut self, parent: &str, child: &str) {
        let children = self.child_ids.entry(parent.to_string()).or_default();
        if !children.iter().any(|id| id == child) {
            children.push(child.to_string());
        }
        let parents = self.parent_ids.entry(child.to_string()).or_default();
        if !parents.iter().any(|id| id == parent) {
            parents.push(parent.to_string());
        }
    }

    /// Removes a parent/child edge in both directions.
    pub(crate) fn detach_edge(&mut self, parent: &str, child: &str) {
        if let Some(children) = self.child_ids.get_mut(parent) {
            children.retain(|id| id != child);
        }
        if let Some(parents) = self.parent_ids.get_mut(child) {
            parents.retain(|id| id != parent);
        }
    }

    /// Detaches `tid` from all current parents.
    pub(crate) fn clear_parents(&mut self, tid: &str) {
        let parents: Vec<TaskId> = self.parents(tid).to_vec();
        for parent in parents {
            self.detach_edge(&parent, tid);
        }
    }

    /// Removes a task from the arena, unlinking every edge and tag
    /// membership. Returns whether the task existed.
    pub fn delete_task(&mut self, tid: &str) -> bool {
        let Some(task) = self.tasks.remove(tid) else {
            return false;
        };
        for parent in self.parents(tid).to_vec() {
            self.detach_edge(&parent, tid);
        }
        for child in self.children(tid).to_vec() {
            self.detach_edge(tid, &child);
        }
        self.child_ids.remove(tid);
        self.parent_ids.remove(tid);
        for tag_name in &task.tags {
            if let Some(tag) = self.tags.get_mut(tag_name) {
                tag.update_task(tid, false);
                tag.modified();
            }
        }
        self.events.push_back(TaskEvent::Deleted(tid.to_string()));
        true
    }

    /// Looks up a tag registry entry.
    pub fn get_tag(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    /// Returns the registry entry for `name`, creating it on first use.
    pub fn ensure_tag(&mut self, name: &str) -> &mut Tag {
        self.tags
            .entry(name.to_string())
            .or_insert_with(|| Tag::new(name))
    }

    /// Marks `tid` modified: refreshes its timestamp and, when the task is
    /// loaded, queues one `Modified` event. Returns whether a notification
    /// was queued.
    ///
    /// Suspended tasks report their loaded state without touching anything.
    pub fn sync(&mut self, tid: &str) -> bool {
        let Some(task) = self.tasks.get_mut(tid) else {
            return false;
        };
        if task.sync_disabled {
            return task.loaded;
        }
        task.touch();
        if task.loaded {
            self.events.push_back(TaskEvent::Modified(tid.to_string()));
            true
        } else {
            false
        }
    }

    /// Syncs `tid` and every task below it.
    pub fn recursive_sync(&mut self, tid: &str) {
        self.sync(tid);
        for child in self.children(tid).to_vec() {
            self.recursive_sync(&child);
        }
    }

    /// Hands all queued notifications to the host, clearing the queue.
    pub fn drain_events(&mut self) -> Vec<TaskEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskEvent, TaskTree, TreeError};
    use crate::model::task::Task;

    #[test]
    fn new_task_ids_are_unique_and_queued_as_added() {
        let mut tree = TaskTree::new();
        let a = tree.new_task();
        let b = tree.new_task();
        assert_ne!(a, b);
        let events = tree.drain_events();
        assert_eq!(
            events,
            vec![TaskEvent::Added(a.clone()), TaskEvent::Added(b)]
        );
        assert!(tree.get(&a).is_some());
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut tree = TaskTree::new();
        tree.insert(Task::new("x", false).unwrap()).unwrap();
        let err = tree.insert(Task::new("x", false).unwrap()).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateTask(tid) if tid == "x"));
    }

    #[test]
    fn edges_are_deduplicated_and_ordered() {
        let mut tree = TaskTree::new();
        let parent = tree.new_task();
        let first = tree.new_task();
        let second = tree.new_task();
        tree.attach_edge(&parent, &first);
        tree.attach_edge(&parent, &second);
        tree.attach_edge(&parent, &first);
        assert_eq!(tree.children(&parent), &[first.clone(), second.clone()]);
        assert_eq!(tree.parents(&first), &[parent.clone()]);

        tree.detach_edge(&parent, &first);
        assert_eq!(tree.children(&parent), &[second]);
        assert!(!tree.has_parent(&first));
    }

    #[test]
    fn sync_skips_unloaded_tasks() {
        let mut tree = TaskTree::new();
        tree.insert(Task::new("stub", false).unwrap()).unwrap();
        tree.drain_events();
        assert!(!tree.sync("stub"));
        assert!(tree.drain_events().is_empty());
    }

    #[test]
    fn delete_task_unlinks_edges_and_tag_membership() {
        let mut tree = TaskTree::new();
        let parent = tree.new_task();
        let child = tree.new_task();
        tree.attach_edge(&parent, &child);
        tree.get_mut(&child).unwrap().tags.push("errand".to_string());
        tree.ensure_tag("errand").update_task(&child, true);

        assert!(tree.delete_task(&child));
        assert!(tree.children(&parent).is_empty());
        assert!(!tree.get_tag("errand").unwrap().tasks.contains(&child));
        assert!(!tree.delete_task(&child));
    }
}
