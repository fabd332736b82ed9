//! Hierarchy edits and the attribute inheritance they trigger.
//!
//! Attaching a still-blank task under a parent copies the parent's
//! schedule, tags, and recurrence onto it. Tasks that already carry real
//! state keep it; only the edge changes.

use crate::engine::EngineError;
use crate::tree::{TaskId, TaskTree};

impl TaskTree {
    /// Attaches `child` under `parent` and inherits parent attributes into
    /// a still-blank child.
    ///
    /// A blank child (one that can still be silently deleted) receives the
    /// parent's tags and recurrence, and, unless it is recurring, the
    /// parent's start and due dates. A child with its own state only gains
    /// the edge.
    pub fn add_child(&mut self, parent: &str, child: &str) -> Result<(), EngineError> {
        log::debug!("adding child {child} to task {parent}");
        let (parent_loaded, parent_start, parent_due, parent_tags) = {
            let task = self.require_mut(parent)?;
            task.can_be_deleted = false;
            (
                task.loaded,
                task.start_date,
                task.due_date,
                task.tags.clone(),
            )
        };
        let (child_blank, child_recurring) = {
            let task = self.require(child)?;
            (task.can_be_deleted, task.recurring)
        };

        self.attach_edge(parent, child);

        if parent_loaded && child_blank {
            if !child_recurring {
                self.set_start_date(child, parent_start)?;
                self.set_due_date(child, parent_due)?;
            }
            for tag in parent_tags {
                self.add_tag(child, &tag)?;
            }
            self.inherit_recursion(child)?;
        }
        self.sync(parent);
        Ok(())
    }

    /// Detaches `child` from `parent`. A child that never gained real
    /// state is deleted outright; the return value reports whether that
    /// happened.
    pub fn remove_child(&mut self, parent: &str, child: &str) -> Result<bool, EngineError> {
        self.require(parent)?;
        let blank = self.require(child)?.can_be_deleted;
        self.detach_edge(parent, child);
        if blank {
            self.delete_task(child);
            self.sync(parent);
            Ok(true)
        } else {
            self.sync(parent);
            Ok(false)
        }
    }

    /// Replaces every current parent with `parent`, or detaches from all
    /// parents when `None`.
    ///
    /// Moving under a parent pulls this task's concrete due date up to the
    /// parent's tighter constraint and re-evaluates recurrence
    /// inheritance.
    pub fn set_parent(&mut self, tid: &str, parent: Option<&str>) -> Result<(), EngineError> {
        self.require(tid)?;
        self.clear_parents(tid);
        if let Some(parent) = parent {
            self.require(parent)?;
            self.attach_edge(parent, tid);
            let constraint = self.get_due_date_constraint(parent)?;
            let own_due = self.require(tid)?.due_date;
            if !constraint.is_fuzzy() && !own_due.is_fuzzy() && constraint < own_due {
                self.set_due_date(tid, constraint)?;
            }
            self.inherit_recursion(tid)?;
        }
        self.recursive_sync(tid);
        Ok(())
    }

    /// Creates a fresh task attached under `tid`, returning the new id.
    pub fn new_subtask(&mut self, tid: &str) -> Result<TaskId, EngineError> {
        self.require(tid)?;
        let child = self.new_task();
        self.add_child(tid, &child)?;
        Ok(child)
    }
}
