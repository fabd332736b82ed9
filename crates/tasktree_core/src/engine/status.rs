//! Status transitions and their cascades.
//!
//! Closing a task cascades downward to its open children; reopening a
//! task bubbles upward and reopens closed parents. Closing the last open
//! copy of a recurring task spawns its next occurrence before the status
//! flips, while the task still counts as Active to its parents.

use crate::engine::EngineError;
use crate::model::date::TaskDate;
use crate::model::task::TaskStatus;
use crate::tree::{TaskEvent, TaskTree};

impl TaskTree {
    /// Reopens a closed task, or closes anything else as Done, routing
    /// through the full transition logic so cascades and recurrence
    /// spawning apply.
    pub fn toggle_status(&mut self, tid: &str) -> Result<(), EngineError> {
        let next = if self.require(tid)?.status.is_closed() {
            TaskStatus::Active
        } else {
            TaskStatus::Done
        };
        self.set_status(tid, Some(next), None, false, false)
    }

    /// Applies a status transition with its cascades.
    ///
    /// Closing cascades to open loaded children, each closed with the same
    /// `done_date`. A directly closed recurring task whose parents are not
    /// themselves recurring spawns its next occurrence first, so the clone
    /// attaches while this task is still Active. Reopening reopens closed
    /// loaded parents, never children.
    ///
    /// `propagation` marks a cascaded call from a relative; it suppresses
    /// recurrence spawning so a closing parent does not fan out clones of
    /// every recurring child. `init` marks a loader replay; it suppresses
    /// the `StatusChanged` notification.
    ///
    /// Passing `None` for the status records the edit (the task becomes
    /// permanent and is synced) without transitioning.
    pub fn set_status(
        &mut self,
        tid: &str,
        status: Option<TaskStatus>,
        done_date: Option<TaskDate>,
        propagation: bool,
        init: bool,
    ) -> Result<(), EngineError> {
        let (old_status, loaded, recurring) = {
            let task = self.require_mut(tid)?;
            task.can_be_deleted = false;
            (task.status, task.loaded, task.recurring)
        };

        if let Some(new_status) = status {
            if loaded {
                if new_status.is_closed() {
                    for child in self.children(tid).to_vec() {
                        let Some(task) = self.get(&child) else {
                            continue;
                        };
                        if task.loaded && task.status == TaskStatus::Active {
                            self.set_status(&child, Some(new_status), done_date, true, false)?;
                        }
                    }
                    // Spawn the next occurrence before the status flips:
                    // the clone must attach while this task is still
                    // Active, or the parents would refuse it.
                    if !propagation && recurring && !self.is_parent_recurring(tid) {
                        let clone = self.duplicate_recursively(tid)?;
                        for parent in self.parents(tid).to_vec() {
                            let Some(task) = self.get(&parent) else {
                                continue;
                            };
                            if task.loaded && task.status == TaskStatus::Active {
                                self.add_child(&parent, &clone)?;
                                self.sync(&parent);
                            }
                        }
                    }
                } else if new_status == TaskStatus::Active && old_status.is_closed() {
                    for parent in self.parents(tid).to_vec() {
                        let Some(task) = self.get(&parent) else {
                            continue;
                        };
                        if task.loaded && task.status.is_closed() {
                            self.set_status(&parent, Some(TaskStatus::Active), None, false, false)?;
                        }
                    }
                }
            }

            if !init {
                self.events.push_back(TaskEvent::StatusChanged {
                    tid: tid.to_string(),
                    from: old_status,
                    to: new_status,
                });
            }
            let task = self.require_mut(tid)?;
            task.status = new_status;
            if new_status.is_closed() {
                task.closed_date = done_date.unwrap_or_else(TaskDate::today);
            }
        }

        self.sync(tid);
        Ok(())
    }
}
