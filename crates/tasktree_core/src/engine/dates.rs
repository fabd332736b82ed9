//! Due-date constraint propagation.
//!
//! Constraints between related tasks:
//! - A child's due date never happens later than an ancestor's.
//! - An ancestor's due date never happens before a descendant's.
//! - A task's start date never happens later than its own due date.
//!
//! Fuzzy and undefined dates are exempt from constraints and transparent
//! to them: a child of a fuzzy-dated task is constrained by that task's
//! ancestors, and vice versa. Fuzzy dates are never updated by repair.

use crate::engine::EngineError;
use crate::model::date::TaskDate;
use crate::model::task::TaskStatus;
use crate::tree::{TaskId, TaskTree};

impl TaskTree {
    /// Sets the due date and repairs every constraint the change violates.
    ///
    /// When the new date is concrete, ancestors with earlier due dates are
    /// pulled forward and descendants with later due or start dates are
    /// pulled back, recursing through fuzzy-dated relatives transparently.
    /// When the stored date actually changed, the whole subtree is
    /// re-synced, since constraint display anywhere below may depend on it.
    pub fn set_due_date(&mut self, tid: &str, new_date: TaskDate) -> Result<(), EngineError> {
        let old_date = {
            let task = self.require_mut(tid)?;
            let old = task.due_date;
            task.due_date = new_date;
            old
        };

        if !new_date.is_fuzzy() {
            for parent in self.constrained_parent_ids(tid) {
                if self.require(&parent)?.due_date < new_date {
                    self.set_due_date(&parent, new_date)?;
                }
            }
            for child in self.constrained_child_ids(tid) {
                let (child_due, child_start) = {
                    let task = self.require(&child)?;
                    (task.due_date, task.start_date)
                };
                if child_due > new_date {
                    self.set_due_date(&child, new_date)?;
                }
                if !child_start.is_fuzzy() && child_start > new_date {
                    self.set_start_date(&child, new_date)?;
                }
            }
        }

        if old_date != new_date {
            self.recursive_sync(tid);
        }
        Ok(())
    }

    /// Sets the start date. Not constrained on its own; `set_due_date`
    /// repairs start dates that drift past a due date.
    pub fn set_start_date(&mut self, tid: &str, date: TaskDate) -> Result<(), EngineError> {
        self.require_mut(tid)?.start_date = date;
        self.sync(tid);
        Ok(())
    }

    /// Sets the closing date. Closed dates neither constrain nor are
    /// constrained.
    pub fn set_closed_date(&mut self, tid: &str, date: TaskDate) -> Result<(), EngineError> {
        self.require_mut(tid)?.closed_date = date;
        self.sync(tid);
        Ok(())
    }

    /// Sets the added date.
    pub fn set_added_date(&mut self, tid: &str, date: TaskDate) -> Result<(), EngineError> {
        self.require_mut(tid)?.added_date = date;
        self.sync(tid);
        Ok(())
    }

    /// The tightest upward due-date bound, computed without mutating.
    ///
    /// Returns the task's own due date when concrete; otherwise the
    /// earliest concrete bound found across all parent chains, recursing
    /// through fuzzy parents. `NoDate` when no concrete bound exists.
    pub fn get_due_date_constraint(&self, tid: &str) -> Result<TaskDate, EngineError> {
        let mut strongest = self.require(tid)?.due_date;
        if strongest.is_fuzzy() {
            for parent in self.parents(tid).to_vec() {
                let Some(task) = self.get(&parent) else {
                    continue;
                };
                let mut parent_due = task.due_date;
                if parent_due.is_fuzzy() {
                    parent_due = self.get_due_date_constraint(&parent)?;
                }
                if parent_due.is_fuzzy() {
                    continue;
                }
                if strongest.is_fuzzy() || parent_due < strongest {
                    strongest = parent_due;
                }
            }
        }
        Ok(strongest)
    }

    /// The most pressing deadline in the subtree: the minimum of this
    /// task's due date and the urgent dates of its Active children.
    pub fn get_urgent_date(&self, tid: &str) -> Result<TaskDate, EngineError> {
        let mut urgent = self.require(tid)?.due_date;
        for child in self.children(tid).to_vec() {
            let Some(task) = self.get(&child) else {
                continue;
            };
            if !task.loaded || task.status != TaskStatus::Active {
                continue;
            }
            let child_urgent = self.get_urgent_date(&child)?;
            if child_urgent < urgent {
                urgent = child_urgent;
            }
        }
        Ok(urgent)
    }

    /// Days from today until the due date. `None` unless concrete.
    pub fn days_left(&self, tid: &str) -> Result<Option<i64>, EngineError> {
        Ok(self.require(tid)?.due_date.days_left())
    }

    /// Days between closing and due date. `None` when either is not
    /// concrete.
    pub fn days_late(&self, tid: &str) -> Result<Option<i64>, EngineError> {
        let task = self.require(tid)?;
        Ok(task.closed_date.days_between(&task.due_date))
    }

    /// Nearest ancestors with concrete due dates, recursing transparently
    /// through fuzzy-dated parents. Unloaded parents are skipped.
    fn constrained_parent_ids(&self, tid: &str) -> Vec<TaskId> {
        let mut found = Vec::new();
        for parent in self.parents(tid) {
            let Some(task) = self.get(parent) else {
                continue;
            };
            if !task.loaded {
                continue;
            }
            if task.due_date.is_fuzzy() {
                found.extend(self.constrained_parent_ids(parent));
            } else {
                found.push(parent.clone());
            }
        }
        found
    }

    /// Nearest descendants with concrete due dates, the downward mirror of
    /// `constrained_parent_ids`.
    fn constrained_child_ids(&self, tid: &str) -> Vec<TaskId> {
        let mut found = Vec::new();
        for child in self.children(tid) {
            let Some(task) = self.get(child) else {
                continue;
            };
            if !task.loaded {
                continue;
            }
            if task.due_date.is_fuzzy() {
                found.extend(self.constrained_child_ids(child));
            } else {
                found.push(child.clone());
            }
        }
        found
    }
}
