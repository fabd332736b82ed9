//! Recurrence rules: arming, inheritance, and occurrence spawning.
//!
//! A recurring task repeats by duplication: when its last open copy is
//! closed, a clone due on the next occurrence takes its place. Children
//! of a recurring task inherit the rule, and only the topmost recurring
//! task in a chain spawns.

use crate::engine::EngineError;
use crate::model::date::TaskDate;
use crate::model::task::TaskStatus;
use crate::sync::SuspendedSync;
use crate::tree::{TaskId, TaskTree};

impl TaskTree {
    /// Sets the recurrence state and term, then mirrors the result onto
    /// loaded Active children.
    ///
    /// The term is validated by evaluating it against the start date (or
    /// today when none is set). Four outcomes:
    /// - arming with a valid term stores it and stamps the update date;
    /// - arming with an invalid or missing term disarms and clears the
    ///   term;
    /// - disarming with a valid term still arms and stores it;
    /// - disarming with an invalid or missing term disarms and keeps the
    ///   previous term.
    ///
    /// `newtask` marks a rule armed on a brand-new task: the computed
    /// occurrence may be the base date itself and is written to the due
    /// date.
    pub fn set_recurring(
        &mut self,
        tid: &str,
        recurring: bool,
        term: Option<&str>,
        newtask: bool,
    ) -> Result<(), EngineError> {
        let base = self.require(tid)?.start_date;
        let next = term.and_then(|t| base.advance(t, newtask).ok());

        {
            let task = self.require_mut(tid)?;
            task.recurring = recurring;
            if recurring {
                if next.is_some() {
                    task.recurring_term = term.map(str::to_string);
                    task.recurring_updated_date = TaskDate::today();
                } else {
                    task.recurring_term = None;
                    task.recurring = false;
                }
            } else if next.is_some() {
                task.recurring = true;
                task.recurring_term = term.map(str::to_string);
                task.recurring_updated_date = TaskDate::today();
            }
        }
        if newtask && self.require(tid)?.recurring {
            if let Some(date) = next {
                self.set_due_date(tid, date)?;
            }
        }
        self.sync(tid);

        let (final_recurring, final_term) = {
            let task = self.require(tid)?;
            (task.recurring, task.recurring_term.clone())
        };
        for child in self.children(tid).to_vec() {
            let eligible = self
                .get(&child)
                .is_some_and(|task| task.loaded && task.status == TaskStatus::Active);
            if !eligible {
                continue;
            }
            self.set_recurring(&child, final_recurring, final_term.as_deref(), false)?;
            if final_recurring {
                if let Some(date) = next {
                    self.set_due_date(&child, date)?;
                }
            }
        }
        Ok(())
    }

    /// Flips the recurrence state, defaulting the term to daily when none
    /// was ever set.
    pub fn toggle_recurring(&mut self, tid: &str) -> Result<(), EngineError> {
        let (recurring, term, newtask) = {
            let task = self.require_mut(tid)?;
            let newtask = task.recurring_term.is_none();
            if newtask {
                task.recurring_term = Some("day".to_string());
            }
            (task.recurring, task.recurring_term.clone(), newtask)
        };
        self.set_recurring(tid, !recurring, term.as_deref(), newtask)
    }

    /// Re-derives the recurrence state from the parents: the first loaded
    /// recurring parent wins; with no parents at all the rule is dropped.
    /// Parented tasks with no recurring parent are left untouched.
    pub fn inherit_recursion(&mut self, tid: &str) -> Result<(), EngineError> {
        let parents = self.parents(tid).to_vec();
        if parents.is_empty() {
            return self.set_recurring(tid, false, None, false);
        }
        for parent in parents {
            let Some(task) = self.get(&parent) else {
                continue;
            };
            if task.loaded && task.recurring {
                let term = task.recurring_term.clone();
                let due = task.due_date;
                self.set_recurring(tid, true, term.as_deref(), false)?;
                self.set_due_date(tid, due)?;
                break;
            }
        }
        Ok(())
    }

    /// Computes the due date of the next occurrence.
    ///
    /// Closed before or on the due date, the next occurrence is the first
    /// one strictly after it. Closed late, occurrences are rolled forward
    /// until one lands on or after today.
    ///
    /// # Errors
    /// - `EngineError::InvalidRecurrenceTerm` when no usable term is set.
    pub fn get_next_occurrence(&self, tid: &str) -> Result<TaskDate, EngineError> {
        let task = self.require(tid)?;
        let term = task.recurring_term.clone().unwrap_or_default();
        let due = task.due_date;
        if due.is_fuzzy() {
            return Ok(due.advance(&term, false)?);
        }
        let today = TaskDate::today();
        let mut next = due.advance(&term, false)?;
        if today <= due {
            while next <= due {
                next = next.advance(&term, false)?;
            }
        } else {
            while next < today {
                next = next.advance(&term, false)?;
            }
        }
        Ok(next)
    }

    /// Whether any loaded Active parent is itself recurring. Such a parent
    /// owns the spawning; its children never spawn on their own.
    pub fn is_parent_recurring(&self, tid: &str) -> bool {
        self.parents(tid).iter().any(|parent| {
            self.get(parent).is_some_and(|task| {
                task.loaded && task.status == TaskStatus::Active && task.recurring
            })
        })
    }

    /// Clones `tid` as a fresh task due on the next occurrence, carrying
    /// over the title, content, tags, and recurrence rule.
    pub fn duplicate(&mut self, tid: &str) -> Result<TaskId, EngineError> {
        let next = self.get_next_occurrence(tid)?;
        let (term, title, content, tags) = {
            let task = self.require(tid)?;
            (
                task.recurring_term.clone(),
                task.title.clone(),
                task.content.clone(),
                task.tags.clone(),
            )
        };
        let clone = self.new_task();
        self.set_recurring(&clone, true, term.as_deref(), false)?;
        self.set_due_date(&clone, next)?;
        self.set_title(&clone, &title)?;
        {
            let task = self.require_mut(&clone)?;
            task.content = content;
            task.tags = tags.clone();
        }
        for name in &tags {
            let tag = self.ensure_tag(name);
            tag.update_task(&clone, true);
            tag.modified();
        }
        log::debug!("duplicating task {tid} as task {clone}");
        Ok(clone)
    }

    /// Clones `tid` and its loaded subtree, keeping the parent/child
    /// shape. The clone is synced once, after the whole subtree is wired.
    pub fn duplicate_recursively(&mut self, tid: &str) -> Result<TaskId, EngineError> {
        let clone = self.duplicate(tid)?;
        let children = self.children(tid).to_vec();
        let mut guard = SuspendedSync::new(self, clone.clone(), true);
        for child in children {
            let loaded = guard.tree().get(&child).is_some_and(|task| task.loaded);
            if loaded {
                let child_clone = guard.tree().duplicate_recursively(&child)?;
                guard.tree().add_child(&clone, &child_clone)?;
            }
        }
        drop(guard);
        Ok(clone)
    }
}
