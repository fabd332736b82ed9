//! Constraint-propagation engine over the task tree.
//!
//! # Responsibility
//! - Implement every multi-task operation: status cascades, due-date
//!   constraint repair, recurrence inheritance and spawning, tag fan-out,
//!   hierarchy edits with attribute inheritance.
//!
//! # Invariants
//! - Every public mutation leaves the touched subtree globally consistent
//!   before returning.
//! - Propagation is synchronous and recursive; depth is bounded by tree
//!   depth.
//! - Unloaded tasks are skipped, never mutated.

use crate::model::date::DateError;
use crate::model::task::Task;
use crate::tree::{TaskId, TaskTree};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod dates;
mod hierarchy;
mod recurrence;
mod status;
mod tags;

/// Errors from engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The addressed task is not in the arena.
    TaskNotFound(TaskId),
    /// A stored recurrence term could not be evaluated.
    InvalidRecurrenceTerm(String),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(tid) => write!(f, "task not found: {tid}"),
            Self::InvalidRecurrenceTerm(term) => {
                write!(f, "invalid recurrence term `{term}`")
            }
        }
    }
}

impl Error for EngineError {}

impl From<DateError> for EngineError {
    fn from(value: DateError) -> Self {
        match value {
            DateError::InvalidRecurrenceTerm(term) => Self::InvalidRecurrenceTerm(term),
        }
    }
}

impl TaskTree {
    pub(crate) fn require(&self, tid: &str) -> Result<&Task, EngineError> {
        self.get(tid)
            .ok_or_else(|| EngineError::TaskNotFound(tid.to_string()))
    }

    pub(crate) fn require_mut(&mut self, tid: &str) -> Result<&mut Task, EngineError> {
        self.get_mut(tid)
            .ok_or_else(|| EngineError::TaskNotFound(tid.to_string()))
    }

    /// Sets the title through the normalization rules and syncs on change.
    pub fn set_title(&mut self, tid: &str, title: &str) -> Result<bool, EngineError> {
        let changed = self.require_mut(tid)?.set_title(title);
        if changed {
            self.sync(tid);
        }
        Ok(changed)
    }

    /// Replaces the content text. Makes the task permanent.
    pub fn set_text(&mut self, tid: &str, text: &str) -> Result<(), EngineError> {
        self.require_mut(tid)?.set_text(text);
        Ok(())
    }

    /// Returns the correlation uuid, assigning and syncing on first read.
    pub fn task_uuid(&mut self, tid: &str) -> Result<uuid::Uuid, EngineError> {
        let (uuid, assigned) = self.require_mut(tid)?.uuid_or_assign();
        if assigned {
            self.sync(tid);
        }
        Ok(uuid)
    }
}
