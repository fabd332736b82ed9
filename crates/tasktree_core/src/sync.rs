//! Notification suspension.
//!
//! # Responsibility
//! - Silence `Modified` notifications for one task across a batch of
//!   edits, then emit a single one when the batch ends.
//!
//! # Invariants
//! - Suspension is per-task and scope-bound; the flag never outlives the
//!   guard.

use crate::tree::{TaskId, TaskTree};

/// Guard that silences sync notifications for one task.
///
/// While the guard is alive, `TaskTree::sync` on the suspended task is a
/// no-op that still reports its loaded state. On drop the flag is cleared
/// and, when requested, one sync fires for the whole batch.
pub struct SuspendedSync<'a> {
    tree: &'a mut TaskTree,
    tid: TaskId,
    sync_on_exit: bool,
}

impl<'a> SuspendedSync<'a> {
    /// Suspends notifications for `tid` until the guard drops.
    pub fn new(tree: &'a mut TaskTree, tid: impl Into<TaskId>, sync_on_exit: bool) -> Self {
        let tid = tid.into();
        if let Some(task) = tree.get_mut(&tid) {
            task.sync_disabled = true;
        }
        Self {
            tree,
            tid,
            sync_on_exit,
        }
    }

    /// The tree, for edits made while the suspension holds.
    pub fn tree(&mut self) -> &mut TaskTree {
        self.tree
    }
}

impl Drop for SuspendedSync<'_> {
    fn drop(&mut self) {
        if let Some(task) = self.tree.get_mut(&self.tid) {
            task.sync_disabled = false;
        }
        if self.sync_on_exit {
            self.tree.sync(&self.tid);
        }
    }
}
