//! Tag registry entry.
//!
//! # Responsibility
//! - Track which tasks carry a tag and when the tag last changed.
//! - Hold declared child-tag names for hierarchical membership checks.
//!
//! # Invariants
//! - Membership is recomputed by callers through `update_task`; the entry
//!   itself never walks the tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One entry in the tag registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    name: String,
    /// Ids of tasks currently carrying this tag.
    pub tasks: BTreeSet<String>,
    /// Declared child-tag names (external hierarchy).
    pub children: Vec<String>,
    /// Updated whenever membership or metadata changes.
    pub last_modified: DateTime<Utc>,
}

impl Tag {
    /// Creates an empty registry entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: BTreeSet::new(),
            children: Vec::new(),
            last_modified: Utc::now(),
        }
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Refreshes the modification stamp.
    pub fn modified(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Records whether `tid` currently carries this tag.
    pub fn update_task(&mut self, tid: &str, present: bool) {
        if present {
            self.tasks.insert(tid.to_string());
        } else {
            self.tasks.remove(tid);
        }
    }

    /// Declares a child tag for hierarchical membership.
    pub fn add_child(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.children.contains(&name) {
            self.children.push(name);
            self.modified();
        }
    }

    /// Returns declared child-tag names.
    pub fn children(&self) -> &[String] {
        &self.children
    }
}
