//! Tag membership and its dual representation.
//!
//! Tags live twice: as a structured name list on the task and as inline
//! `@name` markers in the content. Mutations keep both in step and fan
//! out to loaded children, so a subtree stays uniformly tagged.
//!
//! Tag names are stored without the `@` sigil; the marker spelling only
//! exists inside content text.

use crate::engine::EngineError;
use crate::model::task::{escape_text, Task};
use crate::tree::TaskTree;

fn bare_name(name: &str) -> &str {
    name.strip_prefix('@').unwrap_or(name)
}

impl TaskTree {
    /// Adds `name` to the structured tag list, without touching the
    /// content text.
    ///
    /// Returns whether the tag was newly added. A new tag on a loaded
    /// task fans out to every loaded child and is registered in the tag
    /// registry.
    pub fn tag_added(&mut self, tid: &str, name: &str) -> Result<bool, EngineError> {
        let name = bare_name(name).to_string();
        let loaded = {
            let task = self.require_mut(tid)?;
            if task.tags.iter().any(|tag| tag == &name) {
                return Ok(false);
            }
            task.tags.push(name.clone());
            task.can_be_deleted = false;
            task.loaded
        };
        if loaded {
            // Children inherit the structured membership only; inline
            // markers are written solely on the task the user tagged.
            for child in self.children(tid).to_vec() {
                let child_loaded = self.get(&child).is_some_and(|task| task.loaded);
                if child_loaded {
                    self.tag_added(&child, &name)?;
                }
            }
            let tag = self.ensure_tag(&name);
            tag.update_task(tid, true);
            tag.modified();
        }
        Ok(true)
    }

    /// Adds a tag to both representations: the structured list and an
    /// inline marker prepended to the content.
    ///
    /// The marker joins an existing tag line with a comma, or opens a new
    /// line of its own above the body.
    pub fn add_tag(&mut self, tid: &str, name: &str) -> Result<(), EngineError> {
        let name = bare_name(name).to_string();
        if self.tag_added(tid, &name)? {
            let marker = format!("@{}", escape_text(&name));
            let task = self.require_mut(tid)?;
            task.content = if task.content.is_empty() {
                marker
            } else if task.content.starts_with('@') {
                format!("{marker}, {}", task.content)
            } else {
                format!("{marker}\n\n{}", task.content)
            };
            self.sync(tid);
        }
        Ok(())
    }

    /// Removes a tag from both representations and from every loaded
    /// child. The inline marker is stripped even when the structured list
    /// never carried the tag.
    pub fn remove_tag(&mut self, tid: &str, name: &str) -> Result<(), EngineError> {
        let name = bare_name(name).to_string();
        let was_present = {
            let task = self.require_mut(tid)?;
            let before = task.tags.len();
            task.tags.retain(|tag| tag != &name);
            task.tags.len() != before
        };
        if was_present {
            for child in self.children(tid).to_vec() {
                let child_loaded = self.get(&child).is_some_and(|task| task.loaded);
                if child_loaded {
                    self.remove_tag(&child, &name)?;
                }
            }
        }
        self.require_mut(tid)?.strip_tag_marker(&name);
        if was_present {
            if let Some(tag) = self.tags.get_mut(&name) {
                tag.update_task(tid, false);
                tag.modified();
            }
        }
        Ok(())
    }

    /// Renames a tag on this task: rewrites inline markers, swaps the
    /// structured membership, and stamps both registry entries.
    pub fn rename_tag(&mut self, tid: &str, old: &str, new: &str) -> Result<(), EngineError> {
        let old = bare_name(old).to_string();
        let new = bare_name(new).to_string();
        {
            let task = self.require_mut(tid)?;
            let old_marker = format!("@{}", escape_text(&old));
            let new_marker = format!("@{}", escape_text(&new));
            task.content = task.content.replace(&old_marker, &new_marker);
        }
        self.remove_tag(tid, &old)?;
        if let Some(tag) = self.tags.get_mut(&old) {
            tag.modified();
        }
        self.tag_added(tid, &new)?;
        if let Some(tag) = self.tags.get_mut(&new) {
            tag.modified();
        }
        self.sync(tid);
        Ok(())
    }

    /// Filter predicate over tag membership.
    ///
    /// `notag_only` matches untagged tasks. Otherwise the task matches
    /// when it carries any listed tag, directly or through a declared
    /// child tag; an absent or empty list matches everything.
    pub fn has_tags(
        &self,
        tid: &str,
        tag_list: Option<&[String]>,
        notag_only: bool,
    ) -> Result<bool, EngineError> {
        let task = self.require(tid)?;
        if notag_only {
            return Ok(task.tags.is_empty());
        }
        let Some(list) = tag_list else {
            return Ok(true);
        };
        if list.is_empty() {
            return Ok(true);
        }
        Ok(list.iter().any(|name| self.tag_matches(task, bare_name(name))))
    }

    fn tag_matches(&self, task: &Task, name: &str) -> bool {
        if task.tags.iter().any(|tag| tag == name) {
            return true;
        }
        if let Some(tag) = self.get_tag(name) {
            return tag
                .children()
                .iter()
                .any(|child| self.tag_matches(task, bare_name(child)));
        }
        false
    }
}
