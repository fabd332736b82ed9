//! Task payload record.
//!
//! # Responsibility
//! - Hold per-task state: status, dates, content, tags, recurrence.
//! - Provide local text helpers: title normalization, excerpt rendering,
//!   inline tag-marker stripping.
//!
//! # Invariants
//! - `tid` is non-empty and immutable after construction.
//! - `tags` never contains duplicates.
//! - The title is never blank; blank input normalizes to a placeholder.
//!
//! Anything that touches more than one task (cascades, inheritance) lives
//! in the engine, not here.

use crate::model::date::TaskDate;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Title given to tasks created or edited with blank titles.
pub const PLACEHOLDER_TITLE: &str = "(no title task)";

static SUBTASK_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{!.+?!\}").expect("valid subtask marker regex"));

/// Errors from task construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The task identifier is empty or blank.
    InvalidIdentifier(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(tid) => write!(f, "invalid task identifier `{tid}`"),
        }
    }
}

impl Error for ModelError {}

/// Task lifecycle state.
///
/// `Note` is a legacy state recognized in data but not driven by any
/// transition logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Open and actionable.
    Active,
    /// Completed.
    Done,
    /// Closed without completion.
    Dismissed,
    /// Legacy inert state.
    Note,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl TaskStatus {
    /// True for the two closed states.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Done | Self::Dismissed)
    }
}

/// One task record. Relationships to other tasks are kept in the tree, not
/// here; this struct only knows its own state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Process-unique identifier, immutable after creation.
    pub tid: String,
    /// Cross-session correlation id, assigned lazily on first read.
    uuid: Option<Uuid>,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Display title, never blank.
    pub title: String,
    /// When the task entered the system.
    pub added_date: TaskDate,
    /// Deadline, constrained by ancestors.
    pub due_date: TaskDate,
    /// When work is planned to start.
    pub start_date: TaskDate,
    /// When the task was closed.
    pub closed_date: TaskDate,
    /// Free-form text; may embed `@tag` and `{! ... !}` markers.
    pub content: String,
    /// Structured tag names, duplicate-free, insertion-ordered.
    pub tags: Vec<String>,
    /// Whether the task repeats.
    pub recurring: bool,
    /// Textual recurrence rule, e.g. "day" or "every monday".
    pub recurring_term: Option<String>,
    /// When the recurrence rule last changed.
    pub recurring_updated_date: TaskDate,
    /// Whether the task is fully materialized. Unloaded tasks are skipped
    /// during propagation.
    pub loaded: bool,
    /// True while the task is still empty enough to be silently deleted.
    pub can_be_deleted: bool,
    /// Open-ended extension data keyed by (namespace, name).
    attributes: BTreeMap<String, String>,
    /// Updated on every successful mutation.
    pub last_modified: DateTime<Utc>,
    /// Set by the suspend guard to silence notifications.
    #[serde(skip)]
    pub(crate) sync_disabled: bool,
}

impl Task {
    /// Creates a task record.
    ///
    /// `fresh` marks a brand-new, user-created task: it is loaded, carries
    /// today's added date, and remains silently deletable until it gains
    /// real state. Non-fresh tasks are loader-created stubs.
    ///
    /// # Errors
    /// - `ModelError::InvalidIdentifier` when `tid` is empty or blank.
    pub fn new(tid: impl Into<String>, fresh: bool) -> Result<Self, ModelError> {
        let tid = tid.into();
        if tid.trim().is_empty() {
            return Err(ModelError::InvalidIdentifier(tid));
        }
        Ok(Self {
            tid,
            uuid: None,
            status: TaskStatus::Active,
            title: PLACEHOLDER_TITLE.to_string(),
            added_date: if fresh {
                TaskDate::today()
            } else {
                TaskDate::NoDate
            },
            due_date: TaskDate::NoDate,
            start_date: TaskDate::NoDate,
            closed_date: TaskDate::NoDate,
            content: String::new(),
            tags: Vec::new(),
            recurring: false,
            recurring_term: None,
            recurring_updated_date: TaskDate::NoDate,
            loaded: fresh,
            can_be_deleted: fresh,
            attributes: BTreeMap::new(),
            last_modified: Utc::now(),
            sync_disabled: false,
        })
    }

    /// Returns the correlation uuid, assigning one on first read.
    ///
    /// The bool reports whether an assignment happened, so the caller can
    /// schedule a sync for it.
    pub fn uuid_or_assign(&mut self) -> (Uuid, bool) {
        match self.uuid {
            Some(existing) => (existing, false),
            None => {
                let fresh = Uuid::new_v4();
                self.uuid = Some(fresh);
                (fresh, true)
            }
        }
    }

    /// Returns the correlation uuid if one was already assigned.
    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }

    /// Sets the title, normalizing blank input to the placeholder.
    ///
    /// Returns whether the stored title actually changed. A changed title
    /// makes the task permanent.
    pub fn set_title(&mut self, title: &str) -> bool {
        let normalized = if title.trim().is_empty() {
            PLACEHOLDER_TITLE.to_string()
        } else {
            title.trim_matches(['\t', '\n']).to_string()
        };
        if normalized == self.title {
            return false;
        }
        self.title = normalized;
        self.can_be_deleted = false;
        true
    }

    /// Replaces the content, unescaping HTML entities. Makes the task
    /// permanent.
    pub fn set_text(&mut self, text: &str) {
        self.can_be_deleted = false;
        self.content = unescape_text(text);
    }

    /// Returns the content, empty string when none was ever set.
    pub fn text(&self) -> &str {
        &self.content
    }

    /// Renders a plain-text preview of the content.
    ///
    /// HTML-escapes the text, optionally strips inline `@tag` markers and
    /// `{! ... !}` subtask markers, removes blank lines, and truncates to
    /// `lines` lines and `chars` characters. Zero means unbounded for that
    /// dimension.
    pub fn excerpt(&self, lines: usize, chars: usize, strip_tags: bool, strip_subtasks: bool) -> String {
        if self.content.is_empty() {
            return String::new();
        }
        let mut text = escape_text(self.content.trim());

        if strip_tags {
            for tag in &self.tags {
                let marker = format!("@{}", escape_text(tag));
                text = text
                    .replace(&format!("{marker}, "), "")
                    .replace(&format!("{marker},"), "")
                    .replace(&marker, "");
            }
        }
        if strip_subtasks {
            text = SUBTASK_MARKER_RE.replace_all(&text, "").into_owned();
        }

        let mut kept: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
        if lines > 0 {
            kept.truncate(lines);
        }
        let joined = kept.join("\n");
        if chars > 0 {
            joined.chars().take(chars).collect()
        } else {
            joined
        }
    }

    /// Strips every inline spelling variant of `@tagname` from the content:
    /// trailing double newline, trailing newline, comma with space, bare
    /// comma, and the bare marker.
    pub fn strip_tag_marker(&mut self, tagname: &str) {
        let name = tagname.strip_prefix('@').unwrap_or(tagname);
        let marker = format!("@{name}");
        self.content = self
            .content
            .replace(&format!("{marker}\n\n"), "")
            .replace(&format!("{marker}\n"), "")
            .replace(&format!("{marker}, "), "")
            .replace(&format!("{marker},"), "")
            .replace(&marker, "");
    }

    /// Sets an extension attribute under (namespace, name).
    pub fn set_attribute(&mut self, namespace: &str, name: &str, value: impl Into<String>) {
        self.attributes
            .insert(attribute_key(namespace, name), value.into());
    }

    /// Gets an extension attribute, if present.
    pub fn get_attribute(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .get(&attribute_key(namespace, name))
            .map(String::as_str)
    }

    /// Refreshes the modification timestamp.
    pub(crate) fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

fn attribute_key(namespace: &str, name: &str) -> String {
    format!("{namespace}:{name}")
}

/// Escapes `&`, `<`, and `>` for plain-text rendering.
pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Reverses common HTML entity escapes. The ampersand goes last so freshly
/// produced entities are not double-expanded.
pub(crate) fn unescape_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
