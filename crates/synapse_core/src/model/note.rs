//! Note record domain model.
//!
//! # Responsibility
//! - Define the canonical captured record shared by store, sync and graph.
//! - Turn raw capture input (`NoteDraft`) into a fully populated record.
//!
//! # Invariants
//! - Every field except `summary` is populated at creation time.
//! - `summary` moves from `None` to `Some` at most once.
//! - `wikilinks` is derived from `content` at creation and never recomputed.

use crate::wikilink::extract;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one captured record.
pub type NoteId = Uuid;

/// Sentinel category asking the remote service to classify the note.
pub const AUTO_CATEGORY: &str = "auto";

const DEFAULT_TEXT_TITLE: &str = "New Note";
const DEFAULT_LINK_TITLE: &str = "Web Link";
const TIMESTAMP_FORMAT: &str = "%Y. %-m. %-d. %H:%M:%S";

/// Capture mode of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    /// Free text note.
    Text,
    /// Pasted URL.
    Link,
    /// Image capture; the only type allowed to have empty content.
    Image,
}

impl NoteType {
    /// Wire name (`text|link|image`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Link => "link",
            Self::Image => "image",
        }
    }

    /// Placeholder title used when the user leaves the title blank.
    pub fn default_title(self) -> &'static str {
        match self {
            Self::Link => DEFAULT_LINK_TITLE,
            Self::Text | Self::Image => DEFAULT_TEXT_TITLE,
        }
    }

    fn requires_content(self) -> bool {
        !matches!(self, Self::Image)
    }
}

impl Display for NoteType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw capture input as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub kind: NoteType,
    pub title: String,
    pub content: String,
    pub category: String,
    /// Comma-separated tag input.
    pub tags: String,
}

impl NoteDraft {
    /// Creates a draft with empty title, tags and the `auto` category.
    pub fn new(kind: NoteType, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: String::new(),
            content: content.into(),
            category: AUTO_CATEGORY.to_string(),
            tags: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Checks the draft can become a record.
    ///
    /// # Errors
    /// - `EmptyContent` when trimmed content is empty for `text`/`link`.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.kind.requires_content() && self.content.trim().is_empty() {
            return Err(NoteValidationError::EmptyContent(self.kind));
        }
        Ok(())
    }
}

/// Draft validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Content is required for this note type.
    EmptyContent(NoteType),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent(kind) => write!(f, "content is required for {kind} notes"),
        }
    }
}

impl Error for NoteValidationError {}

/// Canonical captured record.
///
/// Serialized with the camelCase field names used by both local persistence
/// and the remote payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// Local identity; older persisted entries without one get a fresh id.
    #[serde(default = "Uuid::new_v4")]
    pub id: NoteId,
    pub access_key: String,
    pub title: String,
    pub content: String,
    /// Serialized as `type` to match the remote schema.
    #[serde(rename = "type")]
    pub kind: NoteType,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub wikilinks: Vec<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl NoteRecord {
    /// Builds a record from validated draft input, stamped with local time.
    ///
    /// # Errors
    /// - Propagates `NoteDraft::validate` failures.
    pub fn from_draft(
        draft: &NoteDraft,
        access_key: impl Into<String>,
    ) -> Result<Self, NoteValidationError> {
        Self::from_draft_at(draft, access_key, Local::now())
    }

    /// Same as [`NoteRecord::from_draft`] with a caller-provided clock.
    pub fn from_draft_at(
        draft: &NoteDraft,
        access_key: impl Into<String>,
        created_at: DateTime<Local>,
    ) -> Result<Self, NoteValidationError> {
        draft.validate()?;

        let title = draft.title.trim();
        let content = draft.content.trim().to_string();
        let wikilinks = extract(&content);

        Ok(Self {
            id: Uuid::new_v4(),
            access_key: access_key.into(),
            title: if title.is_empty() {
                draft.kind.default_title().to_string()
            } else {
                title.to_string()
            },
            content,
            kind: draft.kind,
            category: draft.category.trim().to_string(),
            tags: parse_tags(&draft.tags),
            wikilinks,
            timestamp: format_timestamp(created_at),
            summary: None,
        })
    }

    /// Whether remote analysis (or the local fallback) already ran.
    pub fn is_enriched(&self) -> bool {
        self.summary.is_some()
    }
}

/// Splits comma-separated tag input.
///
/// Each tag is trimmed and empty entries are dropped. Order and duplicates are
/// preserved.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
