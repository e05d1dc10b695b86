//! Core domain types: board snapshots and the normalized corpus.
//!
//! These are the decoded, ordered forms of what the board service returns.
//! Wire-level JSON shapes live in `boardcorpus-trello`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoardCorpusError;

// ---------------------------------------------------------------------------
// Board snapshot
// ---------------------------------------------------------------------------

/// A named collection of lists and cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    /// Whether the board itself is closed.
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub url: String,
}

/// A list (column) on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrelloList {
    pub id: String,
    pub name: String,
}

/// A board member as referenced by cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub full_name: String,
}

/// Completion state of a checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Complete,
    Incomplete,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Incomplete => "incomplete",
        }
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemState {
    type Err = BoardCorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(Self::Complete),
            "incomplete" => Ok(Self::Incomplete),
            other => Err(BoardCorpusError::parse(format!(
                "unknown checklist item state '{other}'"
            ))),
        }
    }
}

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    pub name: String,
    pub state: ItemState,
}

/// A named checklist; items are in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub name: String,
    #[serde(default)]
    pub items: Vec<CheckItem>,
}

/// A comment on a card. `text` may contain HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A single work item, snapshotted for one normalization pass.
///
/// Checklists are in board display order and comments are oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    /// Card title; may be empty.
    #[serde(default)]
    pub title: String,
    /// Rich-text description; may be empty or whitespace-only.
    #[serde(default)]
    pub description: String,
    /// Identifier of the parent list.
    pub list_id: String,
    /// Identifiers of the members assigned to this card.
    #[serde(default)]
    pub member_ids: Vec<String>,
    /// Archived cards have `closed == true`.
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// Metadata carried alongside each record's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub title: String,
    pub id: String,
    pub url: String,
}

/// The flattened text of one card plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub text: String,
    pub metadata: RecordMetadata,
}

/// Ordered records built from one board, in card-listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    /// Name of the board the records came from.
    pub board_name: String,
    pub records: Vec<NormalizedRecord>,
}

impl Corpus {
    pub fn new(board_name: impl Into<String>) -> Self {
        Self {
            board_name: board_name.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: NormalizedRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }
}
