//! Audit log records.
//!
//! # Invariants
//! - Entries are append-only and never mutated; only whole entries are removed.
//! - Storage order is insertion order; display order is by `timestamp`.

use serde::{Deserialize, Serialize};

/// Stable history entry identifier.
pub type HistoryId = String;

/// Semantic category of one recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryActionType {
    AddTask,
    UpdateTask,
    UpdateStatus,
    AddStack,
    DeleteStack,
    UpdateStack,
    MoveStack,
    MoveTask,
    DeleteTask,
    ArchiveTask,
}

impl HistoryActionType {
    pub const ALL: [HistoryActionType; 10] = [
        Self::AddTask,
        Self::UpdateTask,
        Self::UpdateStatus,
        Self::AddStack,
        Self::DeleteStack,
        Self::UpdateStack,
        Self::MoveStack,
        Self::MoveTask,
        Self::DeleteTask,
        Self::ArchiveTask,
    ];

    /// Stable storage tag, e.g. `ADD_TASK`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddTask => "ADD_TASK",
            Self::UpdateTask => "UPDATE_TASK",
            Self::UpdateStatus => "UPDATE_STATUS",
            Self::AddStack => "ADD_STACK",
            Self::DeleteStack => "DELETE_STACK",
            Self::UpdateStack => "UPDATE_STACK",
            Self::MoveStack => "MOVE_STACK",
            Self::MoveTask => "MOVE_TASK",
            Self::DeleteTask => "DELETE_TASK",
            Self::ArchiveTask => "ARCHIVE_TASK",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Human-readable label used by history views.
    pub fn label(self) -> &'static str {
        match self {
            Self::AddTask => "Added Task",
            Self::UpdateTask => "Updated Task",
            Self::UpdateStatus => "Updated Status",
            Self::AddStack => "Added Stack",
            Self::DeleteStack => "Deleted Stack",
            Self::UpdateStack => "Updated Stack",
            Self::MoveStack => "Moved Stack",
            Self::MoveTask => "Moved Task",
            Self::DeleteTask => "Deleted Task",
            Self::ArchiveTask => "Archived Task",
        }
    }
}

/// One immutable audit-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: HistoryId,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub action_type: HistoryActionType,
    pub details: String,
}
