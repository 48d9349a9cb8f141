//! Task and archived-task records.
//!
//! # Invariants
//! - A task id is owned by at most one stack ordering list at a time.
//! - An archived task id never appears in any stack or in the task collection.

use serde::{Deserialize, Serialize};

/// Stable task identifier.
pub type TaskId = String;

/// One work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub is_finished: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
}

impl Task {
    /// Creates an unfinished task without due date.
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            is_finished: false,
            created_at,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: Option<i64>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn finished(mut self, is_finished: bool) -> Self {
        self.is_finished = is_finished;
        self
    }
}

/// Soft-deleted task retained for restore.
///
/// `original_stack_id` is advisory: the stack may no longer exist, and it is
/// empty when the task was archived while attached to no stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedTask {
    #[serde(flatten)]
    pub task: Task,
    pub original_stack_id: String,
    /// Epoch milliseconds.
    pub archived_at: i64,
}

impl ArchivedTask {
    pub fn from_task(task: Task, original_stack_id: impl Into<String>, archived_at: i64) -> Self {
        Self {
            task,
            original_stack_id: original_stack_id.into(),
            archived_at,
        }
    }

    pub fn id(&self) -> &str {
        self.task.id.as_str()
    }

    /// Drops archive provenance and returns the plain task snapshot.
    pub fn into_task(self) -> Task {
        self.task
    }
}
