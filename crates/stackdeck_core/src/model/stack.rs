//! Stack (lane) record.

use crate::model::task::TaskId;
use serde::{Deserialize, Serialize};

/// Stable stack identifier.
pub type StackId = String;

/// Named, ordered lane.
///
/// `task_ids` is the single source of truth for task position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: StackId,
    pub title: String,
    pub task_ids: Vec<TaskId>,
}

impl Stack {
    /// Creates an empty stack.
    pub fn new(id: impl Into<StackId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            task_ids: Vec::new(),
        }
    }

    pub fn with_task_ids<I, S>(mut self, task_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        self.task_ids = task_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.task_ids.iter().any(|id| id == task_id)
    }

    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }
}
