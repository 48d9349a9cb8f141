//! Transient drag-session record used only to describe a finished move.
//!
//! The slot is set at gesture start and cleared at gesture end, whatever the
//! outcome. It is never persisted and ordering never depends on it.

use super::{DragEntity, DragKind, DragOperation};
use crate::model::{Stack, StackId};
use crate::workspace::membership;

/// Pre-drag position of the dragged entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragStart {
    /// Index of the stack in top-level order, or of the task in its stack.
    pub index: usize,
    /// Originating stack for task drags.
    pub stack_id: Option<StackId>,
    /// Originating stack title for task drags.
    pub stack_title: Option<String>,
}

impl DragStart {
    /// Captures the current position of `source`, if it can be found.
    pub fn capture(stacks: &[Stack], source: &DragEntity) -> Option<Self> {
        match source.kind {
            DragKind::Stack => stacks
                .iter()
                .position(|stack| stack.id == source.id)
                .map(|index| Self {
                    index,
                    stack_id: None,
                    stack_title: None,
                }),
            DragKind::Task => {
                let location = membership::locate(stacks, source.id.as_str())?;
                let stack = &stacks[location.stack_index];
                Some(Self {
                    index: location.position,
                    stack_id: Some(stack.id.clone()),
                    stack_title: Some(stack.title.clone()),
                })
            }
            DragKind::Unknown => None,
        }
    }
}

/// Single-slot drag bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    start: Option<DragStart>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of a gesture, replacing any stale record.
    pub fn begin(&mut self, stacks: &[Stack], operation: &DragOperation) {
        self.start = operation
            .source
            .as_ref()
            .and_then(|source| DragStart::capture(stacks, source));
    }

    pub fn current(&self) -> Option<&DragStart> {
        self.start.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    /// Clears the slot and returns what it held.
    pub fn finish(&mut self) -> Option<DragStart> {
        self.start.take()
    }
}
