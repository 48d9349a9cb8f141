//! Reorder engine: maps one drag notification onto the stack list.
//!
//! # Responsibility
//! - Interpret `source`/`target` pairs as stack moves or task moves.
//! - Serve both live drag-over preview and the settled drop state.
//!
//! # Invariants
//! - Pure: the input list is never mutated; a fresh list is returned.
//! - Never fails. Unresolvable operations return the input unchanged.
//! - A cross-stack task move edits both stacks in one new list, so the task
//!   is always listed exactly once.

mod session;

pub use session::{DragSession, DragStart};

use crate::model::Stack;
use crate::workspace::membership::{self, Placement};

/// Type tag delivered by the gesture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragKind {
    Stack,
    Task,
    /// Any tag other than `Stack` or `Task`.
    Unknown,
}

impl DragKind {
    /// Parses the gesture source tag (`"Stack"` or `"Task"`).
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Stack" => Self::Stack,
            "Task" => Self::Task,
            _ => Self::Unknown,
        }
    }
}

/// One end of a drag operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DragEntity {
    pub kind: DragKind,
    pub id: String,
}

impl DragEntity {
    pub fn stack(id: impl Into<String>) -> Self {
        Self {
            kind: DragKind::Stack,
            id: id.into(),
        }
    }

    pub fn task(id: impl Into<String>) -> Self {
        Self {
            kind: DragKind::Task,
            id: id.into(),
        }
    }

    pub fn from_tag(tag: &str, id: impl Into<String>) -> Self {
        Self {
            kind: DragKind::from_tag(tag),
            id: id.into(),
        }
    }
}

/// Payload of one start/over/end notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DragOperation {
    pub source: Option<DragEntity>,
    pub target: Option<DragEntity>,
}

impl DragOperation {
    pub fn new(source: DragEntity, target: DragEntity) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
        }
    }

    /// Operation with a source but no drop target.
    pub fn without_target(source: DragEntity) -> Self {
        Self {
            source: Some(source),
            target: None,
        }
    }
}

/// Applies `operation` to `stacks`, returning the reordered list.
///
/// Returns a copy of `stacks` when the operation cannot be interpreted or
/// would not change anything.
pub fn apply_drag(stacks: &[Stack], operation: &DragOperation) -> Vec<Stack> {
    resolve_drag(stacks, operation).unwrap_or_else(|| stacks.to_vec())
}

/// Like [`apply_drag`], but returns `None` instead of an unchanged copy.
pub fn resolve_drag(stacks: &[Stack], operation: &DragOperation) -> Option<Vec<Stack>> {
    let source = operation.source.as_ref()?;
    let target = operation.target.as_ref()?;
    match source.kind {
        DragKind::Stack => move_stack_over(stacks, source.id.as_str(), target),
        DragKind::Task => move_task_over(stacks, source.id.as_str(), target),
        DragKind::Unknown => None,
    }
}

fn move_stack_over(stacks: &[Stack], source_id: &str, target: &DragEntity) -> Option<Vec<Stack>> {
    let source_index = stacks.iter().position(|stack| stack.id == source_id)?;
    let target_index = match target.kind {
        DragKind::Stack => stacks.iter().position(|stack| stack.id == target.id)?,
        // Dropping a lane onto another lane's task means "next to that lane".
        DragKind::Task => membership::locate(stacks, target.id.as_str())?.stack_index,
        DragKind::Unknown => return None,
    };
    if source_index == target_index {
        return None;
    }

    let mut next = stacks.to_vec();
    membership::move_stack(&mut next, source_index, target_index);
    Some(next)
}

fn move_task_over(stacks: &[Stack], source_id: &str, target: &DragEntity) -> Option<Vec<Stack>> {
    let source = membership::locate(stacks, source_id)?;
    let (target_stack_index, target_position) = match target.kind {
        DragKind::Stack => {
            let index = stacks.iter().position(|stack| stack.id == target.id)?;
            (index, stacks[index].task_ids.len())
        }
        DragKind::Task => {
            let location = membership::locate(stacks, target.id.as_str())?;
            (location.stack_index, location.position)
        }
        DragKind::Unknown => return None,
    };

    if source.stack_index == target_stack_index && source.position == target_position {
        return None;
    }
    if source.stack_index == target_stack_index
        && target.kind == DragKind::Stack
        && source.position + 1 == target_position
    {
        // Already the last task of the lane it is dropped onto.
        return None;
    }

    let mut next = stacks.to_vec();
    let placed = membership::place_task_id(
        &mut next,
        source_id.to_string(),
        target_stack_index,
        Placement::At(target_position),
    );
    placed.then_some(next)
}
