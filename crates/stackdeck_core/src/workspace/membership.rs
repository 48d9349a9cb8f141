//! Shared helpers for moving task ids between stack ordering lists.
//!
//! Every insertion of a task id goes through [`place_task_id`], which removes
//! the id from whichever list held it before inserting. No other code path
//! inserts into `Stack::task_ids`.

use crate::model::{Stack, TaskId};

/// Position of a task id inside the top-level stack order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocation {
    pub stack_index: usize,
    pub position: usize,
}

/// Insertion point inside one stack's ordering list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Front,
    End,
    /// Index into the list after the id was removed from its old place.
    At(usize),
}

pub(crate) fn locate(stacks: &[Stack], task_id: &str) -> Option<TaskLocation> {
    stacks
        .iter()
        .enumerate()
        .find_map(|(stack_index, stack)| {
            stack.position_of(task_id).map(|position| TaskLocation {
                stack_index,
                position,
            })
        })
}

/// Removes `task_id` from every stack and returns where it was first found.
pub(crate) fn detach_task_id(stacks: &mut [Stack], task_id: &str) -> Option<TaskLocation> {
    let found = locate(stacks, task_id);
    for stack in stacks.iter_mut() {
        stack.task_ids.retain(|id| id != task_id);
    }
    found
}

/// Inserts `task_id` into `stacks[stack_index]` after detaching it everywhere.
///
/// Returns `false` without touching any list when `stack_index` is out of
/// range.
pub(crate) fn place_task_id(
    stacks: &mut [Stack],
    task_id: TaskId,
    stack_index: usize,
    placement: Placement,
) -> bool {
    if stack_index >= stacks.len() {
        return false;
    }
    detach_task_id(stacks, task_id.as_str());

    let task_ids = &mut stacks[stack_index].task_ids;
    let index = match placement {
        Placement::Front => 0,
        Placement::End => task_ids.len(),
        Placement::At(index) => index.min(task_ids.len()),
    };
    task_ids.insert(index, task_id);
    true
}

/// Relocates the stack at `from` to index `to` (remove, then reinsert).
pub(crate) fn move_stack(stacks: &mut Vec<Stack>, from: usize, to: usize) {
    if from >= stacks.len() || from == to {
        return;
    }
    let stack = stacks.remove(from);
    let to = to.min(stacks.len());
    stacks.insert(to, stack);
}
