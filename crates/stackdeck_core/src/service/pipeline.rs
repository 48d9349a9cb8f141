//! Mutation and history pipeline.
//!
//! # Responsibility
//! - Turn one [`Command`] and the current snapshot into the next snapshot.
//! - Describe each meaningful change as one appended history entry.
//!
//! # Invariants
//! - The input snapshot is never mutated; every transition builds a new one.
//! - Descriptions are computed from pre-mutation values.
//! - A command naming a missing entity is a silent no-op: the returned
//!   snapshot equals the input and no history entry is appended.
//! - Membership edits go through `workspace::membership`, so a task id is
//!   never listed twice.

use crate::clock::{Clock, SystemClock};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::model::{
    ArchivedTask, HistoryActionType, HistoryId, HistoryItem, Stack, StackId, Task, TaskId,
};
use crate::reorder::{resolve_drag, DragKind, DragOperation, DragStart};
use crate::workspace::membership::{detach_task_id, place_task_id, Placement};
use crate::workspace::Workspace;
use log::{debug, trace};

/// What happens to a deleted stack's tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StackDeleteMode {
    /// Drop the stack's id list only. Its tasks stay in the task collection,
    /// reachable from no stack.
    #[default]
    DetachTasks,
    /// Also remove the stack's tasks from the task collection.
    CascadeTasks,
}

/// One state-changing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddTask {
        stack_id: StackId,
        title: String,
        description: String,
        due_date: Option<i64>,
    },
    UpdateTask {
        task_id: TaskId,
        title: String,
        description: String,
        due_date: Option<i64>,
    },
    ToggleTaskStatus {
        task_id: TaskId,
    },
    AddStack {
        title: String,
    },
    RenameStack {
        stack_id: StackId,
        title: String,
    },
    DeleteStack {
        stack_id: StackId,
        mode: StackDeleteMode,
    },
    DeleteTask {
        task_id: TaskId,
    },
    ArchiveTask {
        task_id: TaskId,
    },
    RestoreArchivedTask {
        task_id: TaskId,
    },
    DeleteArchivedTask {
        task_id: TaskId,
    },
    DeleteHistoryItem {
        history_id: HistoryId,
    },
    /// Live drag-over feedback. Reorders stacks, records nothing.
    PreviewDrag(DragOperation),
    /// Gesture end. Records the finished move; ordering was already applied
    /// by the previews.
    CommitDrag {
        operation: DragOperation,
        start: Option<DragStart>,
    },
}

impl Command {
    /// Stable command name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddTask { .. } => "add_task",
            Self::UpdateTask { .. } => "update_task",
            Self::ToggleTaskStatus { .. } => "toggle_task_status",
            Self::AddStack { .. } => "add_stack",
            Self::RenameStack { .. } => "rename_stack",
            Self::DeleteStack { .. } => "delete_stack",
            Self::DeleteTask { .. } => "delete_task",
            Self::ArchiveTask { .. } => "archive_task",
            Self::RestoreArchivedTask { .. } => "restore_archived_task",
            Self::DeleteArchivedTask { .. } => "delete_archived_task",
            Self::DeleteHistoryItem { .. } => "delete_history_item",
            Self::PreviewDrag(_) => "preview_drag",
            Self::CommitDrag { .. } => "commit_drag",
        }
    }
}

/// Output of [`MutationPipeline::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub workspace: Workspace,
    /// History entry appended by this transition, if any.
    pub event: Option<HistoryItem>,
    /// False when the command was a no-op.
    pub changed: bool,
    /// Id of the task or stack created by `AddTask` / `AddStack`.
    pub created_id: Option<String>,
}

struct Outcome {
    record: Option<(HistoryActionType, String)>,
    created_id: Option<String>,
}

impl Outcome {
    fn recorded(action: HistoryActionType, details: String) -> Self {
        Self {
            record: Some((action, details)),
            created_id: None,
        }
    }

    fn silent() -> Self {
        Self {
            record: None,
            created_id: None,
        }
    }

    fn created(mut self, id: String) -> Self {
        self.created_id = Some(id);
        self
    }
}

/// Applies commands to workspace snapshots.
#[derive(Debug, Clone, Default)]
pub struct MutationPipeline<C: Clock = SystemClock, G: IdGenerator = UuidGenerator> {
    clock: C,
    ids: G,
}

impl MutationPipeline {
    /// Pipeline backed by the system clock and UUID v4 ids.
    pub fn new() -> Self {
        Self::with_sources(SystemClock, UuidGenerator)
    }
}

impl<C: Clock, G: IdGenerator> MutationPipeline<C, G> {
    pub fn with_sources(clock: C, ids: G) -> Self {
        Self { clock, ids }
    }

    /// Computes the snapshot that follows `command`.
    pub fn apply(&self, workspace: &Workspace, command: Command) -> Transition {
        let name = command.name();
        let now = self.clock.now_ms();
        let mut next = workspace.clone();

        let outcome = match command {
            Command::AddTask {
                stack_id,
                title,
                description,
                due_date,
            } => self.add_task(&mut next, &stack_id, title, description, due_date, now),
            Command::UpdateTask {
                task_id,
                title,
                description,
                due_date,
            } => update_task(&mut next, &task_id, title, description, due_date),
            Command::ToggleTaskStatus { task_id } => toggle_task_status(&mut next, &task_id),
            Command::AddStack { title } => self.add_stack(&mut next, title),
            Command::RenameStack { stack_id, title } => rename_stack(&mut next, &stack_id, title),
            Command::DeleteStack { stack_id, mode } => delete_stack(&mut next, &stack_id, mode),
            Command::DeleteTask { task_id } => delete_task(&mut next, &task_id),
            Command::ArchiveTask { task_id } => archive_task(&mut next, &task_id, now),
            Command::RestoreArchivedTask { task_id } => restore_archived_task(&mut next, &task_id),
            Command::DeleteArchivedTask { task_id } => delete_archived_task(&mut next, &task_id),
            Command::DeleteHistoryItem { history_id } => {
                delete_history_item(&mut next, &history_id)
            }
            Command::PreviewDrag(operation) => preview_drag(&mut next, &operation),
            Command::CommitDrag { operation, start } => {
                commit_drag(&next, &operation, start.as_ref())
            }
        };

        let Some(outcome) = outcome else {
            trace!("event=command_apply module=service status=skip command={name} reason=noop");
            return Transition {
                workspace: workspace.clone(),
                event: None,
                changed: false,
                created_id: None,
            };
        };

        let event = outcome.record.map(|(action_type, details)| {
            let item = HistoryItem {
                id: self.ids.next_id(),
                timestamp: now,
                action_type,
                details,
            };
            next.history.push(item.clone());
            item
        });

        debug!(
            "event=command_apply module=service status=ok command={name} history={} stacks={} tasks={}",
            event.as_ref().map_or("none", |item| item.action_type.as_str()),
            next.stacks.len(),
            next.tasks.len()
        );

        Transition {
            workspace: next,
            event,
            changed: true,
            created_id: outcome.created_id,
        }
    }

    fn add_task(
        &self,
        next: &mut Workspace,
        stack_id: &str,
        title: String,
        description: String,
        due_date: Option<i64>,
        now: i64,
    ) -> Option<Outcome> {
        let stack_index = next.stack_index(stack_id)?;
        let details = format!("Added \"{title}\" to {}", next.stacks[stack_index].title);

        let task_id = self.ids.next_id();
        let task = Task::new(task_id.clone(), title, description, now).with_due_date(due_date);
        next.tasks.insert(task_id.clone(), task);
        place_task_id(
            &mut next.stacks,
            task_id.clone(),
            stack_index,
            Placement::Front,
        );

        Some(Outcome::recorded(HistoryActionType::AddTask, details).created(task_id))
    }

    fn add_stack(&self, next: &mut Workspace, title: String) -> Option<Outcome> {
        let details = format!("Created new stack \"{title}\"");
        let stack_id = self.ids.next_id();
        next.stacks.push(Stack::new(stack_id.clone(), title));
        Some(Outcome::recorded(HistoryActionType::AddStack, details).created(stack_id))
    }
}

fn update_task(
    next: &mut Workspace,
    task_id: &str,
    title: String,
    description: String,
    due_date: Option<i64>,
) -> Option<Outcome> {
    let task = next.tasks.get_mut(task_id)?;
    if task.title == title && task.description == description && task.due_date == due_date {
        return None;
    }
    let details = format!("Updated details for \"{}\"", task.title);
    task.title = title;
    task.description = description;
    task.due_date = due_date;
    Some(Outcome::recorded(HistoryActionType::UpdateTask, details))
}

fn toggle_task_status(next: &mut Workspace, task_id: &str) -> Option<Outcome> {
    let task = next.tasks.get_mut(task_id)?;
    let status = if task.is_finished {
        "incomplete"
    } else {
        "complete"
    };
    let details = format!("Marked \"{}\" as {status}", task.title);
    task.is_finished = !task.is_finished;
    Some(Outcome::recorded(HistoryActionType::UpdateStatus, details))
}

fn rename_stack(next: &mut Workspace, stack_id: &str, title: String) -> Option<Outcome> {
    let stack = next.stacks.iter_mut().find(|stack| stack.id == stack_id)?;
    if stack.title == title {
        return None;
    }
    let details = format!("Renamed stack \"{}\" to \"{title}\"", stack.title);
    stack.title = title;
    Some(Outcome::recorded(HistoryActionType::UpdateStack, details))
}

fn delete_stack(next: &mut Workspace, stack_id: &str, mode: StackDeleteMode) -> Option<Outcome> {
    let stack_index = next.stack_index(stack_id)?;
    let removed = next.stacks.remove(stack_index);
    let details = format!("Deleted stack \"{}\"", removed.title);
    if mode == StackDeleteMode::CascadeTasks {
        for task_id in &removed.task_ids {
            next.tasks.remove(task_id);
        }
    }
    Some(Outcome::recorded(HistoryActionType::DeleteStack, details))
}

/// Title of the stack listing `task_id`, or `"stack"` for orphans.
fn owning_stack_title(next: &Workspace, task_id: &str) -> String {
    next.owning_stack(task_id)
        .map_or_else(|| "stack".to_string(), |stack| stack.title.clone())
}

fn delete_task(next: &mut Workspace, task_id: &str) -> Option<Outcome> {
    let title = next.task(task_id)?.title.clone();
    let details = format!(
        "Deleted task \"{title}\" from \"{}\"",
        owning_stack_title(next, task_id)
    );
    next.tasks.remove(task_id);
    detach_task_id(&mut next.stacks, task_id);
    Some(Outcome::recorded(HistoryActionType::DeleteTask, details))
}

fn archive_task(next: &mut Workspace, task_id: &str, now: i64) -> Option<Outcome> {
    let title = next.task(task_id)?.title.clone();
    let details = format!(
        "Archived task \"{title}\" from \"{}\"",
        owning_stack_title(next, task_id)
    );
    let original_stack_id = next
        .owning_stack(task_id)
        .map(|stack| stack.id.clone())
        .unwrap_or_default();

    let task = next.tasks.remove(task_id)?;
    detach_task_id(&mut next.stacks, task_id);
    next.archived_tasks.push(ArchivedTask::from_task(task, original_stack_id, now));
    Some(Outcome::recorded(HistoryActionType::ArchiveTask, details))
}

fn restore_archived_task(next: &mut Workspace, task_id: &str) -> Option<Outcome> {
    let position = next
        .archived_tasks
        .iter()
        .position(|archived| archived.id() == task_id)?;
    let archived = next.archived_tasks.remove(position);
    let target_index = next
        .stack_index(&archived.original_stack_id)
        .or_else(|| (!next.stacks.is_empty()).then_some(0));

    let task = archived.into_task();
    let details = format!("Restored task \"{}\" from archive", task.title);
    let restored_id = task.id.clone();
    next.tasks.insert(restored_id.clone(), task);
    if let Some(stack_index) = target_index {
        place_task_id(&mut next.stacks, restored_id, stack_index, Placement::End);
    }
    Some(Outcome::recorded(HistoryActionType::AddTask, details))
}

fn delete_archived_task(next: &mut Workspace, task_id: &str) -> Option<Outcome> {
    let position = next
        .archived_tasks
        .iter()
        .position(|archived| archived.id() == task_id)?;
    next.archived_tasks.remove(position);
    Some(Outcome::silent())
}

fn delete_history_item(next: &mut Workspace, history_id: &str) -> Option<Outcome> {
    let position = next.history.iter().position(|item| item.id == history_id)?;
    next.history.remove(position);
    Some(Outcome::silent())
}

fn preview_drag(next: &mut Workspace, operation: &DragOperation) -> Option<Outcome> {
    next.stacks = resolve_drag(&next.stacks, operation)?;
    Some(Outcome::silent())
}

fn commit_drag(
    next: &Workspace,
    operation: &DragOperation,
    start: Option<&DragStart>,
) -> Option<Outcome> {
    let start = start?;
    let source = operation.source.as_ref()?;
    // A gesture released over nothing records nothing.
    operation.target.as_ref()?;

    match source.kind {
        DragKind::Stack => {
            let new_index = next.stack_index(&source.id)?;
            if new_index == start.index {
                return None;
            }
            let details = format!(
                "Reordered stack \"{}\" from index {} to {new_index}",
                next.stacks[new_index].title, start.index
            );
            Some(Outcome::recorded(HistoryActionType::MoveStack, details))
        }
        DragKind::Task => {
            let task = next.task(&source.id)?;
            let location = next.locate_task(&source.id)?;
            let new_stack = &next.stacks[location.stack_index];
            let details = if start.stack_id.as_deref() == Some(new_stack.id.as_str()) {
                if location.position == start.index {
                    return None;
                }
                format!(
                    "Moved task \"{}\" in \"{}\" from index {} to {}",
                    task.title, new_stack.title, start.index, location.position
                )
            } else {
                format!(
                    "Moved task \"{}\" from \"{}\" index {} to \"{}\" index {}",
                    task.title,
                    start.stack_title.as_deref().unwrap_or_default(),
                    start.index,
                    new_stack.title,
                    location.position
                )
            };
            Some(Outcome::recorded(HistoryActionType::MoveTask, details))
        }
        DragKind::Unknown => None,
    }
}
