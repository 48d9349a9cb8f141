//! In-memory workspace snapshot.
//!
//! # Responsibility
//! - Hold the four top-level collections as one value.
//! - Answer membership queries (owning stack, position, orphans).
//!
//! # Invariants
//! - Tasks live in one authoritative id-keyed arena; stacks hold only ids.
//! - Structural writes happen only inside this crate (mutation pipeline and
//!   reorder engine), always through the helpers in `membership`.
//! - Top-level stack order is meaningful and preserved verbatim.

pub(crate) mod membership;
mod seed;

pub use membership::TaskLocation;
pub use seed::seed_workspace;

use crate::model::{ArchivedTask, HistoryItem, Stack, Task, TaskId};
use std::collections::{BTreeMap, HashSet};
use std::fmt::{Display, Formatter};

/// One consistent snapshot of stacks, tasks, history and archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    pub(crate) tasks: BTreeMap<TaskId, Task>,
    pub(crate) stacks: Vec<Stack>,
    pub(crate) history: Vec<HistoryItem>,
    pub(crate) archived_tasks: Vec<ArchivedTask>,
}

/// Structural inconsistency detected by [`Workspace::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A stack lists an id with no task record.
    DanglingTaskId { stack_id: String, task_id: String },
    /// One task id is listed more than once across stacks.
    DuplicateMembership { task_id: String },
    /// An archived id is still present in the task collection or a stack.
    ArchivedTaskStillActive { task_id: String },
    /// Two stacks share one id.
    DuplicateStackId { stack_id: String },
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingTaskId { stack_id, task_id } => {
                write!(f, "stack {stack_id} lists unknown task {task_id}")
            }
            Self::DuplicateMembership { task_id } => {
                write!(f, "task {task_id} is listed more than once")
            }
            Self::ArchivedTaskStillActive { task_id } => {
                write!(f, "archived task {task_id} is still active")
            }
            Self::DuplicateStackId { stack_id } => write!(f, "duplicate stack id {stack_id}"),
        }
    }
}

impl Workspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from persisted or hand-built collections, verbatim.
    ///
    /// Task order is not significant and is normalized by id.
    pub fn from_parts(
        tasks: Vec<Task>,
        stacks: Vec<Stack>,
        history: Vec<HistoryItem>,
        archived_tasks: Vec<ArchivedTask>,
    ) -> Self {
        Self {
            tasks: tasks.into_iter().map(|task| (task.id.clone(), task)).collect(),
            stacks,
            history,
            archived_tasks,
        }
    }

    /// Returns true when there are neither tasks nor stacks (first run).
    pub fn is_blank(&self) -> bool {
        self.tasks.is_empty() && self.stacks.is_empty()
    }

    pub fn tasks(&self) -> impl ExactSizeIterator<Item = &Task> {
        self.tasks.values()
    }

    /// Task collection as a list, ordered by id.
    pub fn task_list(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stack(&self, stack_id: &str) -> Option<&Stack> {
        self.stacks.iter().find(|stack| stack.id == stack_id)
    }

    pub fn stack_index(&self, stack_id: &str) -> Option<usize> {
        self.stacks.iter().position(|stack| stack.id == stack_id)
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn archived_tasks(&self) -> &[ArchivedTask] {
        &self.archived_tasks
    }

    pub fn archived_task(&self, task_id: &str) -> Option<&ArchivedTask> {
        self.archived_tasks
            .iter()
            .find(|archived| archived.id() == task_id)
    }

    /// Finds the stack and position currently holding `task_id`.
    pub fn locate_task(&self, task_id: &str) -> Option<TaskLocation> {
        membership::locate(&self.stacks, task_id)
    }

    /// Returns the stack currently holding `task_id`.
    pub fn owning_stack(&self, task_id: &str) -> Option<&Stack> {
        self.locate_task(task_id)
            .map(|location| &self.stacks[location.stack_index])
    }

    /// Task ids that exist in the task collection but in no stack.
    pub fn orphaned_task_ids(&self) -> Vec<TaskId> {
        let reachable = self
            .stacks
            .iter()
            .flat_map(|stack| stack.task_ids.iter().map(String::as_str))
            .collect::<HashSet<_>>();
        self.tasks
            .keys()
            .filter(|id| !reachable.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Verifies stack/task/archive membership rules.
    ///
    /// Orphaned task records are not reported here; see
    /// [`Workspace::orphaned_task_ids`].
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let mut stack_ids = HashSet::new();
        for stack in &self.stacks {
            if !stack_ids.insert(stack.id.as_str()) {
                violations.push(InvariantViolation::DuplicateStackId {
                    stack_id: stack.id.clone(),
                });
            }
        }

        let mut listed = HashSet::new();
        for stack in &self.stacks {
            for task_id in &stack.task_ids {
                if !listed.insert(task_id.as_str()) {
                    violations.push(InvariantViolation::DuplicateMembership {
                        task_id: task_id.clone(),
                    });
                }
                if !self.tasks.contains_key(task_id) {
                    violations.push(InvariantViolation::DanglingTaskId {
                        stack_id: stack.id.clone(),
                        task_id: task_id.clone(),
                    });
                }
            }
        }

        for archived in &self.archived_tasks {
            if self.tasks.contains_key(archived.id()) || listed.contains(archived.id()) {
                violations.push(InvariantViolation::ArchivedTaskStillActive {
                    task_id: archived.task.id.clone(),
                });
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::{InvariantViolation, Workspace};
    use crate::model::{ArchivedTask, Stack, Task};

    fn task(id: &str) -> Task {
        Task::new(id, id, "", 0)
    }

    #[test]
    fn orphaned_task_ids_lists_unlisted_records() {
        let workspace = Workspace::from_parts(
            vec![task("t1"), task("t2")],
            vec![Stack::new("s1", "A").with_task_ids(["t1"])],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(workspace.orphaned_task_ids(), vec!["t2".to_string()]);
        assert!(workspace.check_invariants().is_empty());
    }

    #[test]
    fn check_invariants_reports_each_violation_kind() {
        let workspace = Workspace::from_parts(
            vec![task("t1"), task("t3")],
            vec![
                Stack::new("s1", "A").with_task_ids(["t1", "t2"]),
                Stack::new("s1", "B").with_task_ids(["t1"]),
            ],
            Vec::new(),
            vec![ArchivedTask::from_task(task("t3"), "s1", 0)],
        );

        let violations = workspace.check_invariants();
        assert!(violations.contains(&InvariantViolation::DuplicateStackId {
            stack_id: "s1".to_string()
        }));
        assert!(violations.contains(&InvariantViolation::DanglingTaskId {
            stack_id: "s1".to_string(),
            task_id: "t2".to_string()
        }));
        assert!(violations.contains(&InvariantViolation::DuplicateMembership {
            task_id: "t1".to_string()
        }));
        assert!(violations.contains(&InvariantViolation::ArchivedTaskStillActive {
            task_id: "t3".to_string()
        }));
    }

    #[test]
    fn owning_stack_resolves_position() {
        let workspace = Workspace::from_parts(
            vec![task("t1"), task("t2")],
            vec![
                Stack::new("s1", "A"),
                Stack::new("s2", "B").with_task_ids(["t1", "t2"]),
            ],
            Vec::new(),
            Vec::new(),
        );
        let location = workspace.locate_task("t2").unwrap();
        assert_eq!(location.stack_index, 1);
        assert_eq!(location.position, 1);
        assert_eq!(workspace.owning_stack("t2").unwrap().id, "s2");
        assert!(workspace.owning_stack("missing").is_none());
    }
}
