//! Per-collection change detection between the live workspace and the store.
//!
//! # Responsibility
//! - Observe each collection independently and emit a whole-collection write
//!   only when that collection's value changed since the last observation.
//!
//! # Invariants
//! - A change to one collection never produces a write for another.
//! - After `after_load`, the first observation of Stacks is recorded but not
//!   written. Other collections have no such guard.

use crate::model::{ArchivedTask, HistoryItem, Stack, Task};
use crate::workspace::Workspace;

/// One whole-collection replace, queued for the store writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionWrite {
    Tasks(Vec<Task>),
    Stacks(Vec<Stack>),
    History(Vec<HistoryItem>),
    ArchivedTasks(Vec<ArchivedTask>),
}

impl CollectionWrite {
    /// Stable collection name used in log events.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Tasks(_) => "tasks",
            Self::Stacks(_) => "stacks",
            Self::History(_) => "history",
            Self::ArchivedTasks(_) => "archived_tasks",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Tasks(records) => records.len(),
            Self::Stacks(records) => records.len(),
            Self::History(records) => records.len(),
            Self::ArchivedTasks(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct Channel<T> {
    last: Option<Vec<T>>,
    skip_next: bool,
}

impl<T: Clone + PartialEq> Channel<T> {
    fn new(skip_next: bool) -> Self {
        Self {
            last: None,
            skip_next,
        }
    }

    fn observe(&mut self, current: &[T]) -> Option<Vec<T>> {
        if self.last.as_deref() == Some(current) {
            return None;
        }
        self.last = Some(current.to_vec());
        if std::mem::take(&mut self.skip_next) {
            return None;
        }
        Some(current.to_vec())
    }
}

/// Reactive mirror of the four workspace collections.
#[derive(Debug)]
pub struct CollectionMirror {
    tasks: Channel<Task>,
    stacks: Channel<Stack>,
    history: Channel<HistoryItem>,
    archived_tasks: Channel<ArchivedTask>,
}

impl Default for CollectionMirror {
    fn default() -> Self {
        Self::with_stacks_guard(false)
    }
}

impl CollectionMirror {
    /// Mirror that writes every collection on its first observation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror armed for the first settle after hydration or seeding.
    pub fn after_load() -> Self {
        Self::with_stacks_guard(true)
    }

    fn with_stacks_guard(skip_first_stacks: bool) -> Self {
        Self {
            tasks: Channel::new(false),
            stacks: Channel::new(skip_first_stacks),
            history: Channel::new(false),
            archived_tasks: Channel::new(false),
        }
    }

    /// True while the one-shot Stacks guard has not fired yet.
    pub fn stacks_guard_pending(&self) -> bool {
        self.stacks.skip_next
    }

    /// Compares `workspace` with the last observed values and returns the
    /// writes needed to bring the store up to date.
    pub fn settle(&mut self, workspace: &Workspace) -> Vec<CollectionWrite> {
        let task_list = workspace.task_list();
        [
            self.tasks.observe(&task_list).map(CollectionWrite::Tasks),
            self.stacks
                .observe(workspace.stacks())
                .map(CollectionWrite::Stacks),
            self.history
                .observe(workspace.history())
                .map(CollectionWrite::History),
            self.archived_tasks
                .observe(workspace.archived_tasks())
                .map(CollectionWrite::ArchivedTasks),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionMirror, CollectionWrite};
    use crate::model::{Stack, Task};
    use crate::workspace::{seed_workspace, Workspace};

    fn collections(writes: &[CollectionWrite]) -> Vec<&'static str> {
        writes.iter().map(CollectionWrite::collection).collect()
    }

    #[test]
    fn first_settle_after_load_skips_only_stacks() {
        let mut mirror = CollectionMirror::after_load();
        assert!(mirror.stacks_guard_pending());

        let writes = mirror.settle(&seed_workspace());
        assert_eq!(collections(&writes), vec!["tasks", "history", "archived_tasks"]);
        assert!(!mirror.stacks_guard_pending());
    }

    #[test]
    fn unchanged_collections_are_not_rewritten() {
        let workspace = seed_workspace();
        let mut mirror = CollectionMirror::new();
        assert_eq!(mirror.settle(&workspace).len(), 4);
        assert!(mirror.settle(&workspace).is_empty());
    }

    #[test]
    fn a_stack_change_writes_only_stacks() {
        let before = Workspace::from_parts(
            vec![Task::new("t1", "One", "", 1)],
            vec![Stack::new("s1", "A").with_task_ids(["t1"])],
            Vec::new(),
            Vec::new(),
        );
        let after = Workspace::from_parts(
            vec![Task::new("t1", "One", "", 1)],
            vec![Stack::new("s1", "Renamed").with_task_ids(["t1"])],
            Vec::new(),
            Vec::new(),
        );
        let mut mirror = CollectionMirror::after_load();
        mirror.settle(&before);

        let writes = mirror.settle(&after);
        assert_eq!(writes.len(), 1);
        match &writes[0] {
            CollectionWrite::Stacks(stacks) => assert_eq!(stacks[0].title, "Renamed"),
            other => panic!("unexpected write {other:?}"),
        }
    }
}
