//! Workspace state container.
//!
//! # Responsibility
//! - Own the current snapshot and expose the mutation operations as its
//!   only write surface.
//! - Hold the single drag slot between gesture start and end.
//! - Hand every changed snapshot to the persistence mirror.
//!
//! # Invariants
//! - Commands run to completion before any write is queued.
//! - The drag slot is cleared on every gesture end.

use crate::clock::{Clock, SystemClock};
use crate::config::{CoreConfig, DisplayPreferences};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::model::{AssetValue, HistoryItem, StackId, TaskId};
use crate::reorder::{DragOperation, DragSession};
use crate::service::pipeline::{Command, MutationPipeline, StackDeleteMode};
use crate::sync::{PersistenceSync, SyncResult};
use crate::workspace::Workspace;

pub struct WorkspaceSession<C: Clock = SystemClock, G: IdGenerator = UuidGenerator> {
    workspace: Workspace,
    pipeline: MutationPipeline<C, G>,
    drag: DragSession,
    background_image: Option<AssetValue>,
    preferences: DisplayPreferences,
    sync: Option<PersistenceSync>,
    first_run: bool,
}

impl WorkspaceSession {
    /// Loads (or seeds) the workspace from `sync` with default id/clock sources.
    pub fn open(sync: PersistenceSync) -> Self {
        Self::with_pipeline(sync, MutationPipeline::new())
    }

    /// Opens the store file named by `config`.
    pub fn open_with_config(config: &CoreConfig) -> SyncResult<Self> {
        Ok(Self::open(PersistenceSync::open(config.db_path())?))
    }
}

impl<C: Clock, G: IdGenerator> WorkspaceSession<C, G> {
    pub fn with_pipeline(mut sync: PersistenceSync, pipeline: MutationPipeline<C, G>) -> Self {
        let loaded = sync.load();
        Self {
            workspace: loaded.workspace,
            pipeline,
            drag: DragSession::new(),
            background_image: loaded.background_image,
            preferences: loaded.preferences,
            sync: Some(sync),
            first_run: loaded.first_run,
        }
    }

    /// Session over `workspace` with no backing store.
    pub fn in_memory(workspace: Workspace, pipeline: MutationPipeline<C, G>) -> Self {
        Self {
            workspace,
            pipeline,
            drag: DragSession::new(),
            background_image: None,
            preferences: DisplayPreferences::default(),
            sync: None,
            first_run: false,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// True when the store was empty or unreadable and the seed was used.
    pub fn first_run(&self) -> bool {
        self.first_run
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    pub fn background_image(&self) -> Option<&AssetValue> {
        self.background_image.as_ref()
    }

    pub fn display_preferences(&self) -> &DisplayPreferences {
        &self.preferences
    }

    /// Applies `command` and returns the history entry it appended, if any.
    pub fn dispatch(&mut self, command: Command) -> Option<HistoryItem> {
        self.dispatch_inner(command).0
    }

    fn dispatch_inner(&mut self, command: Command) -> (Option<HistoryItem>, Option<String>) {
        let transition = self.pipeline.apply(&self.workspace, command);
        if !transition.changed {
            return (None, None);
        }
        self.workspace = transition.workspace;
        if let Some(sync) = self.sync.as_mut() {
            sync.settle(&self.workspace);
        }
        (transition.event, transition.created_id)
    }

    /// Prepends a new task to `stack_id` and returns its id.
    pub fn add_task(
        &mut self,
        stack_id: &str,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<i64>,
    ) -> Option<TaskId> {
        self.dispatch_inner(Command::AddTask {
            stack_id: stack_id.to_string(),
            title: title.into(),
            description: description.into(),
            due_date,
        })
        .1
    }

    pub fn update_task(
        &mut self,
        task_id: &str,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<i64>,
    ) -> Option<HistoryItem> {
        self.dispatch(Command::UpdateTask {
            task_id: task_id.to_string(),
            title: title.into(),
            description: description.into(),
            due_date,
        })
    }

    pub fn toggle_task_status(&mut self, task_id: &str) -> Option<HistoryItem> {
        self.dispatch(Command::ToggleTaskStatus {
            task_id: task_id.to_string(),
        })
    }

    /// Appends a new empty stack and returns its id.
    pub fn add_stack(&mut self, title: impl Into<String>) -> Option<StackId> {
        self.dispatch_inner(Command::AddStack {
            title: title.into(),
        })
        .1
    }

    pub fn rename_stack(
        &mut self,
        stack_id: &str,
        title: impl Into<String>,
    ) -> Option<HistoryItem> {
        self.dispatch(Command::RenameStack {
            stack_id: stack_id.to_string(),
            title: title.into(),
        })
    }

    pub fn delete_stack(&mut self, stack_id: &str, mode: StackDeleteMode) -> Option<HistoryItem> {
        self.dispatch(Command::DeleteStack {
            stack_id: stack_id.to_string(),
            mode,
        })
    }

    pub fn delete_task(&mut self, task_id: &str) -> Option<HistoryItem> {
        self.dispatch(Command::DeleteTask {
            task_id: task_id.to_string(),
        })
    }

    pub fn archive_task(&mut self, task_id: &str) -> Option<HistoryItem> {
        self.dispatch(Command::ArchiveTask {
            task_id: task_id.to_string(),
        })
    }

    pub fn restore_archived_task(&mut self, task_id: &str) -> Option<HistoryItem> {
        self.dispatch(Command::RestoreArchivedTask {
            task_id: task_id.to_string(),
        })
    }

    pub fn delete_archived_task(&mut self, task_id: &str) {
        self.dispatch(Command::DeleteArchivedTask {
            task_id: task_id.to_string(),
        });
    }

    pub fn delete_history_item(&mut self, history_id: &str) {
        self.dispatch(Command::DeleteHistoryItem {
            history_id: history_id.to_string(),
        });
    }

    /// Gesture start: records where the dragged entity currently is.
    pub fn drag_start(&mut self, operation: &DragOperation) {
        self.drag.begin(self.workspace.stacks(), operation);
    }

    /// Gesture hover: live reorder.
    pub fn drag_over(&mut self, operation: DragOperation) {
        self.dispatch(Command::PreviewDrag(operation));
    }

    /// Gesture end: clears the drag slot and records the finished move.
    pub fn drag_end(&mut self, operation: DragOperation) -> Option<HistoryItem> {
        let start = self.drag.finish();
        self.dispatch(Command::CommitDrag { operation, start })
    }

    /// Replaces the presented background. `None` also deletes the stored asset.
    pub fn set_background_image(&mut self, value: Option<AssetValue>) {
        if let Some(sync) = self.sync.as_ref() {
            sync.save_background_image(value.as_ref());
        }
        self.background_image = value;
    }

    pub fn set_display_preferences(&mut self, preferences: DisplayPreferences) {
        let preferences = preferences.clamped();
        if let Some(sync) = self.sync.as_ref() {
            sync.save_preferences(&preferences);
        }
        self.preferences = preferences;
    }

    /// Waits for every queued write to reach the store.
    pub fn flush(&self) -> SyncResult<()> {
        match self.sync.as_ref() {
            Some(sync) => sync.flush(),
            None => Ok(()),
        }
    }

    /// Deletes the store. The live snapshot is kept until the process restarts.
    pub fn wipe(&mut self) -> SyncResult<()> {
        match self.sync.as_mut() {
            Some(sync) => sync.wipe(),
            None => Ok(()),
        }
    }
}
