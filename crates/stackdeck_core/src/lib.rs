//! Core of the StackDeck board: stacks of tasks, drag reordering, an
//! append-only history log and SQLite persistence.
//! This crate is the single source of truth for membership invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod ids;
pub mod logging;
pub mod model;
pub mod reorder;
pub mod repo;
pub mod service;
pub mod sync;
pub mod workspace;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use config::{ConfigError, CoreConfig, DisplayPreferences, Theme};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    ArchivedTask, AssetValue, HistoryActionType, HistoryId, HistoryItem, Stack, StackId, Task,
    TaskId, BACKGROUND_IMAGE_KEY,
};
pub use reorder::{apply_drag, DragEntity, DragKind, DragOperation, DragSession, DragStart};
pub use repo::{StoreError, StoreResult};
pub use service::{
    daily_activity, sorted_history, Command, DailyActivity, MutationPipeline, StackDeleteMode,
    Transition, WorkspaceSession,
};
pub use sync::{LoadedWorkspace, PersistenceSync, SyncError, SyncResult};
pub use workspace::{seed_workspace, InvariantViolation, TaskLocation, Workspace};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
