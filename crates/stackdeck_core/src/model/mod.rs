//! Workspace domain records: tasks, stacks, archive entries and history.
//!
//! # Responsibility
//! - Define the canonical records mirrored to durable storage.
//! - Keep records free of positional data: order lives in `Stack::task_ids`.
//!
//! # Invariants
//! - Every record is identified by a stable, globally unique string id.
//! - Identity never changes after creation.

pub mod asset;
pub mod history;
pub mod stack;
pub mod task;

pub use asset::{AssetValue, BACKGROUND_IMAGE_KEY};
pub use history::{HistoryActionType, HistoryId, HistoryItem};
pub use stack::{Stack, StackId};
pub use task::{ArchivedTask, Task, TaskId};
