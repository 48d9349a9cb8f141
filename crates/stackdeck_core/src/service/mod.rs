//! Mutation pipeline, session container and history views.

pub mod history_view;
pub mod pipeline;
pub mod session;

pub use history_view::{daily_activity, sorted_history, DailyActivity};
pub use pipeline::{Command, MutationPipeline, StackDeleteMode, Transition};
pub use session::WorkspaceSession;
