//! First-run dataset: four example tasks in three stacks.

use super::Workspace;
use crate::model::{Stack, Task};

/// Returns the fixed first-run workspace.
pub fn seed_workspace() -> Workspace {
    let tasks = vec![
        Task::new(
            "a",
            "This is the most prioritized task",
            "Please Please Please",
            1_763_712_401,
        ),
        Task::new(
            "b",
            "Another important task",
            "Get this done soon",
            1_763_712_402,
        ),
        Task::new("c", "Stagnant task example", "This one is stuck", 1_763_712_403),
        Task::new("d", "Completed task", "This task is finished", 1_763_712_404).finished(true),
    ];
    let stacks = vec![
        Stack::new("s1", "Do Today").with_task_ids(["a", "b"]),
        Stack::new("s2", "Stagnant").with_task_ids(["c"]),
        Stack::new("s3", "Done").with_task_ids(["d"]),
    ];
    Workspace::from_parts(tasks, stacks, Vec::new(), Vec::new())
}
