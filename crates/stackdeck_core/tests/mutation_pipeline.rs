use stackdeck_core::{
    Command, DragEntity, DragOperation, DragStart, HistoryActionType, MutationPipeline,
    SequentialIds, Stack, StackDeleteMode, SteppingClock, Task, Workspace,
};

type TestPipeline = MutationPipeline<SteppingClock, SequentialIds>;

fn pipeline() -> TestPipeline {
    MutationPipeline::with_sources(SteppingClock::new(1_000, 1), SequentialIds::new("id"))
}

fn board() -> Workspace {
    Workspace::from_parts(
        vec![
            Task::new("t1", "Write tests", "", 1),
            Task::new("t2", "Ship release", "notes", 2),
            Task::new("t5", "Parked", "", 5),
        ],
        vec![
            Stack::new("s1", "Todo").with_task_ids(["t1", "t2"]),
            Stack::new("s2", "Later").with_task_ids(["t5"]),
        ],
        Vec::new(),
        Vec::new(),
    )
}

fn ids(stack: &Stack) -> Vec<&str> {
    stack.task_ids.iter().map(String::as_str).collect()
}

#[test]
fn add_task_prepends_and_records_one_entry() {
    let pipeline = pipeline();
    let transition = pipeline.apply(
        &board(),
        Command::AddTask {
            stack_id: "s1".to_string(),
            title: "Ship release notes".to_string(),
            description: String::new(),
            due_date: Some(42),
        },
    );

    let new_id = transition.created_id.clone().unwrap();
    let workspace = &transition.workspace;
    assert_eq!(workspace.stack("s1").unwrap().task_ids[0], new_id);
    let task = workspace.task(&new_id).unwrap();
    assert_eq!(task.due_date, Some(42));
    assert!(!task.is_finished);

    assert_eq!(workspace.history().len(), 1);
    let event = transition.event.unwrap();
    assert_eq!(event.action_type, HistoryActionType::AddTask);
    assert_eq!(event.details, "Added \"Ship release notes\" to Todo");
    assert_eq!(workspace.history()[0], event);
    assert!(workspace.check_invariants().is_empty());
}

#[test]
fn archive_then_restore_returns_task_to_the_end_of_its_stack() {
    let pipeline = pipeline();
    let archived = pipeline.apply(
        &board(),
        Command::ArchiveTask {
            task_id: "t1".to_string(),
        },
    );
    let workspace = &archived.workspace;
    assert_eq!(ids(workspace.stack("s1").unwrap()), vec!["t2"]);
    assert!(workspace.task("t1").is_none());
    let entry = workspace.archived_task("t1").unwrap();
    assert_eq!(entry.original_stack_id, "s1");
    assert_eq!(
        archived.event.unwrap().details,
        "Archived task \"Write tests\" from \"Todo\""
    );

    let restored = pipeline.apply(
        workspace,
        Command::RestoreArchivedTask {
            task_id: "t1".to_string(),
        },
    );
    let workspace = &restored.workspace;
    assert_eq!(ids(workspace.stack("s1").unwrap()), vec!["t2", "t1"]);
    assert!(workspace.archived_tasks().is_empty());
    assert_eq!(workspace.task("t1").unwrap().title, "Write tests");
    let event = restored.event.unwrap();
    assert_eq!(event.action_type, HistoryActionType::AddTask);
    assert_eq!(event.details, "Restored task \"Write tests\" from archive");
    assert!(workspace.check_invariants().is_empty());
}

#[test]
fn restore_falls_back_to_first_stack_when_origin_is_gone() {
    let pipeline = pipeline();
    let mut workspace = pipeline
        .apply(
            &board(),
            Command::ArchiveTask {
                task_id: "t5".to_string(),
            },
        )
        .workspace;
    workspace = pipeline
        .apply(
            &workspace,
            Command::DeleteStack {
                stack_id: "s2".to_string(),
                mode: StackDeleteMode::DetachTasks,
            },
        )
        .workspace;

    let restored = pipeline
        .apply(
            &workspace,
            Command::RestoreArchivedTask {
                task_id: "t5".to_string(),
            },
        )
        .workspace;
    assert_eq!(ids(&restored.stacks()[0]), vec!["t1", "t2", "t5"]);
}

#[test]
fn restore_without_any_stack_leaves_the_task_floating() {
    let pipeline = pipeline();
    let workspace = Workspace::from_parts(
        Vec::new(),
        Vec::new(),
        Vec::new(),
        vec![stackdeck_core::ArchivedTask::from_task(
            Task::new("t7", "Lonely", "", 7),
            "s-gone",
            70,
        )],
    );

    let transition = pipeline.apply(
        &workspace,
        Command::RestoreArchivedTask {
            task_id: "t7".to_string(),
        },
    );
    let restored = &transition.workspace;
    assert!(restored.task("t7").is_some());
    assert!(restored.archived_tasks().is_empty());
    assert_eq!(restored.orphaned_task_ids(), vec!["t7".to_string()]);
    assert!(transition.event.is_some());
}

#[test]
fn deleting_a_stack_detaches_its_tasks_by_default() {
    let pipeline = pipeline();
    let transition = pipeline.apply(
        &board(),
        Command::DeleteStack {
            stack_id: "s2".to_string(),
            mode: StackDeleteMode::default(),
        },
    );
    let workspace = &transition.workspace;

    assert!(workspace.stack("s2").is_none());
    assert!(workspace.task("t5").is_some());
    assert_eq!(workspace.orphaned_task_ids(), vec!["t5".to_string()]);
    assert_eq!(transition.event.unwrap().details, "Deleted stack \"Later\"");
}

#[test]
fn cascading_stack_delete_removes_its_tasks() {
    let pipeline = pipeline();
    let workspace = pipeline
        .apply(
            &board(),
            Command::DeleteStack {
                stack_id: "s1".to_string(),
                mode: StackDeleteMode::CascadeTasks,
            },
        )
        .workspace;

    assert!(workspace.task("t1").is_none());
    assert!(workspace.task("t2").is_none());
    assert!(workspace.task("t5").is_some());
    assert!(workspace.orphaned_task_ids().is_empty());
}

#[test]
fn unchanged_update_and_rename_record_nothing() {
    let pipeline = pipeline();
    let workspace = board();

    let update = pipeline.apply(
        &workspace,
        Command::UpdateTask {
            task_id: "t2".to_string(),
            title: "Ship release".to_string(),
            description: "notes".to_string(),
            due_date: None,
        },
    );
    assert!(!update.changed);
    assert!(update.event.is_none());
    assert_eq!(update.workspace, workspace);

    let rename = pipeline.apply(
        &workspace,
        Command::RenameStack {
            stack_id: "s1".to_string(),
            title: "Todo".to_string(),
        },
    );
    assert!(rename.event.is_none());
    assert!(rename.workspace.history().is_empty());
}

#[test]
fn descriptions_use_pre_mutation_values() {
    let pipeline = pipeline();
    let workspace = board();

    let update = pipeline.apply(
        &workspace,
        Command::UpdateTask {
            task_id: "t1".to_string(),
            title: "Write more tests".to_string(),
            description: String::new(),
            due_date: None,
        },
    );
    assert_eq!(
        update.event.unwrap().details,
        "Updated details for \"Write tests\""
    );
    assert_eq!(update.workspace.task("t1").unwrap().title, "Write more tests");

    let rename = pipeline.apply(
        &workspace,
        Command::RenameStack {
            stack_id: "s1".to_string(),
            title: "Now".to_string(),
        },
    );
    assert_eq!(
        rename.event.unwrap().details,
        "Renamed stack \"Todo\" to \"Now\""
    );

    let toggled = pipeline.apply(
        &workspace,
        Command::ToggleTaskStatus {
            task_id: "t1".to_string(),
        },
    );
    assert_eq!(
        toggled.event.unwrap().details,
        "Marked \"Write tests\" as complete"
    );
    let toggled_back = pipeline.apply(
        &toggled.workspace,
        Command::ToggleTaskStatus {
            task_id: "t1".to_string(),
        },
    );
    assert_eq!(
        toggled_back.event.unwrap().details,
        "Marked \"Write tests\" as incomplete"
    );
}

#[test]
fn add_stack_appends_an_empty_stack() {
    let pipeline = pipeline();
    let transition = pipeline.apply(
        &board(),
        Command::AddStack {
            title: "Review".to_string(),
        },
    );
    let stack = transition.workspace.stacks().last().unwrap();
    assert_eq!(Some(stack.id.clone()), transition.created_id);
    assert_eq!(stack.title, "Review");
    assert!(stack.task_ids.is_empty());
    assert_eq!(
        transition.event.unwrap().details,
        "Created new stack \"Review\""
    );
}

#[test]
fn delete_task_purges_membership() {
    let pipeline = pipeline();
    let transition = pipeline.apply(
        &board(),
        Command::DeleteTask {
            task_id: "t2".to_string(),
        },
    );
    assert!(transition.workspace.task("t2").is_none());
    assert_eq!(ids(transition.workspace.stack("s1").unwrap()), vec!["t1"]);
    assert_eq!(
        transition.event.unwrap().details,
        "Deleted task \"Ship release\" from \"Todo\""
    );
}

#[test]
fn archive_and_history_deletes_record_nothing() {
    let pipeline = pipeline();
    let archived = pipeline
        .apply(
            &board(),
            Command::ArchiveTask {
                task_id: "t1".to_string(),
            },
        )
        .workspace;
    let history_id = archived.history()[0].id.clone();

    let without_archive = pipeline.apply(
        &archived,
        Command::DeleteArchivedTask {
            task_id: "t1".to_string(),
        },
    );
    assert!(without_archive.changed);
    assert!(without_archive.event.is_none());
    assert!(without_archive.workspace.archived_tasks().is_empty());
    assert_eq!(without_archive.workspace.history().len(), 1);

    let without_history = pipeline.apply(
        &without_archive.workspace,
        Command::DeleteHistoryItem { history_id },
    );
    assert!(without_history.event.is_none());
    assert!(without_history.workspace.history().is_empty());
}

#[test]
fn missing_ids_are_silent_noops() {
    let pipeline = pipeline();
    let workspace = board();
    let missing = "nope".to_string();
    let commands = vec![
        Command::AddTask {
            stack_id: missing.clone(),
            title: "x".to_string(),
            description: String::new(),
            due_date: None,
        },
        Command::UpdateTask {
            task_id: missing.clone(),
            title: "x".to_string(),
            description: String::new(),
            due_date: None,
        },
        Command::ToggleTaskStatus {
            task_id: missing.clone(),
        },
        Command::RenameStack {
            stack_id: missing.clone(),
            title: "x".to_string(),
        },
        Command::DeleteStack {
            stack_id: missing.clone(),
            mode: StackDeleteMode::CascadeTasks,
        },
        Command::DeleteTask {
            task_id: missing.clone(),
        },
        Command::ArchiveTask {
            task_id: missing.clone(),
        },
        Command::RestoreArchivedTask {
            task_id: missing.clone(),
        },
        Command::DeleteArchivedTask {
            task_id: missing.clone(),
        },
        Command::DeleteHistoryItem {
            history_id: missing.clone(),
        },
        Command::PreviewDrag(DragOperation::new(
            DragEntity::task(missing.clone()),
            DragEntity::stack("s1"),
        )),
        Command::CommitDrag {
            operation: DragOperation::new(DragEntity::task(missing), DragEntity::stack("s1")),
            start: Some(DragStart {
                index: 0,
                stack_id: Some("s1".to_string()),
                stack_title: Some("Todo".to_string()),
            }),
        },
    ];

    for command in commands {
        let name = command.name();
        let transition = pipeline.apply(&workspace, command);
        assert_eq!(transition.workspace, workspace, "{name}");
        assert!(transition.event.is_none(), "{name}");
        assert!(!transition.changed, "{name}");
    }
}

#[test]
fn commit_drag_describes_same_stack_and_cross_stack_moves() {
    let pipeline = pipeline();
    let workspace = board();

    let same_stack = DragOperation::new(DragEntity::task("t2"), DragEntity::task("t1"));
    let start = DragStart::capture(workspace.stacks(), &DragEntity::task("t2"));
    let previewed = pipeline
        .apply(&workspace, Command::PreviewDrag(same_stack.clone()))
        .workspace;
    assert!(previewed.history().is_empty());
    let committed = pipeline.apply(
        &previewed,
        Command::CommitDrag {
            operation: same_stack,
            start,
        },
    );
    let event = committed.event.unwrap();
    assert_eq!(event.action_type, HistoryActionType::MoveTask);
    assert_eq!(
        event.details,
        "Moved task \"Ship release\" in \"Todo\" from index 1 to 0"
    );
    // Commit records only; ordering came from the preview.
    assert_eq!(committed.workspace.stacks(), previewed.stacks());

    let cross = DragOperation::new(DragEntity::task("t1"), DragEntity::stack("s2"));
    let start = DragStart::capture(workspace.stacks(), &DragEntity::task("t1"));
    let previewed = pipeline
        .apply(&workspace, Command::PreviewDrag(cross.clone()))
        .workspace;
    let committed = pipeline.apply(
        &previewed,
        Command::CommitDrag {
            operation: cross,
            start,
        },
    );
    assert_eq!(
        committed.event.unwrap().details,
        "Moved task \"Write tests\" from \"Todo\" index 0 to \"Later\" index 1"
    );
}

#[test]
fn commit_drag_records_stack_reorders_only_when_index_changed() {
    let pipeline = pipeline();
    let workspace = board();
    let operation = DragOperation::new(DragEntity::stack("s1"), DragEntity::stack("s2"));
    let start = DragStart::capture(workspace.stacks(), &DragEntity::stack("s1"));

    let unmoved = pipeline.apply(
        &workspace,
        Command::CommitDrag {
            operation: operation.clone(),
            start: start.clone(),
        },
    );
    assert!(unmoved.event.is_none());

    let previewed = pipeline
        .apply(&workspace, Command::PreviewDrag(operation.clone()))
        .workspace;
    let committed = pipeline.apply(&previewed, Command::CommitDrag { operation, start });
    let event = committed.event.unwrap();
    assert_eq!(event.action_type, HistoryActionType::MoveStack);
    assert_eq!(event.details, "Reordered stack \"Todo\" from index 0 to 1");
}

#[test]
fn commit_drag_without_target_or_start_records_nothing() {
    let pipeline = pipeline();
    let workspace = board();
    let start = DragStart::capture(workspace.stacks(), &DragEntity::task("t1"));

    let no_target = pipeline.apply(
        &workspace,
        Command::CommitDrag {
            operation: DragOperation::without_target(DragEntity::task("t1")),
            start,
        },
    );
    assert!(no_target.event.is_none());

    let no_start = pipeline.apply(
        &workspace,
        Command::CommitDrag {
            operation: DragOperation::new(DragEntity::task("t1"), DragEntity::stack("s2")),
            start: None,
        },
    );
    assert!(no_start.event.is_none());
}

#[test]
fn history_entries_use_generated_ids_and_clock() {
    let pipeline = pipeline();
    let transition = pipeline.apply(
        &board(),
        Command::ToggleTaskStatus {
            task_id: "t1".to_string(),
        },
    );
    let event = transition.event.unwrap();
    assert_eq!(event.id, "id-1");
    assert_eq!(event.timestamp, 1_000);
}
