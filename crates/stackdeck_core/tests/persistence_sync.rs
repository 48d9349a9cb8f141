use stackdeck_core::db::open_db;
use stackdeck_core::repo::{SqliteWorkspaceRepository, WorkspaceRepository, WorkspaceSnapshot};
use stackdeck_core::{
    seed_workspace, AssetValue, Command, DisplayPreferences, MutationPipeline, PersistenceSync,
    SequentialIds, SteppingClock, Theme, Workspace,
};
use std::path::Path;

fn stored_snapshot(path: &Path) -> WorkspaceSnapshot {
    let conn = open_db(path).unwrap();
    let repo = SqliteWorkspaceRepository::try_new(&conn).unwrap();
    repo.load_snapshot().unwrap()
}

fn snapshot_of(workspace: &Workspace) -> WorkspaceSnapshot {
    WorkspaceSnapshot {
        tasks: workspace.task_list(),
        stacks: workspace.stacks().to_vec(),
        history: workspace.history().to_vec(),
        archived_tasks: workspace.archived_tasks().to_vec(),
    }
}

fn pipeline() -> MutationPipeline<SteppingClock, SequentialIds> {
    MutationPipeline::with_sources(SteppingClock::new(10_000, 1), SequentialIds::new("p"))
}

#[test]
fn first_run_seeds_and_persists_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let mut sync = PersistenceSync::open(&path).unwrap();
    let loaded = sync.load();
    sync.flush().unwrap();

    assert!(loaded.first_run);
    assert_eq!(loaded.workspace, seed_workspace());
    assert_eq!(loaded.background_image, None);
    assert_eq!(loaded.preferences, DisplayPreferences::default());
    assert_eq!(stored_snapshot(&path), snapshot_of(&seed_workspace()));
}

#[test]
fn later_loads_hydrate_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let pipeline = pipeline();

    let expected = {
        let mut sync = PersistenceSync::open(&path).unwrap();
        let mut workspace = sync.load().workspace;
        for command in [
            Command::ArchiveTask {
                task_id: "b".to_string(),
            },
            Command::AddStack {
                title: "Review".to_string(),
            },
            Command::ToggleTaskStatus {
                task_id: "a".to_string(),
            },
        ] {
            workspace = pipeline.apply(&workspace, command).workspace;
            sync.settle(&workspace);
        }
        sync.flush().unwrap();
        workspace
    };

    let mut sync = PersistenceSync::open(&path).unwrap();
    let loaded = sync.load();
    assert!(!loaded.first_run);
    assert_eq!(loaded.workspace, expected);
    assert_eq!(loaded.workspace.history().len(), 3);
    assert_eq!(loaded.workspace.archived_tasks().len(), 1);
}

#[test]
fn settle_writes_only_changed_collections() {
    let mut sync = PersistenceSync::open_in_memory().unwrap();
    let workspace = sync.load().workspace;

    assert_eq!(sync.settle(&workspace), 0);

    let renamed = pipeline()
        .apply(
            &workspace,
            Command::RenameStack {
                stack_id: "s1".to_string(),
                title: "Today".to_string(),
            },
        )
        .workspace;
    // Stacks and History changed, Tasks and ArchivedTasks did not.
    assert_eq!(sync.settle(&renamed), 2);
    assert_eq!(sync.settle(&renamed), 0);
}

#[test]
fn consecutive_writes_apply_in_issue_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let pipeline = pipeline();

    let mut sync = PersistenceSync::open(&path).unwrap();
    let mut workspace = sync.load().workspace;
    for index in 0..20 {
        workspace = pipeline
            .apply(
                &workspace,
                Command::RenameStack {
                    stack_id: "s2".to_string(),
                    title: format!("Stagnant {index}"),
                },
            )
            .workspace;
        sync.settle(&workspace);
    }
    sync.flush().unwrap();

    let stored = stored_snapshot(&path);
    assert_eq!(stored.stacks[1].title, "Stagnant 19");
    assert_eq!(stored.history.len(), 20);
}

#[test]
fn unreadable_store_falls_back_to_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO stacks (id, position, title, task_ids) VALUES ('x', 0, 'X', '{broken');",
            [],
        )
        .unwrap();
    }

    let mut sync = PersistenceSync::open(&path).unwrap();
    let loaded = sync.load();
    sync.flush().unwrap();

    assert!(loaded.first_run);
    assert_eq!(loaded.workspace, seed_workspace());
    assert_eq!(stored_snapshot(&path).stacks, seed_workspace().stacks().to_vec());
}

#[test]
fn background_image_and_preferences_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let image = AssetValue::Binary(vec![0x89, 0x50, 0x4e, 0x47]);
    let preferences = DisplayPreferences {
        background_darken: 40,
        show_hero: false,
        theme: Theme::Light,
        ..DisplayPreferences::default()
    };

    {
        let mut sync = PersistenceSync::open(&path).unwrap();
        sync.load();
        sync.save_background_image(Some(&image));
        sync.save_preferences(&preferences);
        sync.flush().unwrap();
    }
    {
        let mut sync = PersistenceSync::open(&path).unwrap();
        let loaded = sync.load();
        assert_eq!(loaded.background_image, Some(image));
        assert_eq!(loaded.preferences, preferences);

        sync.save_background_image(None);
        sync.flush().unwrap();
    }

    let mut sync = PersistenceSync::open(&path).unwrap();
    assert_eq!(sync.load().background_image, None);
}

#[test]
fn wipe_removes_the_store_file_and_skips_later_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let mut sync = PersistenceSync::open(&path).unwrap();
    let workspace = sync.load().workspace;
    sync.flush().unwrap();
    assert!(path.exists());

    sync.wipe().unwrap();
    assert!(!path.exists());

    let changed = pipeline()
        .apply(
            &workspace,
            Command::AddStack {
                title: "After wipe".to_string(),
            },
        )
        .workspace;
    sync.settle(&changed);
    sync.save_background_image(Some(&AssetValue::DataUrl("data:,".to_string())));
    sync.flush().unwrap();
    assert!(!path.exists());

    // A second wipe is harmless.
    sync.wipe().unwrap();
}

#[test]
fn reopening_after_wipe_seeds_again() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    {
        let mut sync = PersistenceSync::open(&path).unwrap();
        let workspace = sync.load().workspace;
        let changed = pipeline()
            .apply(
                &workspace,
                Command::DeleteTask {
                    task_id: "a".to_string(),
                },
            )
            .workspace;
        sync.settle(&changed);
        sync.wipe().unwrap();
    }

    let mut sync = PersistenceSync::open(&path).unwrap();
    let loaded = sync.load();
    assert!(loaded.first_run);
    assert_eq!(loaded.workspace, seed_workspace());
}
