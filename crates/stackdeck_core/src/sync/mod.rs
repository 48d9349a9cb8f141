//! Persistence synchronization between the live workspace and SQLite.
//!
//! # Responsibility
//! - Load all collections, the background asset and preferences at startup.
//! - Seed a fixed dataset on first run and persist it immediately.
//! - Mirror later collection changes as asynchronous whole-collection writes.
//! - Wipe the store for a full reset.
//!
//! # Invariants
//! - In-memory state is authoritative. Persistence never drives it after load.
//! - Writes are fire-and-forget and applied in submission order.
//! - Load never fails: store errors are logged and treated as first run.

mod mirror;
mod writer;

pub use mirror::{CollectionMirror, CollectionWrite};
pub use writer::StoredState;

use crate::config::DisplayPreferences;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::{AssetValue, BACKGROUND_IMAGE_KEY};
use crate::repo::StoreError;
use crate::workspace::{seed_workspace, Workspace};
use log::{error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use writer::{StoreCommand, StoreWriter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Errors from the synchronization layer.
#[derive(Debug)]
pub enum SyncError {
    /// Repository read or write failed.
    Store(StoreError),
    /// Writer thread is gone or its queue is closed.
    WriterUnavailable,
    /// Writer thread could not be started.
    WriterSpawn(std::io::Error),
    /// Store file could not be removed.
    Io(std::io::Error),
    /// Store was wiped earlier in this process.
    Wiped,
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::WriterUnavailable => write!(f, "store writer is not running"),
            Self::WriterSpawn(err) => write!(f, "failed to spawn store writer: {err}"),
            Self::Io(err) => write!(f, "store file error: {err}"),
            Self::Wiped => write!(f, "store was wiped; restart to reseed"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::WriterUnavailable => None,
            Self::WriterSpawn(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Wiped => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<DbError> for SyncError {
    fn from(value: DbError) -> Self {
        Self::Store(StoreError::Db(value))
    }
}

/// Result of the startup load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedWorkspace {
    pub workspace: Workspace,
    pub background_image: Option<AssetValue>,
    pub preferences: DisplayPreferences,
    /// True when the seed dataset replaced an empty or unreadable store.
    pub first_run: bool,
}

/// Owner of the store writer and the per-collection mirror.
pub struct PersistenceSync {
    writer: StoreWriter,
    mirror: CollectionMirror,
}

impl PersistenceSync {
    /// Opens or creates the store file at `path`.
    pub fn open(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path)?;
        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Private in-memory store, mainly for tests.
    pub fn open_in_memory() -> SyncResult<Self> {
        Self::from_connection(open_db_in_memory()?, None)
    }

    /// Wraps an already migrated connection. `db_path` is removed on wipe.
    pub fn from_connection(conn: Connection, db_path: Option<PathBuf>) -> SyncResult<Self> {
        Ok(Self {
            writer: StoreWriter::spawn(conn, db_path)?,
            mirror: CollectionMirror::new(),
        })
    }

    /// Reads the store, seeding it on first run, and arms the mirror.
    ///
    /// The first settle runs here, so Tasks, History and ArchivedTasks are
    /// written back once while Stacks is skipped.
    pub fn load(&mut self) -> LoadedWorkspace {
        let started_at = Instant::now();
        info!("event=workspace_load module=sync status=start");

        let stored = self
            .writer
            .request(|reply| StoreCommand::Load {
                asset_keys: vec![BACKGROUND_IMAGE_KEY.to_string()],
                reply,
            })
            .and_then(|result| result);
        let stored = match stored {
            Ok(stored) => stored,
            Err(err) => {
                error!(
                    "event=workspace_load module=sync status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                StoredState::default()
            }
        };

        let StoredState {
            snapshot,
            assets,
            preferences,
        } = stored;
        let first_run = snapshot.tasks.is_empty() && snapshot.stacks.is_empty();
        let workspace = if first_run {
            let seeded = seed_workspace();
            self.enqueue(StoreCommand::Replace(CollectionWrite::Tasks(seeded.task_list())));
            self.enqueue(StoreCommand::Replace(CollectionWrite::Stacks(
                seeded.stacks().to_vec(),
            )));
            seeded
        } else {
            Workspace::from_parts(
                snapshot.tasks,
                snapshot.stacks,
                snapshot.history,
                snapshot.archived_tasks,
            )
        };
        let background_image = assets
            .into_iter()
            .find(|(key, _)| key == BACKGROUND_IMAGE_KEY)
            .map(|(_, value)| value);

        info!(
            "event=workspace_load module=sync status=ok first_run={first_run} tasks={} stacks={} history={} archived={} duration_ms={}",
            workspace.tasks().len(),
            workspace.stacks().len(),
            workspace.history().len(),
            workspace.archived_tasks().len(),
            started_at.elapsed().as_millis()
        );

        self.mirror = CollectionMirror::after_load();
        self.settle(&workspace);

        LoadedWorkspace {
            workspace,
            background_image,
            preferences: preferences.unwrap_or_default(),
            first_run,
        }
    }

    /// Queues a whole-collection replace for every collection that changed
    /// since the last settle. Returns the number of queued writes.
    pub fn settle(&mut self, workspace: &Workspace) -> usize {
        let writes = self.mirror.settle(workspace);
        let queued = writes.len();
        for write in writes {
            self.enqueue(StoreCommand::Replace(write));
        }
        queued
    }

    /// Overwrites the background asset, or deletes it for `None`.
    pub fn save_background_image(&self, value: Option<&AssetValue>) {
        let key = BACKGROUND_IMAGE_KEY.to_string();
        match value {
            Some(value) => self.enqueue(StoreCommand::PutAsset {
                key,
                value: value.clone(),
            }),
            None => self.enqueue(StoreCommand::DeleteAsset { key }),
        }
    }

    pub fn save_preferences(&self, preferences: &DisplayPreferences) {
        self.enqueue(StoreCommand::SavePreferences(preferences.clone()));
    }

    /// Blocks until every previously queued write has been applied.
    pub fn flush(&self) -> SyncResult<()> {
        self.writer.request(|reply| StoreCommand::Flush { reply })
    }

    /// Clears every table, closes the connection and removes the store file.
    ///
    /// Callers restart the process afterwards so seeding runs again.
    pub fn wipe(&mut self) -> SyncResult<()> {
        let result = self
            .writer
            .request(|reply| StoreCommand::Wipe { reply })
            .and_then(|result| result);
        self.mirror = CollectionMirror::new();
        result
    }

    fn enqueue(&self, command: StoreCommand) {
        if let Err(err) = self.writer.send(command) {
            warn!("event=store_enqueue module=sync status=error error={err}");
        }
    }
}
