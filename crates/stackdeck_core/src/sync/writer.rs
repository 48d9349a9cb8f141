//! Background store writer.
//!
//! # Responsibility
//! - Own the SQLite connection on a dedicated thread.
//! - Apply queued commands strictly in submission order.
//!
//! # Invariants
//! - One FIFO queue: a later write never overtakes an earlier one.
//! - After a wipe the connection is gone; writes are logged and skipped.
//! - Dropping the writer drains the queue and joins the thread.

use super::mirror::CollectionWrite;
use super::{SyncError, SyncResult};
use crate::config::DisplayPreferences;
use crate::model::AssetValue;
use crate::repo::{
    clear_all_tables, AssetRepository, PreferenceRepository, SqliteAssetRepository,
    SqlitePreferenceRepository, SqliteWorkspaceRepository, StoreError, StoreResult,
    WorkspaceRepository, WorkspaceSnapshot,
};
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Instant;

const WRITER_THREAD_NAME: &str = "stackdeck-store";

/// Everything read from the store at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredState {
    pub snapshot: WorkspaceSnapshot,
    pub assets: Vec<(String, AssetValue)>,
    pub preferences: Option<DisplayPreferences>,
}

pub(crate) enum StoreCommand {
    Load {
        asset_keys: Vec<String>,
        reply: mpsc::Sender<SyncResult<StoredState>>,
    },
    Replace(CollectionWrite),
    PutAsset {
        key: String,
        value: AssetValue,
    },
    DeleteAsset {
        key: String,
    },
    SavePreferences(DisplayPreferences),
    Flush {
        reply: mpsc::Sender<()>,
    },
    Wipe {
        reply: mpsc::Sender<SyncResult<()>>,
    },
}

impl StoreCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Replace(_) => "replace",
            Self::PutAsset { .. } => "put_asset",
            Self::DeleteAsset { .. } => "delete_asset",
            Self::SavePreferences(_) => "save_preferences",
            Self::Flush { .. } => "flush",
            Self::Wipe { .. } => "wipe",
        }
    }
}

pub(crate) struct StoreWriter {
    tx: Option<mpsc::Sender<StoreCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWriter {
    /// Moves `conn` onto a new writer thread. `db_path` is removed on wipe.
    pub(crate) fn spawn(conn: Connection, db_path: Option<PathBuf>) -> SyncResult<Self> {
        let (tx, rx) = mpsc::channel::<StoreCommand>();
        let worker = Worker {
            conn: Some(conn),
            db_path,
        };
        let handle = std::thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || worker.run(rx))
            .map_err(SyncError::WriterSpawn)?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queues `command` without waiting for it to apply.
    pub(crate) fn send(&self, command: StoreCommand) -> SyncResult<()> {
        let tx = self.tx.as_ref().ok_or(SyncError::WriterUnavailable)?;
        tx.send(command).map_err(|_| SyncError::WriterUnavailable)
    }

    /// Queues a command carrying a reply channel and blocks for the answer.
    pub(crate) fn request<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<T>) -> StoreCommand,
    ) -> SyncResult<T> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(build(reply_tx))?;
        reply_rx.recv().map_err(|_| SyncError::WriterUnavailable)
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=store_writer_join module=sync status=error error_code=writer_panicked");
            }
        }
    }
}

struct Worker {
    conn: Option<Connection>,
    db_path: Option<PathBuf>,
}

impl Worker {
    fn run(mut self, rx: mpsc::Receiver<StoreCommand>) {
        while let Ok(command) = rx.recv() {
            self.handle(command);
        }
    }

    fn handle(&mut self, command: StoreCommand) {
        if self.conn.is_none() {
            self.handle_without_connection(command);
            return;
        }
        match command {
            StoreCommand::Load { asset_keys, reply } => {
                let _ = reply.send(self.load(&asset_keys));
            }
            StoreCommand::Replace(write) => self.replace(write),
            StoreCommand::PutAsset { key, value } => self.put_asset(&key, &value),
            StoreCommand::DeleteAsset { key } => self.delete_asset(&key),
            StoreCommand::SavePreferences(preferences) => self.save_preferences(&preferences),
            StoreCommand::Flush { reply } => {
                let _ = reply.send(());
            }
            StoreCommand::Wipe { reply } => {
                let _ = reply.send(self.wipe());
            }
        }
    }

    fn handle_without_connection(&mut self, command: StoreCommand) {
        match command {
            StoreCommand::Load { reply, .. } => {
                let _ = reply.send(Err(SyncError::Wiped));
            }
            StoreCommand::Flush { reply } => {
                let _ = reply.send(());
            }
            StoreCommand::Wipe { reply } => {
                let _ = reply.send(Ok(()));
            }
            other => {
                warn!(
                    "event=store_command module=sync status=skip command={} reason=store_wiped",
                    other.name()
                );
            }
        }
    }

    fn connection(&self) -> SyncResult<&Connection> {
        self.conn.as_ref().ok_or(SyncError::Wiped)
    }

    fn load(&self, asset_keys: &[String]) -> SyncResult<StoredState> {
        let conn = self.connection()?;
        let snapshot = SqliteWorkspaceRepository::try_new(conn)?.load_snapshot()?;
        let asset_repo = SqliteAssetRepository::try_new(conn)?;
        let mut assets = Vec::new();
        for key in asset_keys {
            if let Some(value) = asset_repo.get_asset(key)? {
                assets.push((key.clone(), value));
            }
        }
        let preferences = SqlitePreferenceRepository::try_new(conn)?.load_preferences()?;
        Ok(StoredState {
            snapshot,
            assets,
            preferences,
        })
    }

    fn replace(&self, write: CollectionWrite) {
        let started_at = Instant::now();
        let collection = write.collection();
        let record_count = write.len();
        let result = self.connection().and_then(|conn| {
            let repo = SqliteWorkspaceRepository::try_new(conn)?;
            let applied: StoreResult<()> = match &write {
                CollectionWrite::Tasks(records) => repo.replace_collection(records.as_slice()),
                CollectionWrite::Stacks(records) => repo.replace_collection(records.as_slice()),
                CollectionWrite::History(records) => repo.replace_collection(records.as_slice()),
                CollectionWrite::ArchivedTasks(records) => {
                    repo.replace_collection(records.as_slice())
                }
            };
            applied.map_err(SyncError::from)
        });
        match result {
            Ok(()) => info!(
                "event=collection_save module=sync status=ok collection={collection} records={record_count} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=collection_save module=sync status=error collection={collection} records={record_count} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
    }

    fn put_asset(&self, key: &str, value: &AssetValue) {
        let result = self
            .connection()
            .and_then(|conn| Ok(SqliteAssetRepository::try_new(conn)?.put_asset(key, value)?));
        match result {
            Ok(()) => info!(
                "event=asset_save module=sync status=ok key={key} bytes={}",
                value.len()
            ),
            Err(err) => error!("event=asset_save module=sync status=error key={key} error={err}"),
        }
    }

    fn delete_asset(&self, key: &str) {
        let result = self
            .connection()
            .and_then(|conn| Ok(SqliteAssetRepository::try_new(conn)?.delete_asset(key)?));
        match result {
            Ok(removed) => info!(
                "event=asset_delete module=sync status=ok key={key} removed={removed}"
            ),
            Err(err) => error!("event=asset_delete module=sync status=error key={key} error={err}"),
        }
    }

    fn save_preferences(&self, preferences: &DisplayPreferences) {
        let result = self.connection().and_then(|conn| {
            Ok(SqlitePreferenceRepository::try_new(conn)?.save_preferences(preferences)?)
        });
        match result {
            Ok(()) => info!("event=preferences_save module=sync status=ok"),
            Err(err) => error!("event=preferences_save module=sync status=error error={err}"),
        }
    }

    fn wipe(&mut self) -> SyncResult<()> {
        let started_at = Instant::now();
        info!("event=store_wipe module=sync status=start");
        let result = self.wipe_inner();
        match &result {
            Ok(()) => info!(
                "event=store_wipe module=sync status=ok file_removed={} duration_ms={}",
                self.db_path.is_some(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_wipe module=sync status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn wipe_inner(&mut self) -> SyncResult<()> {
        clear_all_tables(self.connection()?)?;
        if let Some(conn) = self.conn.take() {
            if let Err((conn, err)) = conn.close() {
                self.conn = Some(conn);
                return Err(SyncError::from(StoreError::from(err)));
            }
        }
        if let Some(path) = &self.db_path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(SyncError::Io(err)),
            }
        }
        Ok(())
    }
}
