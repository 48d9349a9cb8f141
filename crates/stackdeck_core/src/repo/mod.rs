//! Persistence repositories over the migrated SQLite schema.
//!
//! # Responsibility
//! - Map workspace collections, assets and preferences to SQL rows.
//! - Keep SQL details behind repository traits.
//!
//! # Invariants
//! - Repositories only accept connections migrated to `latest_version()`.
//! - Read paths reject malformed rows instead of masking them.
//!
//! # See also
//! - `crate::sync` for the asynchronous writer built on these repositories.

pub mod asset_repo;
pub mod collection_repo;
pub mod preference_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use asset_repo::{AssetRepository, SqliteAssetRepository};
pub use collection_repo::{
    CollectionRecord, SqliteWorkspaceRepository, WorkspaceRepository, WorkspaceSnapshot,
};
pub use preference_repo::{PreferenceRepository, SqlitePreferenceRepository};

const WIPED_TABLES: [&str; 6] = [
    "tasks",
    "stacks",
    "history",
    "archived_tasks",
    "assets",
    "preferences",
];

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from repository reads and writes.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted row cannot be converted to a valid model value.
    InvalidData(String),
    /// JSON column could not be encoded or decoded.
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Serialization(err) => write!(f, "json column error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

pub(crate) fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = crate::db::migrations::current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Deletes every stored record: collections, assets and preferences.
pub fn clear_all_tables(conn: &Connection) -> StoreResult<()> {
    ensure_connection_ready(conn)?;
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    for table in WIPED_TABLES {
        tx.execute(&format!("DELETE FROM {table};"), [])?;
    }
    tx.commit()?;
    Ok(())
}
