//! Whole-collection storage for the four workspace collections.
//!
//! # Responsibility
//! - Load each collection in stored order.
//! - Replace a collection atomically: clear, then bulk insert.
//!
//! # Invariants
//! - `replace_collection` runs in one IMMEDIATE transaction per collection.
//! - Row `position` equals the record index in the written slice.
//! - Loads return rows ordered by `position`.

use crate::model::{ArchivedTask, HistoryActionType, HistoryItem, Stack, Task, TaskId};
use crate::repo::{ensure_connection_ready, StoreError, StoreResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// A model value stored as one row of a collection table.
pub trait CollectionRecord: Sized {
    const TABLE: &'static str;
    /// Column list read by `from_row`, in index order.
    const SELECT_SQL: &'static str;

    fn insert(&self, conn: &Connection, position: i64) -> StoreResult<()>;
    fn from_row(row: &Row<'_>) -> StoreResult<Self>;
}

/// Every persisted collection, as loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSnapshot {
    pub tasks: Vec<Task>,
    pub stacks: Vec<Stack>,
    pub history: Vec<HistoryItem>,
    pub archived_tasks: Vec<ArchivedTask>,
}

impl WorkspaceSnapshot {
    /// True when no collection holds a record.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
            && self.stacks.is_empty()
            && self.history.is_empty()
            && self.archived_tasks.is_empty()
    }
}

/// Repository interface over the collection tables.
pub trait WorkspaceRepository {
    fn load_collection<T: CollectionRecord>(&self) -> StoreResult<Vec<T>>;
    fn replace_collection<T: CollectionRecord>(&self, records: &[T]) -> StoreResult<()>;
    fn clear_collection<T: CollectionRecord>(&self) -> StoreResult<()>;

    fn load_snapshot(&self) -> StoreResult<WorkspaceSnapshot> {
        Ok(WorkspaceSnapshot {
            tasks: self.load_collection()?,
            stacks: self.load_collection()?,
            history: self.load_collection()?,
            archived_tasks: self.load_collection()?,
        })
    }
}

/// SQLite-backed collection repository.
pub struct SqliteWorkspaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkspaceRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl WorkspaceRepository for SqliteWorkspaceRepository<'_> {
    fn load_collection<T: CollectionRecord>(&self) -> StoreResult<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY position ASC;",
            T::SELECT_SQL,
            T::TABLE
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(T::from_row(row)?);
        }
        Ok(records)
    }

    fn replace_collection<T: CollectionRecord>(&self, records: &[T]) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(&format!("DELETE FROM {};", T::TABLE), [])?;
        for (position, record) in records.iter().enumerate() {
            record.insert(&tx, position as i64)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_collection<T: CollectionRecord>(&self) -> StoreResult<()> {
        self.conn.execute(&format!("DELETE FROM {};", T::TABLE), [])?;
        Ok(())
    }
}

impl CollectionRecord for Task {
    const TABLE: &'static str = "tasks";
    const SELECT_SQL: &'static str = "id, title, description, is_finished, created_at, due_date";

    fn insert(&self, conn: &Connection, position: i64) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO tasks (
                id,
                position,
                title,
                description,
                is_finished,
                created_at,
                due_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                self.id.as_str(),
                position,
                self.title.as_str(),
                self.description.as_str(),
                bool_to_int(self.is_finished),
                self.created_at,
                self.due_date,
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            is_finished: int_to_bool(row.get(3)?, "tasks.is_finished")?,
            created_at: row.get(4)?,
            due_date: row.get(5)?,
        })
    }
}

impl CollectionRecord for Stack {
    const TABLE: &'static str = "stacks";
    const SELECT_SQL: &'static str = "id, title, task_ids";

    fn insert(&self, conn: &Connection, position: i64) -> StoreResult<()> {
        let task_ids = serde_json::to_string(&self.task_ids)?;
        conn.execute(
            "INSERT INTO stacks (id, position, title, task_ids) VALUES (?1, ?2, ?3, ?4);",
            params![self.id.as_str(), position, self.title.as_str(), task_ids],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let id: String = row.get(0)?;
        let raw_task_ids: String = row.get(2)?;
        let task_ids: Vec<TaskId> = serde_json::from_str(&raw_task_ids).map_err(|err| {
            StoreError::InvalidData(format!("invalid task_ids for stack `{id}`: {err}"))
        })?;
        Ok(Self {
            id,
            title: row.get(1)?,
            task_ids,
        })
    }
}

impl CollectionRecord for HistoryItem {
    const TABLE: &'static str = "history";
    const SELECT_SQL: &'static str = "id, timestamp, action_type, details";

    fn insert(&self, conn: &Connection, position: i64) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO history (
                id,
                position,
                timestamp,
                action_type,
                details
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                self.id.as_str(),
                position,
                self.timestamp,
                self.action_type.as_str(),
                self.details.as_str(),
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let raw_action: String = row.get(2)?;
        let action_type = HistoryActionType::parse(&raw_action).ok_or_else(|| {
            StoreError::InvalidData(format!("unknown history action_type `{raw_action}`"))
        })?;
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            action_type,
            details: row.get(3)?,
        })
    }
}

impl CollectionRecord for ArchivedTask {
    const TABLE: &'static str = "archived_tasks";
    const SELECT_SQL: &'static str = "id, title, description, is_finished, created_at, due_date, \
         original_stack_id, archived_at";

    fn insert(&self, conn: &Connection, position: i64) -> StoreResult<()> {
        let task = &self.task;
        conn.execute(
            "INSERT INTO archived_tasks (
                id,
                position,
                title,
                description,
                is_finished,
                created_at,
                due_date,
                original_stack_id,
                archived_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.as_str(),
                position,
                task.title.as_str(),
                task.description.as_str(),
                bool_to_int(task.is_finished),
                task.created_at,
                task.due_date,
                self.original_stack_id.as_str(),
                self.archived_at,
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            task: Task {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                is_finished: int_to_bool(row.get(3)?, "archived_tasks.is_finished")?,
                created_at: row.get(4)?,
                due_date: row.get(5)?,
            },
            original_stack_id: row.get(6)?,
            archived_at: row.get(7)?,
        })
    }
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn int_to_bool(value: i64, column: &'static str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}
