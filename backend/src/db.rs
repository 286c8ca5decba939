//! SQLite-backed persistence for tasks.
//!
//! A [`Database`] is opened once at startup and shared by every request.
//! Each request works inside one [`Session`], a transaction that commits
//! when the work succeeds and rolls back otherwise.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use shared::{Task, TaskCreate, TaskUpdate};
use thiserror::Error;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(200) NOT NULL,
    description VARCHAR(1000),
    completed BOOLEAN NOT NULL DEFAULT 0
);
";

const TASK_COLUMNS: &str = "id, title, description, completed";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Where the task table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

/// Process-wide handle to the store. Cloning shares the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the store and creates the `tasks` table if it is missing.
    pub fn open(location: &DatabaseLocation) -> Result<Self, StorageError> {
        let conn = match location {
            DatabaseLocation::Memory => Connection::open_in_memory()?,
            DatabaseLocation::File(path) => Connection::open(path)?,
        };
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;

        tracing::debug!(?location, "task table ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::open(&DatabaseLocation::Memory)
    }

    /// Runs `work` inside a transaction.
    ///
    /// Commits if `work` returns `Ok`. On `Err` or a panic the transaction is
    /// dropped, which rolls it back. The connection is released either way.
    pub fn with_session<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Session<'_>) -> Result<T, E>,
        E: From<StorageError>,
    {
        // A panic mid-session has already rolled its transaction back, so the
        // connection behind a poisoned lock is still consistent.
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction().map_err(StorageError::from)?;
        let session = Session { tx };

        let value = work(&session)?;
        session.tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }

    /// [`Database::with_session`] on the blocking pool, for use from handlers.
    pub async fn run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Session<'_>) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StorageError> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_session(work))
            .await
            .map_err(|error| E::from(StorageError::from(error)))?
    }
}

/// One unit of work against the store. Only lives inside
/// [`Database::with_session`].
pub struct Session<'conn> {
    tx: Transaction<'conn>,
}

impl Session<'_> {
    pub fn insert(&self, input: TaskCreate) -> Result<Task, StorageError> {
        self.tx.execute(
            "INSERT INTO tasks (title, description, completed) VALUES (?1, ?2, ?3)",
            params![input.title(), input.description(), input.completed()],
        )?;
        let id = self.tx.last_insert_rowid();
        Ok(Task::from_create(id, input))
    }

    /// `None` when no task has this id.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Task>, StorageError> {
        let task = self
            .tx
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    pub fn list_all(&self) -> Result<Vec<Task>, StorageError> {
        let mut stmt = self
            .tx
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Tasks after skipping `offset`, in id order, at most `limit` of them
    /// when one is given.
    pub fn list(&self, offset: u32, limit: Option<u32>) -> Result<Vec<Task>, StorageError> {
        // SQLite treats a negative LIMIT as no limit.
        let limit = limit.map_or(-1, i64::from);
        let mut stmt = self.tx.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let tasks = stmt
            .query_map(params![limit, offset], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Merges `changes` into the stored task. `None` when no task has this id.
    pub fn update(&self, id: i64, changes: TaskUpdate) -> Result<Option<Task>, StorageError> {
        let Some(mut task) = self.get_by_id(id)? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(task));
        }

        changes.apply_to(&mut task);
        self.tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4",
            params![task.title, task.description, task.completed, task.id],
        )?;
        Ok(Some(task))
    }

    /// Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let removed = self.tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
    })
}
