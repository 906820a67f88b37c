//! SQLite-backed task storage implementation
//!
//! Timestamps are stored as RFC 3339 text. Soft-deleted rows keep their
//! data and are filtered out by every query.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::model::{NewTask, Task, TaskId, TaskPatch};
use super::repository::TaskRepository;
use crate::{Error, Result};

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
)";
const INDEX_DELETED_AT: &str =
    "CREATE INDEX IF NOT EXISTS idx_tasks_deleted_at ON tasks (deleted_at)";

const SELECT_LIVE: &str = "SELECT id, name, completed, created_at, updated_at, deleted_at \
     FROM tasks WHERE deleted_at IS NULL";
const INSERT_TASK: &str =
    "INSERT INTO tasks (name, completed, created_at, updated_at) VALUES (?, ?, ?, ?)";
const UPDATE_TASK: &str = "UPDATE tasks SET name = ?, completed = ?, updated_at = ? \
     WHERE id = ? AND deleted_at IS NULL";
const SOFT_DELETE_TASK: &str =
    "UPDATE tasks SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL";

/// Task store on top of an SQLite connection pool
#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Connect to the database at `url`, creating the file if needed
    ///
    /// In-memory databases are pinned to a single connection that is never
    /// recycled, since every SQLite memory connection is its own database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        if max_connections == 0 {
            return Err(Error::InvalidInput(
                "max_connections must be at least 1".to_string(),
            ));
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool_options = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        info!("Connected to task database at {}", url);
        Ok(Self { pool })
    }

    /// Fresh private in-memory database with the schema applied
    pub async fn in_memory() -> Result<Self> {
        let store = Self::connect("sqlite::memory:", 1).await?;
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tasks table and its index if they do not exist
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(SCHEMA_TASKS).execute(&self.pool).await?;
        sqlx::query(INDEX_DELETED_AT).execute(&self.pool).await?;
        debug!("Task schema is up to date");
        Ok(())
    }

    async fn fetch_live(&self, id: TaskId) -> Result<Task> {
        let row = sqlx::query(&format!("{} AND id = ?", SELECT_LIVE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => task_from_row(&row),
            None => Err(Error::TaskNotFound(id)),
        }
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("invalid timestamp '{}': {}", raw, e)))
}

fn task_from_row(row: &SqliteRow) -> Result<Task> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let deleted_at: Option<String> = row.try_get("deleted_at")?;

    Ok(Task {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        completed: row.try_get("completed")?,
        created_at: decode_timestamp(&created_at)?,
        updated_at: decode_timestamp(&updated_at)?,
        deleted_at: deleted_at.as_deref().map(decode_timestamp).transpose()?,
    })
}

fn tasks_from_rows(rows: &[SqliteRow]) -> Result<Vec<Task>> {
    rows.iter().map(task_from_row).collect()
}

#[async_trait]
impl TaskRepository for SqliteTaskStore {
    async fn list(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_LIVE))
            .fetch_all(&self.pool)
            .await?;
        tasks_from_rows(&rows)
    }

    async fn get(&self, id: TaskId) -> Result<Task> {
        self.fetch_live(id).await
    }

    async fn create(&self, task: NewTask) -> Result<Task> {
        let now = Utc::now();
        let stamp = encode_timestamp(now);

        let result = sqlx::query(INSERT_TASK)
            .bind(&task.name)
            .bind(task.completed)
            .bind(&stamp)
            .bind(&stamp)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!("Created task {}", id);

        // Re-read so the returned timestamps match the stored precision
        self.fetch_live(id).await
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        let result = sqlx::query(SOFT_DELETE_TASK)
            .bind(encode_timestamp(Utc::now()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(id));
        }
        debug!("Soft-deleted task {}", id);
        Ok(())
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let result = sqlx::query(UPDATE_TASK)
            .bind(&patch.name)
            .bind(patch.completed)
            .bind(encode_timestamp(Utc::now()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(id));
        }
        self.fetch_live(id).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Task>> {
        // instr() is a case-sensitive literal match, unlike LIKE in SQLite
        let sql = format!("{} AND instr(name, ?) > 0 ORDER BY id", SELECT_LIVE);
        let rows = sqlx::query(&sql)
            .bind(query)
            .fetch_all(&self.pool)
            .await?;
        tasks_from_rows(&rows)
    }
}
