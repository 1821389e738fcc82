//! libsql-backed Task Store
//!
//! Database connection, migrations, and the TaskStore implementation.
//! Every update writes the prior row into task_versions first, so edits
//! stay recoverable.

use async_trait::async_trait;
use libsql::{Builder, Connection};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, Task};

use super::row::{
    encode_canvas_position, encode_coords, encode_datetime, encode_tags, row_to_task, TASK_COLUMNS,
};
use super::traits::{TaskStore, TaskVersion};

/// RFC 3339 timestamp, assigned by the store
const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ','now')";

/// libsql implementation of the task store
pub struct LibsqlTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl LibsqlTaskStore {
    /// Open (or create) a database at `path` and run migrations.
    /// `:memory:` gives an isolated in-memory store for tests.
    pub async fn open(path: &str) -> DomainResult<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DomainError::Store(format!("failed to build db: {}", e)))?;
        let conn = db
            .connect()
            .map_err(|e| DomainError::Store(format!("failed to connect: {}", e)))?;

        run_migrations(&conn).await?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Fetch a single row by id
    pub async fn find_by_id(&self, id: &str) -> DomainResult<Option<Task>> {
        let conn = self.conn.lock().await;
        fetch_task(&conn, id).await
    }
}

async fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            due_date TEXT,
            estimated_time INTEGER,
            tags TEXT NOT NULL DEFAULT '[]',
            is_completed INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT,
            quadrant_coords TEXT NOT NULL DEFAULT '{{\"x\":-1,\"y\":-1}}',
            matrix_position TEXT,
            matrix_z_index INTEGER NOT NULL DEFAULT 0,
            position INTEGER,
            the_one INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT ({now}),
            updated_at TEXT NOT NULL DEFAULT ({now})
        );
        CREATE TABLE IF NOT EXISTS task_versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id TEXT NOT NULL,
            snapshot TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT ({now})
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
        CREATE INDEX IF NOT EXISTS idx_versions_task ON task_versions(task_id);",
        now = NOW
    ))
    .await
    .map_err(|e| DomainError::Store(format!("migration failed: {}", e)))?;
    Ok(())
}

async fn fetch_task(conn: &Connection, id: &str) -> DomainResult<Option<Task>> {
    let mut rows = conn
        .query(
            &format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS),
            libsql::params![id],
        )
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;

    if let Ok(Some(row)) = rows.next().await {
        Ok(Some(row_to_task(&row)?))
    } else {
        Ok(None)
    }
}

/// Snapshot the current row (if any) into task_versions
async fn snapshot_task(conn: &Connection, id: &str) -> DomainResult<()> {
    if let Some(existing) = fetch_task(conn, id).await? {
        let json =
            serde_json::to_string(&existing).map_err(|e| DomainError::Store(e.to_string()))?;
        conn.execute(
            "INSERT INTO task_versions (task_id, snapshot) VALUES (?, ?)",
            libsql::params![id, json],
        )
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;
    }
    Ok(())
}

/// Write one full row, inserting or replacing on id collision
async fn upsert_row(conn: &Connection, task: &Task) -> DomainResult<()> {
    let tags = encode_tags(&task.tags)?;
    let coords = encode_coords(task.coords)?;
    let canvas = encode_canvas_position(task.canvas_position)?;

    conn.execute(
        &format!(
            "INSERT INTO tasks (id, user_id, title, description, due_date, estimated_time, tags, \
             is_completed, completed_at, quadrant_coords, matrix_position, matrix_z_index, \
             position, the_one) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
             user_id = excluded.user_id, title = excluded.title, \
             description = excluded.description, due_date = excluded.due_date, \
             estimated_time = excluded.estimated_time, tags = excluded.tags, \
             is_completed = excluded.is_completed, completed_at = excluded.completed_at, \
             quadrant_coords = excluded.quadrant_coords, \
             matrix_position = excluded.matrix_position, \
             matrix_z_index = excluded.matrix_z_index, position = excluded.position, \
             the_one = excluded.the_one, updated_at = {}",
            NOW
        ),
        libsql::params![
            task.id.clone(),
            task.user_id.clone(),
            task.title.clone(),
            task.description.clone(),
            encode_datetime(task.due_date),
            task.estimated_minutes,
            tags,
            if task.is_completed { 1 } else { 0 },
            encode_datetime(task.completed_at),
            coords,
            canvas,
            task.z_index,
            task.position,
            if task.the_one { 1 } else { 0 }
        ],
    )
    .await
    .map_err(|e| DomainError::Store(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl TaskStore for LibsqlTaskStore {
    async fn list(&self, user_id: &str) -> DomainResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM tasks WHERE user_id = ? \
                     ORDER BY position ASC NULLS LAST, created_at ASC",
                    TASK_COLUMNS
                ),
                libsql::params![user_id],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut tasks = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    async fn insert(&self, task: &Task) -> DomainResult<Task> {
        let conn = self.conn.lock().await;

        if fetch_task(&conn, &task.id).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "task {} already exists",
                task.id
            )));
        }
        upsert_row(&conn, task).await?;

        fetch_task(&conn, &task.id)
            .await?
            .ok_or_else(|| DomainError::Store("inserted row not readable".into()))
    }

    async fn update(&self, task: &Task) -> DomainResult<Task> {
        let conn = self.conn.lock().await;

        if fetch_task(&conn, &task.id).await?.is_none() {
            return Err(DomainError::NotFound(format!("task {} not found", task.id)));
        }
        snapshot_task(&conn, &task.id).await?;
        upsert_row(&conn, task).await?;

        fetch_task(&conn, &task.id)
            .await?
            .ok_or_else(|| DomainError::Store("updated row not readable".into()))
    }

    async fn upsert_many(&self, tasks: &[Task]) -> DomainResult<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        let conn = self.conn.lock().await;

        // One transaction: partial application must never look like success
        conn.execute("BEGIN", ())
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        for task in tasks {
            if let Err(e) = async {
                snapshot_task(&conn, &task.id).await?;
                upsert_row(&conn, task).await
            }
            .await
            {
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(e);
            }
        }

        conn.execute("COMMIT", ())
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM tasks WHERE id = ?", libsql::params![id])
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    async fn list_versions(&self, task_id: &str) -> DomainResult<Vec<TaskVersion>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT id, task_id, snapshot, created_at FROM task_versions \
                 WHERE task_id = ? ORDER BY id DESC",
                libsql::params![task_id],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut versions = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let snapshot_json = row
                .get::<String>(2)
                .map_err(|e| DomainError::Store(e.to_string()))?;
            let snapshot: Task = serde_json::from_str(&snapshot_json)
                .map_err(|e| DomainError::Store(e.to_string()))?;
            versions.push(TaskVersion {
                id: row.get::<i64>(0).map_err(|e| DomainError::Store(e.to_string()))?,
                task_id: row
                    .get::<String>(1)
                    .map_err(|e| DomainError::Store(e.to_string()))?,
                snapshot,
                created_at: row
                    .get::<Option<String>>(3)
                    .ok()
                    .flatten()
                    .as_deref()
                    .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&chrono::Utc)),
            });
        }
        Ok(versions)
    }
}
