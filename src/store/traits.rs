//! Store Layer - Core Traits
//!
//! Defines the abstract interface to the remote task store.
//! Implementations can use libsql, in-memory fakes, etc.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainResult, Task};

/// A historical snapshot of a task, written on every update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskVersion {
    pub id: i64,
    pub task_id: String,
    /// The full task record as it was before the update
    pub snapshot: Task,
    pub created_at: Option<DateTime<Utc>>,
}

/// The remote store contract: a row-oriented collection keyed by task id.
///
/// All operations are async; callers never assume the result reflects an
/// in-flight local drag. `update` and `upsert_many` write full rows, so
/// callers must send complete records (partial rows would null out
/// unmentioned columns).
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetch all tasks for an owner, ordered by rank ascending (nulls last)
    /// then creation time ascending
    async fn list(&self, user_id: &str) -> DomainResult<Vec<Task>>;

    /// Insert a new task row
    async fn insert(&self, task: &Task) -> DomainResult<Task>;

    /// Replace the row with the given task's id
    async fn update(&self, task: &Task) -> DomainResult<Task>;

    /// Upsert several full rows as one unit; partial application must never
    /// be observable as success
    async fn upsert_many(&self, tasks: &[Task]) -> DomainResult<()>;

    /// Delete a row by id
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// List historical snapshots for a task, newest first
    async fn list_versions(&self, task_id: &str) -> DomainResult<Vec<TaskVersion>>;
}
