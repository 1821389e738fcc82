//! Canonical Task Cache
//!
//! The single shared, board-wide copy of the server's task list. Only the
//! sync layer writes it (refresh results and optimistic mutations); boards
//! read snapshots and watch the version counter to know when to re-merge.
//! Until the first successful fetch the cache is unpopulated, which is
//! distinct from "populated and empty".

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::domain::Task;

/// Shared canonical task list with a change counter
#[derive(Default)]
pub struct TaskCache {
    tasks: Mutex<Option<Vec<Task>>>,
    version: AtomicU64,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter, bumped on every write. Boards compare against the
    /// last value they merged to detect canonical changes.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Clone of the canonical list; None until the first fetch lands
    pub async fn snapshot(&self) -> Option<Vec<Task>> {
        self.tasks.lock().await.clone()
    }

    /// Look up a single cached task by id
    pub async fn get(&self, id: &str) -> Option<Task> {
        self.tasks
            .lock()
            .await
            .as_ref()
            .and_then(|tasks| tasks.iter().find(|t| t.id == id).cloned())
    }

    /// Replace the canonical list (fetch result or optimistic mutation)
    pub(super) async fn replace(&self, tasks: Vec<Task>) {
        *self.tasks.lock().await = Some(tasks);
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Restore a pre-mutation snapshot verbatim (rollback path)
    pub(super) async fn restore(&self, snapshot: Option<Vec<Task>>) {
        *self.tasks.lock().await = snapshot;
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Drop all cached state (board teardown / owner switch)
    pub(super) async fn clear(&self) {
        *self.tasks.lock().await = None;
        self.version.fetch_add(1, Ordering::AcqRel);
    }
}
