//! Task Sync Service
//!
//! The remote sync layer: list/create/update/batch-update/delete against the
//! task store, with optimistic-update/rollback around the canonical cache.
//! Errors surface to the caller only after the cache is consistent again;
//! user-visible messaging is the presentation layer's job, not this one's.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::domain::{DomainError, DomainResult, QuadrantCoords, Task, TaskDraft, TaskPatch};
use crate::store::{TaskStore, TaskVersion};

use super::cache::TaskCache;

/// One entry of a batch update
#[derive(Debug, Clone)]
pub struct TaskChange {
    pub id: String,
    pub patch: TaskPatch,
}

impl TaskChange {
    pub fn new(id: impl Into<String>, patch: TaskPatch) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }
}

/// Generate a client-side task id: stable, unique enough to allow optimistic
/// insert before the server has acknowledged anything
fn generate_task_id() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("TSK-{}", n)
}

/// Async entry points over the task store, sharing one canonical cache
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    cache: Arc<TaskCache>,
    user_id: String,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            cache: Arc::new(TaskCache::new()),
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The canonical cache boards subscribe to
    pub fn cache(&self) -> Arc<TaskCache> {
        Arc::clone(&self.cache)
    }

    /// Fetch the canonical list from the store and publish it
    pub async fn refresh(&self) -> DomainResult<Vec<Task>> {
        let tasks = self.store.list(&self.user_id).await?;
        self.cache.replace(tasks.clone()).await;
        Ok(tasks)
    }

    /// Create a task from draft content.
    ///
    /// The id is generated client-side; the rank defaults to current
    /// wall-clock millis so new tasks sort after every rank-assigned task
    /// without a global counter.
    pub async fn create_task(&self, draft: TaskDraft) -> DomainResult<Task> {
        draft.validate()?;

        let mut task = Task::new(generate_task_id(), self.user_id.clone(), draft.title);
        task.description = draft.description;
        task.due_date = draft.due_date;
        task.estimated_minutes = draft.estimated_minutes;
        task.tags = draft.tags;
        task.coords = draft.coords.unwrap_or(QuadrantCoords::UNASSIGNED);
        task.canvas_position = draft.canvas_position;
        task.the_one = draft.the_one;
        task.position = Some(
            draft
                .position
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        );

        let created = self.store.insert(&task).await?;
        log::debug!("created task {}", created.id);

        // Invalidate: the canonical list must include the new row
        self.refresh().await?;
        Ok(created)
    }

    /// Apply a partial update optimistically, then persist it.
    ///
    /// The cached copy is mutated before the store call resolves; if the call
    /// fails, the pre-mutation snapshot is restored verbatim and the error
    /// propagates.
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> DomainResult<Task> {
        let snapshot = self.cache.snapshot().await;
        let tasks = snapshot
            .clone()
            .ok_or_else(|| DomainError::NotReady("task cache not populated".into()))?;

        let current = tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("task {} not cached", id)))?;

        let mut updated = current.clone();
        patch.apply(&mut updated, Utc::now());

        let optimistic: Vec<Task> = tasks
            .iter()
            .map(|t| if t.id == id { updated.clone() } else { t.clone() })
            .collect();
        self.cache.replace(optimistic).await;

        match self.store.update(&updated).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                log::warn!("update of {} rejected, rolling back: {}", id, e);
                self.cache.restore(snapshot).await;
                Err(e)
            }
        }
    }

    /// Apply several partial updates as one unit.
    ///
    /// The store performs full-row upserts, so every patch is merged onto the
    /// currently cached full record before sending; a batch against an
    /// unpopulated cache fails loudly rather than corrupting unmentioned
    /// columns. Either all changes become optimistically visible, or on
    /// failure all are rolled back together.
    pub async fn update_tasks(&self, changes: &[TaskChange]) -> DomainResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let snapshot = self.cache.snapshot().await;
        let mut tasks = snapshot
            .clone()
            .ok_or_else(|| DomainError::NotReady("task cache not populated".into()))?;

        let now = Utc::now();
        let mut payload = Vec::with_capacity(changes.len());
        for change in changes {
            match tasks.iter_mut().find(|t| t.id == change.id) {
                Some(task) => {
                    change.patch.apply(task, now);
                    payload.push(task.clone());
                }
                None => {
                    // Concurrently deleted; the move degrades to a no-op
                    log::warn!("batch update skipping uncached task {}", change.id);
                }
            }
        }
        if payload.is_empty() {
            return Ok(());
        }

        self.cache.replace(tasks).await;

        match self.store.upsert_many(&payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("batch of {} rejected, rolling back: {}", payload.len(), e);
                self.cache.restore(snapshot).await;
                Err(e)
            }
        }
    }

    /// Delete by id. No optimistic removal; the canonical list is refetched
    /// once the store confirms.
    pub async fn delete_task(&self, id: &str) -> DomainResult<()> {
        self.store.delete(id).await?;
        log::debug!("deleted task {}", id);
        self.refresh().await?;
        Ok(())
    }

    /// Historical snapshots for a task, newest first
    pub async fn list_versions(&self, task_id: &str) -> DomainResult<Vec<TaskVersion>> {
        self.store.list_versions(task_id).await
    }

    /// Re-apply a historical snapshot through the normal update path.
    /// Server metadata stays server-owned; completion stamping is re-derived.
    pub async fn restore_version(&self, version: &TaskVersion) -> DomainResult<Task> {
        let s = &version.snapshot;
        let patch = TaskPatch {
            title: Some(s.title.clone()),
            description: Some(s.description.clone()),
            due_date: Some(s.due_date),
            estimated_minutes: Some(s.estimated_minutes),
            tags: Some(s.tags.clone()),
            is_completed: Some(s.is_completed),
            coords: Some(s.coords),
            canvas_position: Some(s.canvas_position),
            z_index: Some(s.z_index),
            position: s.position,
            the_one: Some(s.the_one),
        };
        self.update_task(&version.task_id, patch).await
    }

    /// Forget all cached state (board teardown)
    pub async fn teardown(&self) {
        self.cache.clear().await;
    }
}
