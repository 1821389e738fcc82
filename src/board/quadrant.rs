//! Quadrant Board
//!
//! The four-cell Eisenhower grid plus the unassigned sidebar. Consumes
//! gesture events, keeps a drag session against the canonical cache, and
//! persists settled moves as one grouped rank/coords batch.

use std::sync::Arc;

use crate::domain::{DomainResult, Quadrant, QuadrantCoords, QuadrantPlacement, Task, TaskPatch};
use crate::sync::{TaskChange, TaskService};

use super::drag::{DragSession, DropTarget};
use super::positioning::reassign_ranks;

pub struct QuadrantBoard {
    service: Arc<TaskService>,
    session: DragSession,
}

impl QuadrantBoard {
    pub fn new(service: Arc<TaskService>, initial: Vec<Task>) -> Self {
        Self {
            service,
            session: DragSession::new(initial),
        }
    }

    pub fn service(&self) -> &Arc<TaskService> {
        &self.service
    }

    /// Absorb a canonical-list change (no-op while a drag is live)
    pub fn sync_canonical(&mut self, canonical: &[Task]) {
        self.session.merge_from(canonical);
    }

    /// Re-merge from the shared cache if it has been fetched
    pub async fn pull(&mut self) {
        if let Some(canonical) = self.service.cache().snapshot().await {
            self.sync_canonical(&canonical);
        }
    }

    /// Tasks in one quadrant cell, in visual order
    pub fn cell_tasks(&self, quadrant: Quadrant) -> Vec<&Task> {
        self.session
            .tasks()
            .iter()
            .filter(|t| t.quadrant_placement() == QuadrantPlacement::Cell(quadrant))
            .collect()
    }

    /// Unassigned tasks (the sidebar), in visual order
    pub fn sidebar_tasks(&self) -> Vec<&Task> {
        self.session
            .tasks()
            .iter()
            .filter(|t| t.quadrant_placement() == QuadrantPlacement::Sidebar)
            .collect()
    }

    /// The task under the pointer, for overlay rendering
    pub fn active_task(&self) -> Option<&Task> {
        self.session.active_task()
    }

    pub fn drag_start(&mut self, task_id: &str) -> bool {
        self.session.begin(task_id)
    }

    /// Pointer moved over another card: sort live, but only within the same
    /// container; cross-container placement waits for the drop
    pub fn drag_over(&mut self, active_id: &str, over_id: &str) {
        if active_id == over_id || !self.session.is_dragging() {
            return;
        }
        let active_coords = self.session.get(active_id).map(|t| t.coords);
        let over_coords = self.session.get(over_id).map(|t| t.coords);
        if let (Some(a), Some(o)) = (active_coords, over_coords) {
            if a == o {
                self.session.move_before(active_id, over_id);
            }
        }
    }

    /// Settle the gesture: place the task, renumber both affected
    /// containers, and persist everything as one batch.
    pub async fn drag_end(&mut self, active_id: &str, target: DropTarget) -> DomainResult<()> {
        let origin_coords = self.session.origin().map(|t| t.coords);
        let Some(current) = self.session.get(active_id).map(|t| t.coords) else {
            self.session.finish();
            return Ok(());
        };

        let new_coords = match &target {
            DropTarget::Task(over_id) => {
                let Some(coords) = self.session.get(over_id).map(|t| t.coords) else {
                    // Target vanished under the pointer; end without error
                    self.session.finish();
                    return Ok(());
                };
                if coords != current {
                    // Landed on a card in another container: adopt its
                    // container and sit adjacent to it
                    self.session.update_task(active_id, |t| t.coords = coords);
                    self.session.move_before(active_id, over_id);
                }
                coords
            }
            DropTarget::Quadrant(coords) => {
                let coords = *coords;
                self.session.update_task(active_id, |t| t.coords = coords);
                self.session.move_to_end(active_id);
                coords
            }
            DropTarget::Sidebar => {
                self.session
                    .update_task(active_id, |t| t.coords = QuadrantCoords::UNASSIGNED);
                self.session.move_to_end(active_id);
                QuadrantCoords::UNASSIGNED
            }
            // Not droppable on this board
            DropTarget::Canvas { .. } | DropTarget::BigThree | DropTarget::Nothing => {
                self.session.finish();
                return Ok(());
            }
        };

        // Renumber the destination and, for a cross-container move, the
        // vacated source as well
        let mut containers = vec![new_coords];
        if let Some(origin) = origin_coords {
            if origin != new_coords {
                containers.push(origin);
            }
        }

        let mut changes: Vec<TaskChange> = Vec::new();
        for coords in containers {
            for change in reassign_ranks(self.session.tasks(), |t| t.coords == coords) {
                self.session
                    .update_task(&change.id, |t| t.position = Some(change.rank));
                let mut patch = TaskPatch::rank(change.rank);
                if change.id == active_id {
                    patch.coords = Some(new_coords);
                }
                changes.push(TaskChange::new(change.id, patch));
            }
        }
        // A move into an otherwise handled container always persists the
        // coordinate change itself
        if !changes.iter().any(|c| c.id == active_id) {
            changes.push(TaskChange::new(active_id, TaskPatch::coords(new_coords)));
        }

        match self.service.update_tasks(&changes).await {
            Ok(()) => {
                self.session.mark_settling(active_id);
                self.session.finish();
                Ok(())
            }
            Err(e) => {
                if let Some(canonical) = self.service.cache().snapshot().await {
                    self.session.resync(&canonical);
                } else {
                    self.session.finish();
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::drag::DropTarget;
    use crate::store::TaskStore;
    use crate::sync::TaskService;
    use chrono::Utc;

    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use crate::domain::{DomainError, DomainResult};
    use crate::store::TaskVersion;

    /// Store stub that records batches and optionally rejects writes
    #[derive(Default)]
    struct StubStore {
        rows: Mutex<Vec<Task>>,
        upserts: Mutex<Vec<Vec<Task>>>,
        reject: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl TaskStore for StubStore {
        async fn list(&self, _user_id: &str) -> DomainResult<Vec<Task>> {
            Ok(self.rows.lock().await.clone())
        }
        async fn insert(&self, task: &Task) -> DomainResult<Task> {
            self.rows.lock().await.push(task.clone());
            Ok(task.clone())
        }
        async fn update(&self, task: &Task) -> DomainResult<Task> {
            Ok(task.clone())
        }
        async fn upsert_many(&self, tasks: &[Task]) -> DomainResult<()> {
            if self.reject.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(DomainError::Store("rejected".into()));
            }
            self.upserts.lock().await.push(tasks.to_vec());
            Ok(())
        }
        async fn delete(&self, _id: &str) -> DomainResult<()> {
            Ok(())
        }
        async fn list_versions(&self, _task_id: &str) -> DomainResult<Vec<TaskVersion>> {
            Ok(Vec::new())
        }
    }

    fn make_task(id: &str, coords: QuadrantCoords, rank: i64) -> Task {
        let mut task = Task::new(id, "user-1", format!("Task {}", id));
        task.coords = coords;
        task.position = Some(rank);
        task.created_at = Some(Utc::now());
        task
    }

    async fn setup(tasks: Vec<Task>) -> (Arc<StubStore>, QuadrantBoard) {
        let store = Arc::new(StubStore::default());
        *store.rows.lock().await = tasks.clone();
        let service = Arc::new(TaskService::new(store.clone(), "user-1"));
        service.refresh().await.expect("refresh failed");
        let board = QuadrantBoard::new(service, tasks);
        (store, board)
    }

    #[tokio::test]
    async fn test_reorder_within_cell_renumbers_all_members() {
        let q = Quadrant::Do.coords();
        let (store, mut board) = setup(vec![
            make_task("A", q, 0),
            make_task("B", q, 100),
            make_task("C", q, 200),
        ])
        .await;

        // Drag C between A and B
        assert!(board.drag_start("C"));
        board.drag_over("C", "B");
        board.drag_end("C", DropTarget::Task("B".into())).await.unwrap();

        let cell: Vec<&str> = board
            .cell_tasks(Quadrant::Do)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(cell, vec!["A", "C", "B"]);
        assert_eq!(board.session.get("A").unwrap().position, Some(0));
        assert_eq!(board.session.get("C").unwrap().position, Some(100));
        assert_eq!(board.session.get("B").unwrap().position, Some(200));

        // One grouped write touching all three ids
        let upserts = store.upserts.lock().await;
        assert_eq!(upserts.len(), 1);
        let mut ids: Vec<&str> = upserts[0].iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_cross_container_move_renumbers_both() {
        let do_q = Quadrant::Do.coords();
        let sched = Quadrant::Schedule.coords();
        let (store, mut board) = setup(vec![
            make_task("A", do_q, 0),
            make_task("B", do_q, 100),
            make_task("S", sched, 0),
        ])
        .await;

        assert!(board.drag_start("A"));
        board.drag_end("A", DropTarget::Task("S".into())).await.unwrap();

        assert_eq!(board.session.get("A").unwrap().coords, sched);
        let sched_ids: Vec<&str> = board
            .cell_tasks(Quadrant::Schedule)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(sched_ids, vec!["A", "S"]);

        let upserts = store.upserts.lock().await;
        let batch = &upserts[0];
        // Destination members A,S and vacated-source member B, one unit
        let mut ids: Vec<&str> = batch.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["A", "B", "S"]);
        let a = batch.iter().find(|t| t.id == "A").unwrap();
        assert_eq!(a.coords, sched);
        assert_eq!(a.position, Some(0));
    }

    #[tokio::test]
    async fn test_drop_on_empty_cell_moves_to_container_end() {
        let do_q = Quadrant::Do.coords();
        let (_, mut board) = setup(vec![make_task("A", QuadrantCoords::UNASSIGNED, 0)]).await;

        assert!(board.drag_start("A"));
        board
            .drag_end("A", DropTarget::Quadrant(do_q))
            .await
            .unwrap();

        assert_eq!(board.cell_tasks(Quadrant::Do).len(), 1);
        assert!(board.sidebar_tasks().is_empty());
    }

    #[tokio::test]
    async fn test_drop_nowhere_is_cancellation() {
        let q = Quadrant::Do.coords();
        let (store, mut board) = setup(vec![make_task("A", q, 0)]).await;

        assert!(board.drag_start("A"));
        board.drag_end("A", DropTarget::Nothing).await.unwrap();

        assert!(board.active_task().is_none());
        assert!(store.upserts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_target_ends_without_error() {
        let q = Quadrant::Do.coords();
        let (store, mut board) = setup(vec![make_task("A", q, 0)]).await;

        assert!(board.drag_start("A"));
        let result = board.drag_end("A", DropTarget::Task("deleted".into())).await;
        assert!(result.is_ok());
        assert!(store.upserts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_batch_resyncs_from_canonical() {
        let q = Quadrant::Do.coords();
        let (store, mut board) = setup(vec![
            make_task("A", q, 0),
            make_task("B", q, 100),
        ])
        .await;
        store.reject.store(true, std::sync::atomic::Ordering::SeqCst);

        assert!(board.drag_start("B"));
        board.drag_over("B", "A");
        let result = board.drag_end("B", DropTarget::Task("A".into())).await;
        assert!(result.is_err());

        // Working copy snapped back to the canonical order
        let ids: Vec<&str> = board
            .cell_tasks(Quadrant::Do)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(board.active_task().is_none());
    }

    #[tokio::test]
    async fn test_merge_deferred_while_dragging() {
        let q = Quadrant::Do.coords();
        let (_, mut board) = setup(vec![make_task("A", q, 0), make_task("B", q, 100)]).await;

        assert!(board.drag_start("A"));
        board.sync_canonical(&[make_task("B", q, 100)]);
        // Still two tasks: the merge waits for drag-end
        assert_eq!(board.session.tasks().len(), 2);
    }
}
