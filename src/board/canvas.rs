//! Freeform Canvas Board
//!
//! Tasks live either on a continuous-coordinate canvas (percent positions,
//! stacked by z) or in a side list. Drops on the canvas compute their
//! position from the pointer geometry, clamped so a card can never leave the
//! canvas entirely.

use std::sync::Arc;

use crate::domain::{CanvasPosition, DomainResult, FreePlacement, Task, TaskPatch};
use crate::sync::{TaskChange, TaskService};

use super::drag::{DragSession, DropTarget, Rect};
use super::positioning::{next_z_index, reassign_ranks};

pub struct CanvasBoard {
    service: Arc<TaskService>,
    session: DragSession,
}

impl CanvasBoard {
    pub fn new(service: Arc<TaskService>, initial: Vec<Task>) -> Self {
        let mut board = Self {
            service,
            session: DragSession::new(Vec::new()),
        };
        board.sync_canonical(&initial);
        board
    }

    pub fn service(&self) -> &Arc<TaskService> {
        &self.service
    }

    /// Absorb a canonical-list change. Completed tasks never show on this
    /// board, so they are filtered before the merge.
    pub fn sync_canonical(&mut self, canonical: &[Task]) {
        let open: Vec<Task> = canonical
            .iter()
            .filter(|t| !t.is_completed)
            .cloned()
            .collect();
        self.session.merge_from(&open);
    }

    /// Re-merge from the shared cache if it has been fetched
    pub async fn pull(&mut self) {
        if let Some(canonical) = self.service.cache().snapshot().await {
            self.sync_canonical(&canonical);
        }
    }

    /// Canvas-placed tasks, bottom of the stack first
    pub fn canvas_tasks(&self) -> Vec<&Task> {
        let mut placed: Vec<&Task> = self
            .session
            .tasks()
            .iter()
            .filter(|t| t.canvas_position.is_some())
            .collect();
        placed.sort_by_key(|t| t.z_index);
        placed
    }

    /// Side-list tasks, in visual order
    pub fn list_tasks(&self) -> Vec<&Task> {
        self.session
            .tasks()
            .iter()
            .filter(|t| t.canvas_position.is_none())
            .collect()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.session.active_task()
    }

    pub fn drag_start(&mut self, task_id: &str) -> bool {
        self.session.begin(task_id)
    }

    /// Pointer moved: hovering the list pulls the card into list mode (and
    /// sorts against list cards); leaving the list restores the placement the
    /// card had at gesture start.
    pub fn drag_over(&mut self, active_id: &str, over: &DropTarget) {
        if !self.session.is_dragging() {
            return;
        }
        let Some(current) = self.session.get(active_id).map(|t| t.free_placement()) else {
            return;
        };

        let over_list_task = match over {
            DropTarget::Task(over_id) => self
                .session
                .get(over_id)
                .filter(|t| t.canvas_position.is_none())
                .map(|t| t.id.clone()),
            _ => None,
        };
        let over_list = matches!(over, DropTarget::Sidebar) || over_list_task.is_some();

        if over_list {
            if current != FreePlacement::List {
                self.session
                    .update_task(active_id, |t| t.canvas_position = None);
            }
            if let Some(over_id) = over_list_task {
                self.session.move_before(active_id, &over_id);
            }
        } else if current == FreePlacement::List {
            // Back over the canvas after a list detour: restore the
            // gesture-start placement so nothing jumps
            let origin_position = self.session.origin().and_then(|t| t.canvas_position);
            if let Some(position) = origin_position {
                self.session
                    .update_task(active_id, |t| t.canvas_position = Some(position));
            }
        }
    }

    pub async fn drag_end(&mut self, active_id: &str, target: DropTarget) -> DomainResult<()> {
        let origin_in_list = self
            .session
            .origin()
            .map(|t| t.canvas_position.is_none())
            .unwrap_or(true);
        if self.session.get(active_id).is_none() {
            self.session.finish();
            return Ok(());
        }

        let changes = match &target {
            DropTarget::Canvas { canvas, item } => {
                let Some(position) = position_from_drop(canvas, item) else {
                    self.session.finish();
                    return Ok(());
                };
                let z = {
                    let others: Vec<Task> = self
                        .session
                        .tasks()
                        .iter()
                        .filter(|t| t.id != active_id)
                        .cloned()
                        .collect();
                    next_z_index(&others)
                };
                self.session.update_task(active_id, |t| {
                    t.canvas_position = Some(position);
                    t.z_index = z;
                });

                let mut patch = TaskPatch::canvas_position(Some(position));
                patch.z_index = Some(z);
                let mut changes = vec![TaskChange::new(active_id, patch)];
                if origin_in_list {
                    // Vacated list gets renumbered
                    changes.extend(self.list_rank_changes());
                }
                changes
            }
            DropTarget::Sidebar | DropTarget::Task(_) => {
                // A drop on a canvas-placed card is not a move
                if let DropTarget::Task(over_id) = &target {
                    let over_in_list = self
                        .session
                        .get(over_id)
                        .map(|t| t.canvas_position.is_none());
                    match over_in_list {
                        Some(true) => {}
                        // Placed card, or target vanished: end quietly
                        _ => {
                            self.session.finish();
                            return Ok(());
                        }
                    }
                }
                // Ordering against list cards already happened during
                // drag-over; the drop only settles the membership change
                self.session
                    .update_task(active_id, |t| t.canvas_position = None);

                let mut changes = vec![TaskChange::new(
                    active_id,
                    TaskPatch::canvas_position(None),
                )];
                // Receiving list renumbers around the newcomer
                changes.extend(self.list_rank_changes());
                changes
            }
            DropTarget::Quadrant(_) | DropTarget::BigThree | DropTarget::Nothing => {
                self.session.finish();
                return Ok(());
            }
        };

        match self.service.update_tasks(&merge_changes(changes)).await {
            Ok(()) => {
                self.session.mark_settling(active_id);
                self.session.finish();
                Ok(())
            }
            Err(e) => {
                if let Some(canonical) = self.service.cache().snapshot().await {
                    let open: Vec<Task> =
                        canonical.into_iter().filter(|t| !t.is_completed).collect();
                    self.session.resync(&open);
                } else {
                    self.session.finish();
                }
                Err(e)
            }
        }
    }

    /// Rank changes renumbering the side list, applied to the session
    fn list_rank_changes(&mut self) -> Vec<TaskChange> {
        let ranks = reassign_ranks(self.session.tasks(), |t| t.canvas_position.is_none());
        let mut changes = Vec::with_capacity(ranks.len());
        for change in ranks {
            self.session
                .update_task(&change.id, |t| t.position = Some(change.rank));
            changes.push(TaskChange::new(change.id, TaskPatch::rank(change.rank)));
        }
        changes
    }
}

/// Percentage position of the dropped card's center within the canvas,
/// clamped to the margin. None when the canvas has no extent.
fn position_from_drop(canvas: &Rect, item: &Rect) -> Option<CanvasPosition> {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return None;
    }
    let (cx, cy) = item.center();
    let x = (cx - canvas.left) / canvas.width * 100.0;
    let y = (cy - canvas.top) / canvas.height * 100.0;
    Some(CanvasPosition::new(x, y).clamped())
}

/// Collapse duplicate per-id changes (placement + rank for the same task)
/// into single patches so the batch has one row per id
fn merge_changes(changes: Vec<TaskChange>) -> Vec<TaskChange> {
    let mut merged: Vec<TaskChange> = Vec::with_capacity(changes.len());
    for change in changes {
        match merged.iter_mut().find(|c| c.id == change.id) {
            Some(existing) => {
                let patch = &mut existing.patch;
                if change.patch.canvas_position.is_some() {
                    patch.canvas_position = change.patch.canvas_position;
                }
                if change.patch.z_index.is_some() {
                    patch.z_index = change.patch.z_index;
                }
                if change.patch.position.is_some() {
                    patch.position = change.patch.position;
                }
            }
            None => merged.push(change),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, DomainResult};
    use crate::store::{TaskStore, TaskVersion};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use tokio::sync::Mutex;

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

    fn list_task(id: &str, rank: i64) -> Task {
        let mut task = Task::new(id, "user-1", format!("Task {}", id));
        task.position = Some(rank);
        task.created_at = Some(Utc::now());
        task
    }

    fn placed_task(id: &str, x: f64, y: f64, z: i64) -> Task {
        let mut task = list_task(id, 0);
        task.canvas_position = Some(CanvasPosition::new(x, y));
        task.z_index = z;
        task
    }

    async fn setup(tasks: Vec<Task>) -> (Arc<StubStore>, CanvasBoard) {
        let store = Arc::new(StubStore::default());
        *store.rows.lock().await = tasks.clone();
        let service = Arc::new(TaskService::new(store.clone(), "user-1"));
        service.refresh().await.expect("refresh failed");
        let board = CanvasBoard::new(service, tasks);
        (store, board)
    }

    fn center_drop(canvas: Rect) -> DropTarget {
        // A 40x20 card whose center sits at the canvas center
        let (cx, cy) = canvas.center();
        DropTarget::Canvas {
            canvas,
            item: Rect::new(cx - 20.0, cy - 10.0, 40.0, 20.0),
        }
    }

    #[tokio::test]
    async fn test_center_drop_is_fifty_fifty_unclamped() {
        let (store, mut board) = setup(vec![
            list_task("X", 0),
            placed_task("P", 30.0, 30.0, 2),
        ])
        .await;

        assert!(board.drag_start("X"));
        board
            .drag_end("X", center_drop(Rect::new(0.0, 0.0, 400.0, 300.0)))
            .await
            .unwrap();

        let x = board.session.get("X").unwrap();
        assert_eq!(x.canvas_position, Some(CanvasPosition::new(50.0, 50.0)));
        // Strictly above the only previously placed task
        assert_eq!(x.z_index, 3);

        let upserts = store.upserts.lock().await;
        let row = upserts[0].iter().find(|t| t.id == "X").unwrap();
        assert_eq!(row.canvas_position, Some(CanvasPosition::new(50.0, 50.0)));
        assert_eq!(row.z_index, 3);
    }

    #[tokio::test]
    async fn test_edge_drop_is_clamped_to_margin() {
        let (_, mut board) = setup(vec![list_task("X", 0)]).await;

        assert!(board.drag_start("X"));
        let canvas = Rect::new(0.0, 0.0, 400.0, 300.0);
        // Card center lands outside the canvas on both axes
        let item = Rect::new(-60.0, 310.0, 40.0, 20.0);
        board
            .drag_end("X", DropTarget::Canvas { canvas, item })
            .await
            .unwrap();

        assert_eq!(
            board.session.get("X").unwrap().canvas_position,
            Some(CanvasPosition::new(5.0, 95.0))
        );
    }

    #[tokio::test]
    async fn test_canvas_to_list_renumbers_list() {
        let (store, mut board) = setup(vec![
            list_task("A", 0),
            list_task("B", 100),
            placed_task("P", 40.0, 40.0, 1),
        ])
        .await;

        assert!(board.drag_start("P"));
        board.drag_over("P", &DropTarget::Task("B".into()));
        board.drag_end("P", DropTarget::Task("B".into())).await.unwrap();

        let list: Vec<&str> = board.list_tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(list, vec!["A", "P", "B"]);
        assert!(board.canvas_tasks().is_empty());

        let upserts = store.upserts.lock().await;
        let row = upserts[0].iter().find(|t| t.id == "P").unwrap();
        assert_eq!(row.canvas_position, None);
        assert_eq!(row.position, Some(100));
    }

    #[tokio::test]
    async fn test_list_detour_restores_origin_placement() {
        let (_, mut board) = setup(vec![list_task("A", 0), placed_task("P", 60.0, 20.0, 1)]).await;

        assert!(board.drag_start("P"));
        // Hover the list: card switches to list mode
        board.drag_over("P", &DropTarget::Sidebar);
        assert!(board.session.get("P").unwrap().canvas_position.is_none());

        // Back over the canvas without dropping: original spot comes back
        board.drag_over("P", &DropTarget::Canvas {
            canvas: Rect::new(0.0, 0.0, 400.0, 300.0),
            item: Rect::new(0.0, 0.0, 40.0, 20.0),
        });
        assert_eq!(
            board.session.get("P").unwrap().canvas_position,
            Some(CanvasPosition::new(60.0, 20.0))
        );
    }

    #[tokio::test]
    async fn test_completed_tasks_filtered_on_merge() {
        let (_, mut board) = setup(vec![list_task("A", 0)]).await;

        let mut done = list_task("B", 100);
        done.is_completed = true;
        board.sync_canonical(&[list_task("A", 0), done]);

        assert_eq!(board.list_tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_drop_restores_placement() {
        let (store, mut board) = setup(vec![list_task("X", 0)]).await;
        store.reject.store(true, std::sync::atomic::Ordering::SeqCst);

        assert!(board.drag_start("X"));
        let result = board
            .drag_end("X", center_drop(Rect::new(0.0, 0.0, 400.0, 300.0)))
            .await;
        assert!(result.is_err());

        // The visually completed move snapped back to canonical truth
        assert_eq!(board.session.get("X").unwrap().canvas_position, None);
        assert!(board.active_task().is_none());
    }
}
