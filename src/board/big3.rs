//! Big-3 Board
//!
//! A single ordered list of the tasks flagged `the_one`. Reordering persists
//! only the ranks that actually changed; creation appends past the current
//! maximum rank.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{DomainResult, Task, TaskDraft, TaskPatch};
use crate::sync::{TaskChange, TaskService};

use super::drag::{DragSession, DropTarget};
use super::positioning::{changed_ranks, reassign_ranks, RANK_GAP};

pub struct BigThreeBoard {
    service: Arc<TaskService>,
    session: DragSession,
}

impl BigThreeBoard {
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

    /// Absorb a canonical-list change; only `the_one` tasks belong here
    pub fn sync_canonical(&mut self, canonical: &[Task]) {
        let big3: Vec<Task> = canonical.iter().filter(|t| t.the_one).cloned().collect();
        self.session.merge_from(&big3);
    }

    /// Re-merge from the shared cache if it has been fetched
    pub async fn pull(&mut self) {
        if let Some(canonical) = self.service.cache().snapshot().await {
            self.sync_canonical(&canonical);
        }
    }

    /// The priority list, in visual order
    pub fn tasks(&self) -> &[Task] {
        self.session.tasks()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.session.active_task()
    }

    pub fn drag_start(&mut self, task_id: &str) -> bool {
        self.session.begin(task_id)
    }

    /// Sort live while hovering another card; hovering the list's empty
    /// area changes nothing until the drop
    pub fn drag_over(&mut self, active_id: &str, over: &DropTarget) {
        if !self.session.is_dragging() {
            return;
        }
        if let DropTarget::Task(over_id) = over {
            if over_id != active_id {
                self.session.move_before(active_id, over_id);
            }
        }
    }

    pub async fn drag_end(&mut self, active_id: &str, target: DropTarget) -> DomainResult<()> {
        match target {
            DropTarget::Task(_) | DropTarget::BigThree => {}
            _ => {
                self.session.finish();
                return Ok(());
            }
        }

        // Renumber the whole list, persist only what moved
        let ranks = reassign_ranks(self.session.tasks(), |t| t.the_one);
        let moved = changed_ranks(self.session.tasks(), ranks);
        let mut changes = Vec::with_capacity(moved.len());
        for change in moved {
            self.session
                .update_task(&change.id, |t| t.position = Some(change.rank));
            changes.push(TaskChange::new(change.id, TaskPatch::rank(change.rank)));
        }
        if changes.is_empty() {
            self.session.finish();
            return Ok(());
        }

        match self.service.update_tasks(&changes).await {
            Ok(()) => {
                self.session.mark_settling(active_id);
                self.session.finish();
                Ok(())
            }
            Err(e) => {
                if let Some(canonical) = self.service.cache().snapshot().await {
                    let big3: Vec<Task> =
                        canonical.into_iter().filter(|t| t.the_one).collect();
                    self.session.resync(&big3);
                } else {
                    self.session.finish();
                }
                Err(e)
            }
        }
    }

    /// Create a new priority task at the end of the list
    pub async fn create_at_end(&self, mut draft: TaskDraft) -> DomainResult<Task> {
        let rank = self
            .session
            .tasks()
            .iter()
            .filter_map(|t| t.position)
            .max()
            .map(|max| max + RANK_GAP)
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        draft.the_one = true;
        draft.position = Some(rank);
        self.service.create_task(draft).await
    }
}
