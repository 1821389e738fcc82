//! Drag Session
//!
//! Board-scoped working copy of the task list for the span of a pointer
//! gesture, decoupled from the canonical cache. Per gesture the session walks
//! `idle → dragging → dropped → settling → idle`; settling is tracked per
//! task id so rapid sequential drags do not block each other.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::domain::Task;

use super::merge::merge_canonical;

/// Grace window after a drop settles during which incoming canonical merges
/// keep the just-moved task's local placement. A fixed interval is a
/// heuristic: a confirmation slower than this can still flicker.
pub const SETTLE_WINDOW: Duration = Duration::from_millis(250);

/// Pixel-space rectangle, as reported by the gesture source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Where a drag ended, resolved once at the start of drag-end handling
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    /// On another task card
    Task(String),
    /// On a quadrant cell's empty area
    Quadrant(crate::domain::QuadrantCoords),
    /// On the side list's empty area
    Sidebar,
    /// On the freeform canvas: the canvas bounds and the dragged card's
    /// final bounds, both in the same pixel space
    Canvas { canvas: Rect, item: Rect },
    /// On the Big-3 list's empty area
    BigThree,
    /// Released outside every droppable region
    Nothing,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    task_id: String,
    /// Snapshot of the task at gesture start, for placement restore
    origin: Task,
}

/// Ephemeral, board-scoped task ordering for the duration of a gesture
#[derive(Debug)]
pub struct DragSession {
    tasks: Vec<Task>,
    active: Option<ActiveDrag>,
    /// Per-task settle deadlines
    settling: HashMap<String, Instant>,
}

impl DragSession {
    pub fn new(initial: Vec<Task>) -> Self {
        Self {
            tasks: initial,
            active: None,
            settling: HashMap::new(),
        }
    }

    /// The working copy, in visual order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Working-copy state of the currently dragged task (overlay rendering)
    pub fn active_task(&self) -> Option<&Task> {
        self.active.as_ref().and_then(|a| self.get(&a.task_id))
    }

    /// The dragged task as it was at gesture start
    pub fn origin(&self) -> Option<&Task> {
        self.active.as_ref().map(|a| &a.origin)
    }

    /// Begin a gesture. Returns false (and changes nothing) when the id is
    /// unknown or another gesture is already live; gestures never nest.
    pub fn begin(&mut self, task_id: &str) -> bool {
        if self.active.is_some() {
            return false;
        }
        match self.get(task_id) {
            Some(task) => {
                self.active = Some(ActiveDrag {
                    task_id: task_id.to_string(),
                    origin: task.clone(),
                });
                true
            }
            None => false,
        }
    }

    /// Clear the active marker (drop handled, or cancelled)
    pub fn finish(&mut self) {
        self.active = None;
    }

    /// Open the grace window for a just-dropped task
    pub fn mark_settling(&mut self, task_id: &str) {
        self.mark_settling_at(task_id, Instant::now());
    }

    pub fn mark_settling_at(&mut self, task_id: &str, now: Instant) {
        self.settling.insert(task_id.to_string(), now + SETTLE_WINDOW);
    }

    /// Merge the canonical list into the working copy. Suppressed entirely
    /// while a gesture is live; the board retries once the drag ends.
    pub fn merge_from(&mut self, canonical: &[Task]) {
        self.merge_from_at(canonical, Instant::now());
    }

    pub fn merge_from_at(&mut self, canonical: &[Task], now: Instant) {
        if self.active.is_some() {
            return;
        }
        self.settling.retain(|_, deadline| *deadline > now);
        let settling: HashSet<String> = self.settling.keys().cloned().collect();
        self.tasks = merge_canonical(&self.tasks, canonical, &settling);
    }

    /// Discard local state and adopt the canonical list wholesale
    /// (error recovery after a rejected write)
    pub fn resync(&mut self, canonical: &[Task]) {
        self.active = None;
        self.settling.clear();
        self.tasks = canonical.to_vec();
    }

    /// Reorder: remove the moved task and reinsert at the target's index.
    /// No-op when either id is missing (stale-container race) or the indices
    /// are equal.
    pub fn move_before(&mut self, active_id: &str, over_id: &str) {
        let Some(old_index) = self.tasks.iter().position(|t| t.id == active_id) else {
            return;
        };
        let Some(new_index) = self.tasks.iter().position(|t| t.id == over_id) else {
            return;
        };
        if old_index == new_index {
            return;
        }
        let moved = self.tasks.remove(old_index);
        let new_index = new_index.min(self.tasks.len());
        self.tasks.insert(new_index, moved);
    }

    /// Move a task to the end of the working array. Safe for drops on empty
    /// container space: membership, not array position, defines grouping.
    pub fn move_to_end(&mut self, task_id: &str) {
        if let Some(index) = self.tasks.iter().position(|t| t.id == task_id) {
            let moved = self.tasks.remove(index);
            self.tasks.push(moved);
        }
    }

    /// Mutate one task in place; returns false if the id is unknown
    pub fn update_task(&mut self, task_id: &str, f: impl FnOnce(&mut Task)) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                f(task);
                true
            }
            None => false,
        }
    }
}
