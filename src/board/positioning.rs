//! Position Assignment
//!
//! Rank numbering within a container and z-order assignment for canvas
//! drops. Ranks are index × RANK_GAP so a future single-task move can be a
//! single rank change without renumbering siblings.

use crate::domain::Task;

/// Gap between consecutive ranks
pub const RANK_GAP: i64 = 100;

/// A task's newly assigned rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankChange {
    pub id: String,
    pub rank: i64,
}

/// Renumber every member of one container as its container-index × RANK_GAP.
///
/// `tasks` is the whole working copy in visual order; `in_container` selects
/// the members. Returns a change for every member, whether or not its rank
/// moved; callers that only want deltas diff against the previous list.
pub fn reassign_ranks(tasks: &[Task], in_container: impl Fn(&Task) -> bool) -> Vec<RankChange> {
    tasks
        .iter()
        .filter(|t| in_container(t))
        .enumerate()
        .map(|(index, task)| RankChange {
            id: task.id.clone(),
            rank: index as i64 * RANK_GAP,
        })
        .collect()
}

/// Keep only the changes that differ from the tasks' current ranks
pub fn changed_ranks(tasks: &[Task], changes: Vec<RankChange>) -> Vec<RankChange> {
    changes
        .into_iter()
        .filter(|change| {
            tasks
                .iter()
                .find(|t| t.id == change.id)
                .map(|t| t.position != Some(change.rank))
                .unwrap_or(true)
        })
        .collect()
}

/// Stacking order for a task dropped onto the canvas: strictly above every
/// currently placed task
pub fn next_z_index(tasks: &[Task]) -> i64 {
    tasks
        .iter()
        .filter(|t| t.canvas_position.is_some())
        .map(|t| t.z_index)
        .max()
        .unwrap_or(0)
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CanvasPosition, Quadrant, QuadrantCoords};

    fn make_task(id: &str, coords: QuadrantCoords, rank: i64) -> Task {
        let mut task = Task::new(id, "user-1", format!("Task {}", id));
        task.coords = coords;
        task.position = Some(rank);
        task
    }

    #[test]
    fn test_ranks_follow_visual_order() {
        let q = Quadrant::Do.coords();
        // Visual order after the user moved C between A and B
        let tasks = vec![
            make_task("A", q, 0),
            make_task("C", q, 200),
            make_task("B", q, 100),
            make_task("X", QuadrantCoords::UNASSIGNED, 0),
        ];

        let changes = reassign_ranks(&tasks, |t| t.coords == q);
        assert_eq!(
            changes,
            vec![
                RankChange { id: "A".into(), rank: 0 },
                RankChange { id: "C".into(), rank: 100 },
                RankChange { id: "B".into(), rank: 200 },
            ]
        );
        // Strictly increasing by construction
        assert!(changes.windows(2).all(|w| w[0].rank < w[1].rank));
    }

    #[test]
    fn test_changed_ranks_diffs_against_current() {
        let q = Quadrant::Do.coords();
        let tasks = vec![make_task("A", q, 0), make_task("B", q, 250)];
        let changes = reassign_ranks(&tasks, |t| t.coords == q);

        let changed = changed_ranks(&tasks, changes);
        assert_eq!(changed, vec![RankChange { id: "B".into(), rank: 100 }]);
    }

    #[test]
    fn test_next_z_ignores_list_tasks() {
        let mut on_canvas = make_task("A", QuadrantCoords::UNASSIGNED, 0);
        on_canvas.canvas_position = Some(CanvasPosition::new(20.0, 20.0));
        on_canvas.z_index = 4;
        let mut in_list = make_task("B", QuadrantCoords::UNASSIGNED, 0);
        in_list.z_index = 99; // stale, meaningless while unplaced

        assert_eq!(next_z_index(&[on_canvas, in_list]), 5);
    }

    #[test]
    fn test_next_z_on_empty_canvas() {
        let in_list = make_task("B", QuadrantCoords::UNASSIGNED, 0);
        assert_eq!(next_z_index(&[in_list]), 1);
    }
}
