//! Reconciliation Merge
//!
//! Merges server truth into a board's working copy without discarding
//! unsaved local drag results or duplicating/dropping tasks. Pure function;
//! the drag session decides when it is allowed to run.

use std::collections::{HashMap, HashSet};

use crate::domain::Task;

/// Merge the canonical list into the local working copy.
///
/// - Tasks present in both keep their local array position but adopt the
///   canonical field values.
/// - Tasks gone from canonical are dropped; tasks new in canonical are
///   appended.
/// - Tasks in `settling` (a drop whose write is still confirming) keep their
///   local placement fields (coords, canvas position, z, rank) so a visually
///   completed move cannot snap back while the confirmation is in flight;
///   every other field still comes from canonical.
pub fn merge_canonical(local: &[Task], canonical: &[Task], settling: &HashSet<String>) -> Vec<Task> {
    let canonical_by_id: HashMap<&str, &Task> =
        canonical.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut merged: Vec<Task> = local
        .iter()
        .filter_map(|local_task| {
            canonical_by_id.get(local_task.id.as_str()).map(|&remote| {
                if settling.contains(&local_task.id) {
                    let mut kept = remote.clone();
                    kept.coords = local_task.coords;
                    kept.canvas_position = local_task.canvas_position;
                    kept.z_index = local_task.z_index;
                    kept.position = local_task.position;
                    kept
                } else {
                    remote.clone()
                }
            })
        })
        .collect();

    let local_ids: HashSet<&str> = local.iter().map(|t| t.id.as_str()).collect();
    merged.extend(
        canonical
            .iter()
            .filter(|t| !local_ids.contains(t.id.as_str()))
            .cloned(),
    );

    merged
}
