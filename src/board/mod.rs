//! Board Views
//!
//! The three views over one task list (Eisenhower quadrants, freeform
//! canvas, Big-3 priority list), plus the drag/merge machinery they share.

mod big3;
mod canvas;
mod drag;
mod merge;
mod positioning;
mod quadrant;

pub use big3::BigThreeBoard;
pub use canvas::CanvasBoard;
pub use drag::{DragSession, DropTarget, Rect, SETTLE_WINDOW};
pub use merge::merge_canonical;
pub use positioning::{changed_ranks, next_z_index, reassign_ranks, RankChange, RANK_GAP};
pub use quadrant::QuadrantBoard;
