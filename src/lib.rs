//! TaskMatrix Client Core
//!
//! One canonical task list rendered three ways: an Eisenhower quadrant
//! board, a freeform canvas, and a Big-3 priority list. Mutations are
//! optimistic against a shared cache and reconciled with a remote libsql
//! store; in-flight drags are isolated from refetches and recently dropped
//! tasks settle before canonical placements reapply.

pub mod analytics;
pub mod board;
pub mod domain;
pub mod store;
pub mod sync;

pub use board::{BigThreeBoard, CanvasBoard, QuadrantBoard};
pub use domain::{DomainError, DomainResult, Task, TaskDraft, TaskPatch};
pub use store::{LibsqlTaskStore, TaskStore};
pub use sync::{TaskCache, TaskService};
