//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde/chrono for data).

mod entity;
mod placement;
mod tag;
mod task;

pub use entity::{DomainError, DomainResult, Entity};
pub use placement::{
    CanvasPosition, FreePlacement, Quadrant, QuadrantCoords, QuadrantPlacement, CANVAS_MARGIN_PCT,
};
pub use tag::Tag;
pub use task::{Task, TaskDraft, TaskPatch, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
