//! Task Entity
//!
//! The canonical task record shared by every board. Carries both placement
//! representations (quadrant coordinate and canvas position); boards project
//! it into their own placement view instead of reading the raw fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};
use super::placement::{CanvasPosition, FreePlacement, QuadrantCoords, QuadrantPlacement};
use super::tag::Tag;

/// Maximum title length accepted at create/update time
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum rich-text description length
pub const MAX_DESCRIPTION_LEN: usize = 20_000;

/// A single task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Client-generated, globally unique identifier
    pub id: String,
    /// Owner identifier (server-enforced, carried on every row)
    pub user_id: String,
    pub title: String,
    /// Rich-text description (serialized editor content)
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated duration in minutes
    pub estimated_minutes: Option<i64>,
    pub tags: Vec<Tag>,
    pub is_completed: bool,
    /// Stamped when is_completed flips false→true, cleared on true→false
    pub completed_at: Option<DateTime<Utc>>,
    /// Quadrant-board placement; (-1, -1) = unassigned
    pub coords: QuadrantCoords,
    /// Freeform-board placement; None = side list
    pub canvas_position: Option<CanvasPosition>,
    /// Stacking order on the canvas; meaningless while canvas_position is None
    pub z_index: i64,
    /// Rank within the current container; None sorts last
    pub position: Option<i64>,
    /// Membership in the Big-3 priority list
    pub the_one: bool,
    /// Server-assigned timestamps
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a new, unplaced task owned by `user_id`
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: title.into(),
            description: String::new(),
            due_date: None,
            estimated_minutes: None,
            tags: Vec::new(),
            is_completed: false,
            completed_at: None,
            coords: QuadrantCoords::UNASSIGNED,
            canvas_position: None,
            z_index: 0,
            position: None,
            the_one: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Project into the quadrant board's placement view
    pub fn quadrant_placement(&self) -> QuadrantPlacement {
        match self.coords.quadrant() {
            Some(q) => QuadrantPlacement::Cell(q),
            None => QuadrantPlacement::Sidebar,
        }
    }

    /// Project into the freeform board's placement view
    pub fn free_placement(&self) -> FreePlacement {
        match self.canvas_position {
            Some(position) => FreePlacement::Canvas {
                position,
                z: self.z_index,
            },
            None => FreePlacement::List,
        }
    }
}

impl Entity for Task {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

/// Content supplied when creating a task; identity, rank and timestamps are
/// assigned by the sync layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_minutes: Option<i64>,
    pub tags: Vec<Tag>,
    pub coords: Option<QuadrantCoords>,
    pub canvas_position: Option<CanvasPosition>,
    pub the_one: bool,
    /// Explicit rank; defaults to wall-clock millis when absent
    pub position: Option<i64>,
}

impl TaskDraft {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Enforce the bounded-length content contract
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("title must not be empty".into()));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::InvalidInput(format!(
                "title exceeds {} characters",
                MAX_TITLE_LEN
            )));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::InvalidInput(format!(
                "description exceeds {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
        Ok(())
    }
}

/// A partial set of field changes.
///
/// Nullable fields are double-wrapped: the outer Option is "touch this field
/// at all", the inner value is what to write (including None = clear).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub estimated_minutes: Option<Option<i64>>,
    pub tags: Option<Vec<Tag>>,
    pub is_completed: Option<bool>,
    pub coords: Option<QuadrantCoords>,
    pub canvas_position: Option<Option<CanvasPosition>>,
    pub z_index: Option<i64>,
    pub position: Option<i64>,
    pub the_one: Option<bool>,
}

impl TaskPatch {
    /// Patch that moves a task to a quadrant coordinate
    pub fn coords(coords: QuadrantCoords) -> Self {
        Self {
            coords: Some(coords),
            ..Default::default()
        }
    }

    /// Patch that places a task on the canvas (or back in the list with None)
    pub fn canvas_position(position: Option<CanvasPosition>) -> Self {
        Self {
            canvas_position: Some(position),
            ..Default::default()
        }
    }

    /// Patch that changes only the rank
    pub fn rank(position: i64) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// Patch that flips the completion flag
    pub fn completion(is_completed: bool) -> Self {
        Self {
            is_completed: Some(is_completed),
            ..Default::default()
        }
    }

    /// Apply this patch onto a task.
    ///
    /// When the patch touches is_completed, completed_at is derived here:
    /// stamped with `now` on completion, cleared on un-completion. This is the
    /// single place the stamping rule lives, so the optimistic copy and the
    /// persisted row can never disagree.
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(estimated) = self.estimated_minutes {
            task.estimated_minutes = estimated;
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        if let Some(is_completed) = self.is_completed {
            task.is_completed = is_completed;
            task.completed_at = if is_completed { Some(now) } else { None };
        }
        if let Some(coords) = self.coords {
            task.coords = coords;
        }
        if let Some(canvas_position) = self.canvas_position {
            task.canvas_position = canvas_position;
        }
        if let Some(z_index) = self.z_index {
            task.z_index = z_index;
        }
        if let Some(position) = self.position {
            task.position = Some(position);
        }
        if let Some(the_one) = self.the_one {
            task.the_one = the_one;
        }
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}
