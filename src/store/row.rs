//! Row Mapping
//!
//! Translates between the in-memory Task record and the store's column shape.
//! The two placement fields live under store-specific column names
//! (`quadrant_coords`, `matrix_position`); everything crossing the store
//! boundary goes through this module, in both directions.

use chrono::{DateTime, Utc};

use crate::domain::{CanvasPosition, DomainError, DomainResult, QuadrantCoords, Tag, Task};

/// Column list used by every SELECT, in `row_to_task` order
pub(super) const TASK_COLUMNS: &str = "id, user_id, title, description, due_date, estimated_time, \
     tags, is_completed, completed_at, quadrant_coords, matrix_position, matrix_z_index, \
     position, the_one, created_at, updated_at";

pub(super) fn encode_tags(tags: &[Tag]) -> DomainResult<String> {
    serde_json::to_string(tags).map_err(|e| DomainError::Store(e.to_string()))
}

pub(super) fn encode_coords(coords: QuadrantCoords) -> DomainResult<String> {
    serde_json::to_string(&coords).map_err(|e| DomainError::Store(e.to_string()))
}

pub(super) fn encode_canvas_position(
    position: Option<CanvasPosition>,
) -> DomainResult<Option<String>> {
    position
        .map(|p| serde_json::to_string(&p).map_err(|e| DomainError::Store(e.to_string())))
        .transpose()
}

pub(super) fn encode_datetime(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|v| v.to_rfc3339())
}

fn decode_datetime(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert a database row to a Task
pub(super) fn row_to_task(row: &libsql::Row) -> DomainResult<Task> {
    let tags_json = row
        .get::<String>(6)
        .map_err(|e| DomainError::Store(e.to_string()))?;
    let coords_json = row
        .get::<String>(9)
        .map_err(|e| DomainError::Store(e.to_string()))?;
    let canvas_json = row.get::<Option<String>>(10).ok().flatten();

    Ok(Task {
        id: row
            .get::<String>(0)
            .map_err(|e| DomainError::Store(e.to_string()))?,
        user_id: row
            .get::<String>(1)
            .map_err(|e| DomainError::Store(e.to_string()))?,
        title: row
            .get::<String>(2)
            .map_err(|e| DomainError::Store(e.to_string()))?,
        description: row.get::<String>(3).unwrap_or_default(),
        due_date: decode_datetime(row.get::<Option<String>>(4).ok().flatten()),
        estimated_minutes: row.get::<Option<i64>>(5).ok().flatten(),
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        is_completed: row.get::<i64>(7).unwrap_or(0) != 0,
        completed_at: decode_datetime(row.get::<Option<String>>(8).ok().flatten()),
        coords: serde_json::from_str(&coords_json).unwrap_or(QuadrantCoords::UNASSIGNED),
        canvas_position: canvas_json.and_then(|json| serde_json::from_str(&json).ok()),
        z_index: row.get::<i64>(11).unwrap_or(0),
        position: row.get::<Option<i64>>(12).ok().flatten(),
        the_one: row.get::<i64>(13).unwrap_or(0) != 0,
        created_at: decode_datetime(row.get::<Option<String>>(14).ok().flatten()),
        updated_at: decode_datetime(row.get::<Option<String>>(15).ok().flatten()),
    })
}
