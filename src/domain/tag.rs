//! Tag Entity
//!
//! A display label attached to tasks. Tags travel inside the task record
//! (stored as a JSON column), they are not a separate table.

use serde::{Deserialize, Serialize};

/// A label with a display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}
