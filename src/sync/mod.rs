//! Sync Layer
//!
//! The canonical cache and the remote sync service (optimistic mutations).

mod cache;
mod service;


pub use cache::TaskCache;
pub use service::{TaskChange, TaskService};
