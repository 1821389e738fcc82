//! Store Layer
//!
//! Remote-store contract and the libsql-backed implementation.

mod db;
mod row;
mod traits;


pub use db::LibsqlTaskStore;
pub use traits::{TaskStore, TaskVersion};
