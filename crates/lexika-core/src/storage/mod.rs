//! Storage Module
//!
//! SQLite-based storage layer with:
//! - Word catalogue and per-user scheduling records
//! - Append-only study-event log
//! - Transactional answer submission with optimistic locking
//! - Study-block generation and statistics queries

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{ProgressSummary, Result, Storage, StorageError};
