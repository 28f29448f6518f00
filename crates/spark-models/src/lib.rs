//! Data models for Spark.
//!
//! Defines the core types used throughout the system: ideas and their
//! timeline updates, folders, embedded attachments, and AI suggestions,
//! plus the pure query layer that derives filtered and grouped views.
//!
//! This crate does no I/O; persistence and transport live in
//! `spark-store` and `spark-core`.

mod folder;
mod idea;
pub mod query;
mod suggestion;

pub use folder::*;
pub use idea::*;
pub use suggestion::*;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new UUID
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
