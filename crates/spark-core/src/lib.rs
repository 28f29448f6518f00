//! Spark - personal idea journal
//!
//! Library exports for testing and external use.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;
