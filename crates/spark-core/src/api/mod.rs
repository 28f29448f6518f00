//! API Routes for Spark
//!
//! This module combines all API routes into a single router.
//!
//! Route structure:
//! - /ideas/* - Idea CRUD, derived views, timeline updates, suggestions
//! - /folders/* - Folder management
//! - /attachments - Attachment encoding (multipart upload)
//! - /health - Health check (public)

use axum::Router;
use serde::Deserialize;

mod attachments;
mod folders;
mod ideas;
mod status;
mod suggestions;

use crate::AppState;

/// Build the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .nest("/ideas", ideas::routes().merge(suggestions::routes()))
        .nest("/folders", folders::routes())
        .nest("/attachments", attachments::routes())
}

/// Query flag guarding destructive operations.
///
/// Deletes are only issued with an explicit `?confirm=true`; without it the
/// request is rejected before any mutation.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct Confirm {
    #[serde(default)]
    pub confirm: bool,
}

impl Confirm {
    pub(crate) fn require(&self) -> crate::Result<()> {
        if self.confirm {
            Ok(())
        } else {
            Err(crate::Error::Validation(
                "Destructive operation requires confirm=true".to_string(),
            ))
        }
    }
}
