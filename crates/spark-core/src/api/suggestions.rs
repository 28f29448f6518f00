//! Suggestions Routes
//!
//! Best-effort AI enrichment for an idea. The adapter never fails; when no
//! provider is configured or the call errors out, the response carries the
//! empty suggestion set with `available: false` as a non-fatal notice.
//!
//! Routes:
//! - POST /ideas/:id/suggestions - Suggest tags and next steps

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use spark_models::Suggestions;

use crate::{AppState, Error, Result};

/// Build suggestion routes (merged into the /ideas nest).
pub fn routes() -> Router<AppState> {
    Router::new().route("/:idea_id/suggestions", post(suggest_for_idea))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Suggestion response.
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    /// Whether a configured provider was actually consulted
    pub available: bool,
    #[serde(flatten)]
    pub suggestions: Suggestions,
}

#[derive(Debug, Deserialize)]
pub struct IdeaPath {
    pub idea_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Suggest tags and next steps for an idea, storing new tags on it.
///
/// POST /ideas/:idea_id/suggestions
///
/// Tags are AI-populated: suggested tags are merged into the idea here
/// rather than edited manually.
#[axum::debug_handler]
async fn suggest_for_idea(
    State(state): State<AppState>,
    Path(path): Path<IdeaPath>,
) -> Result<Json<SuggestionsResponse>> {
    let idea = state
        .store
        .get_idea(&path.idea_id)
        .await
        .ok_or_else(|| Error::NotFound("Idea not found".into()))?;

    let available = state.suggest.is_available();
    let suggestions = if available {
        state.suggest.suggest(&idea.title, &idea.content).await
    } else {
        Suggestions::default()
    };

    // Merged through the store, not written back from the snapshot above:
    // the idea may have been mutated while the provider call was in flight.
    if !suggestions.tags.is_empty() {
        state.store.merge_tags(&path.idea_id, &suggestions.tags).await?;
    }

    Ok(Json(SuggestionsResponse {
        available,
        suggestions,
    }))
}
