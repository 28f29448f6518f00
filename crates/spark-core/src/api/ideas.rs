//! Ideas Routes
//!
//! CRUD and derived views for ideas, plus the per-idea timeline of updates.
//!
//! Routes:
//! - GET /ideas - List ideas (filtered by folder selector and search text)
//! - GET /ideas/grouped - Filtered ideas bucketed by creation month
//! - POST /ideas - Create an idea
//! - GET /ideas/:id - Get an idea plus its timeline grouped by day
//! - PUT /ideas/:id - Patch an idea
//! - DELETE /ideas/:id?confirm=true - Delete an idea
//! - POST /ideas/:id/updates - Append a timeline entry
//! - PUT /ideas/:id/updates/:update_id - Edit a timeline entry
//! - DELETE /ideas/:id/updates/:update_id?confirm=true - Remove an entry

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

use spark_models::query::{filter_ideas, group_by_month, group_updates_by_day, DayGroup, FolderFilter, MonthGroup};
use spark_models::{Idea, IdeaDraft, IdeaPatch, IdeaUpdate, UpdateDraft, UpdatePatch};

use super::Confirm;
use crate::{AppState, Error, Result};

/// Build idea routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ideas).post(create_idea))
        .route("/grouped", get(grouped_ideas))
        .route(
            "/:idea_id",
            get(get_idea).put(update_idea).delete(delete_idea),
        )
        .route("/:idea_id/updates", post(add_update))
        .route(
            "/:idea_id/updates/:update_id",
            axum::routing::put(edit_update).delete(delete_update),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing ideas.
#[derive(Debug, Deserialize, Default)]
pub struct ListIdeasQuery {
    /// Folder selector: "all" (default), "uncategorized", or a folder id
    pub folder: Option<String>,
    /// Case-insensitive substring search over title, content, and tags
    pub q: Option<String>,
}

impl ListIdeasQuery {
    fn filter(&self) -> FolderFilter {
        self.folder
            .as_deref()
            .map(FolderFilter::from_selector)
            .unwrap_or_default()
    }
}

/// List ideas response.
#[derive(Debug, Serialize)]
pub struct ListIdeasResponse {
    pub ideas: Vec<Idea>,
    pub total: usize,
}

/// Month-grouped ideas response.
#[derive(Debug, Serialize)]
pub struct GroupedIdeasResponse {
    pub groups: Vec<MonthGroup>,
}

/// Idea detail: the idea plus its timeline as a derived day-grouped view.
#[derive(Debug, Serialize)]
pub struct IdeaDetailResponse {
    pub idea: Idea,
    pub timeline: Vec<DayGroup>,
}

// ============================================================================
// Path Extractors
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IdeaPath {
    pub idea_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePath {
    pub idea_id: String,
    pub update_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List ideas, filtered by folder selector and search text.
///
/// GET /ideas?folder=all|uncategorized|<id>&q=<text>
#[axum::debug_handler]
async fn list_ideas(
    State(state): State<AppState>,
    Query(query): Query<ListIdeasQuery>,
) -> Result<Json<ListIdeasResponse>> {
    let ideas = state.store.ideas().await;
    let ideas = filter_ideas(&ideas, &query.filter(), query.q.as_deref());
    let total = ideas.len();

    Ok(Json(ListIdeasResponse { ideas, total }))
}

/// Filtered ideas bucketed by creation month, newest month first.
///
/// GET /ideas/grouped?folder=...&q=...
#[axum::debug_handler]
async fn grouped_ideas(
    State(state): State<AppState>,
    Query(query): Query<ListIdeasQuery>,
) -> Result<Json<GroupedIdeasResponse>> {
    let ideas = state.store.ideas().await;
    let ideas = filter_ideas(&ideas, &query.filter(), query.q.as_deref());

    Ok(Json(GroupedIdeasResponse {
        groups: group_by_month(ideas),
    }))
}

/// Create a new idea from a draft.
///
/// POST /ideas
#[axum::debug_handler]
async fn create_idea(
    State(state): State<AppState>,
    Json(mut draft): Json<IdeaDraft>,
) -> Result<Json<Idea>> {
    if draft.title.trim().is_empty() {
        return Err(Error::Validation("Title cannot be empty".into()));
    }

    // A reference to a non-existent folder degrades to uncategorized.
    draft.folder_id = resolve_folder(&state, draft.folder_id).await;

    let idea = state.store.create_idea(draft).await?;
    Ok(Json(idea))
}

/// Get an idea plus its timeline grouped by calendar day.
///
/// GET /ideas/:idea_id
#[axum::debug_handler]
async fn get_idea(
    State(state): State<AppState>,
    Path(path): Path<IdeaPath>,
) -> Result<Json<IdeaDetailResponse>> {
    let idea = state
        .store
        .get_idea(&path.idea_id)
        .await
        .ok_or_else(|| Error::NotFound("Idea not found".into()))?;

    let timeline = group_updates_by_day(&idea.updates);

    Ok(Json(IdeaDetailResponse { idea, timeline }))
}

/// Patch an idea.
///
/// PUT /ideas/:idea_id
#[axum::debug_handler]
async fn update_idea(
    State(state): State<AppState>,
    Path(path): Path<IdeaPath>,
    Json(mut patch): Json<IdeaPatch>,
) -> Result<Json<Idea>> {
    patch.folder_id = resolve_folder(&state, patch.folder_id).await;

    state
        .store
        .patch_idea(&path.idea_id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("Idea not found".into()))
}

/// Delete an idea. Requires explicit confirmation; does not cascade to
/// folders.
///
/// DELETE /ideas/:idea_id?confirm=true
#[axum::debug_handler]
async fn delete_idea(
    State(state): State<AppState>,
    Path(path): Path<IdeaPath>,
    Query(confirm): Query<Confirm>,
) -> Result<Json<serde_json::Value>> {
    confirm.require()?;

    if !state.store.delete_idea(&path.idea_id).await? {
        return Err(Error::NotFound("Idea not found".into()));
    }

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": path.idea_id
    })))
}

/// Append a timeline entry to an idea.
///
/// POST /ideas/:idea_id/updates
#[axum::debug_handler]
async fn add_update(
    State(state): State<AppState>,
    Path(path): Path<IdeaPath>,
    Json(draft): Json<UpdateDraft>,
) -> Result<Json<IdeaUpdate>> {
    if draft.content.trim().is_empty() {
        return Err(Error::Validation("Update content cannot be empty".into()));
    }

    state
        .store
        .add_update(&path.idea_id, draft)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("Idea not found".into()))
}

/// Edit a timeline entry in place.
///
/// PUT /ideas/:idea_id/updates/:update_id
#[axum::debug_handler]
async fn edit_update(
    State(state): State<AppState>,
    Path(path): Path<UpdatePath>,
    Json(patch): Json<UpdatePatch>,
) -> Result<Json<IdeaUpdate>> {
    state
        .store
        .edit_update(&path.idea_id, &path.update_id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("Update not found".into()))
}

/// Remove a timeline entry. Requires explicit confirmation.
///
/// DELETE /ideas/:idea_id/updates/:update_id?confirm=true
#[axum::debug_handler]
async fn delete_update(
    State(state): State<AppState>,
    Path(path): Path<UpdatePath>,
    Query(confirm): Query<Confirm>,
) -> Result<Json<Idea>> {
    confirm.require()?;

    state
        .store
        .delete_update(&path.idea_id, &path.update_id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("Update not found".into()))
}

/// Drop a folder reference that does not resolve to an existing folder.
async fn resolve_folder(state: &AppState, folder_id: Option<String>) -> Option<String> {
    match folder_id {
        Some(id) => {
            if state.store.get_folder(&id).await.is_some() {
                Some(id)
            } else {
                warn!(folder_id = %id, "Unknown folder reference, treating as uncategorized");
                None
            }
        }
        None => None,
    }
}
