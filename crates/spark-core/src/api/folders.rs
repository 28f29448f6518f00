//! Folders Routes
//!
//! Folder management. Deleting a folder never deletes its ideas: the store
//! reassigns them to uncategorized in the same transaction.
//!
//! Routes:
//! - GET /folders - List folders
//! - POST /folders - Create a folder
//! - DELETE /folders/:id?confirm=true - Delete a folder

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use spark_models::Folder;

use super::Confirm;
use crate::{AppState, Error, Result};

/// Build folder routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_folders).post(create_folder))
        .route("/:folder_id", axum::routing::delete(delete_folder))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a folder.
#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

/// List folders response.
#[derive(Debug, Serialize)]
pub struct ListFoldersResponse {
    pub folders: Vec<Folder>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct FolderPath {
    pub folder_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List folders in creation order.
///
/// GET /folders
#[axum::debug_handler]
async fn list_folders(State(state): State<AppState>) -> Result<Json<ListFoldersResponse>> {
    let folders = state.store.folders().await;
    let total = folders.len();

    Ok(Json(ListFoldersResponse { folders, total }))
}

/// Create a folder.
///
/// POST /folders
#[axum::debug_handler]
async fn create_folder(
    State(state): State<AppState>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<Json<Folder>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Folder name cannot be empty".into()));
    }

    let folder = state.store.create_folder(name).await?;
    Ok(Json(folder))
}

/// Delete a folder, uncategorizing its ideas in the same transaction.
/// Requires explicit confirmation.
///
/// DELETE /folders/:folder_id?confirm=true
#[axum::debug_handler]
async fn delete_folder(
    State(state): State<AppState>,
    Path(path): Path<FolderPath>,
    Query(confirm): Query<Confirm>,
) -> Result<Json<serde_json::Value>> {
    confirm.require()?;

    if !state.store.delete_folder(&path.folder_id).await? {
        return Err(Error::NotFound("Folder not found".into()));
    }

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": path.folder_id
    })))
}
