//! Attachments Routes
//!
//! Encodes uploaded files into self-contained attachment records: a fresh
//! id, a kind classified from the declared media type, and the bytes as a
//! base64 data URL embeddable directly in persisted state. Nothing is
//! written to disk here; the client embeds the returned records into a
//! subsequent idea or update save.
//!
//! Routes:
//! - POST /attachments - Encode a multipart batch of files

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::warn;

use spark_models::Attachment;

use crate::{AppState, Error, Result};

/// Headroom for multipart boundaries and part headers on top of the
/// attachment size cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build attachment routes.
pub fn routes() -> Router<AppState> {
    // axum's default body cap (2MB) sits below the attachment limit; lift
    // it so the handler's own per-file size check is the one that fires.
    let body_limit = crate::config().storage.max_attachment_size + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", post(encode_attachments))
        .layer(DefaultBodyLimit::max(body_limit))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Encoded attachment batch.
#[derive(Debug, Serialize)]
pub struct EncodeAttachmentsResponse {
    pub attachments: Vec<Attachment>,
    pub total: usize,
    /// Number of fields skipped because their content could not be read
    pub skipped: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Encode every file in a multipart form into an attachment record.
///
/// POST /attachments
///
/// The response is produced only after every field has been consumed. A
/// field whose content cannot be read is skipped with a warning; the rest
/// of the batch still encodes. Oversized files reject the whole request.
#[axum::debug_handler]
async fn encode_attachments(
    State(_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EncodeAttachmentsResponse>> {
    let config = crate::config();
    let max_size = config.storage.max_attachment_size;

    let mut attachments = Vec::new();
    let mut skipped = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        // Only fields carrying a file are part of the batch
        let Some(filename) = field.file_name().map(String::from) else {
            continue;
        };

        let media_type = field.content_type().map(String::from);

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                warn!(file = %filename, error = %e, "Unreadable file in batch, skipping");
                skipped += 1;
                continue;
            }
        };

        if data.len() > max_size {
            return Err(Error::FileTooLarge { max_size });
        }

        attachments.push(Attachment::encode(&filename, media_type.as_deref(), &data));
    }

    if attachments.is_empty() && skipped == 0 {
        return Err(Error::Validation("No files in upload".into()));
    }

    let total = attachments.len();

    Ok(Json(EncodeAttachmentsResponse {
        attachments,
        total,
        skipped,
    }))
}
