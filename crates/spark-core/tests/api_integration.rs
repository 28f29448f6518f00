//! HTTP API integration tests for the Spark server.
//!
//! Each test spins up the full router against a store backed by a fresh
//! temp directory and an unconfigured suggestion service.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};

use spark_core::{api, AppState};
use spark_llm::{SuggestConfig, SuggestService};
use spark_store::{JournalStore, JsonFilePort};

// ============================================================================
// Test Setup Helpers
// ============================================================================

/// Start a test server over a fresh temp-dir-backed store. The directory
/// guard is returned so it outlives the server.
async fn setup_server() -> (TestServer, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let port = Arc::new(JsonFilePort::new(dir.path()));
    let store = Arc::new(
        JournalStore::open(port)
            .await
            .expect("Failed to open store"),
    );
    let suggest = Arc::new(SuggestService::new(&SuggestConfig::default()));

    let app: Router = Router::new()
        .merge(api::routes())
        .with_state(AppState::with_services(store, suggest));

    let server = TestServer::new(app).expect("Failed to start test server");
    (server, dir)
}

/// Create an idea through the API and return its JSON.
async fn create_idea(server: &TestServer, title: &str, content: &str) -> Value {
    let response = server
        .post("/ideas")
        .json(&json!({ "title": title, "content": content }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id field").to_string()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (server, _dir) = setup_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "spark");
}

// ============================================================================
// Ideas
// ============================================================================

#[tokio::test]
async fn test_create_and_get_idea() {
    let (server, _dir) = setup_server().await;

    let idea = create_idea(&server, "Solar tracker", "track the sun").await;
    assert_eq!(idea["title"], "Solar tracker");
    assert_eq!(idea["status"], "active");
    assert!(idea.get("folder_id").is_none());

    let response = server.get(&format!("/ideas/{}", id_of(&idea))).await;
    response.assert_status_ok();
    let detail = response.json::<Value>();
    assert_eq!(detail["idea"]["title"], "Solar tracker");
    assert_eq!(detail["timeline"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_idea_requires_title() {
    let (server, _dir) = setup_server().await;

    let response = server
        .post("/ideas")
        .json(&json!({ "title": "   ", "content": "x" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_dangling_folder_reference_degrades_to_uncategorized() {
    let (server, _dir) = setup_server().await;

    let response = server
        .post("/ideas")
        .json(&json!({ "title": "A", "content": "x", "folder_id": "no-such-folder" }))
        .await;
    response.assert_status_ok();

    let idea = response.json::<Value>();
    assert!(idea.get("folder_id").is_none());
}

#[tokio::test]
async fn test_list_filters_by_search() {
    let (server, _dir) = setup_server().await;

    create_idea(&server, "Solar tracker", "panel angles").await;
    create_idea(&server, "Grocery app", "shopping lists").await;

    let response = server.get("/ideas").add_query_param("q", "SOLAR").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["ideas"][0]["title"], "Solar tracker");
}

#[tokio::test]
async fn test_list_newest_first() {
    let (server, _dir) = setup_server().await;

    create_idea(&server, "first", "").await;
    create_idea(&server, "second", "").await;

    let body = server.get("/ideas").await.json::<Value>();
    assert_eq!(body["ideas"][0]["title"], "second");
    assert_eq!(body["ideas"][1]["title"], "first");
}

#[tokio::test]
async fn test_grouped_view_buckets_by_month() {
    let (server, _dir) = setup_server().await;

    create_idea(&server, "a", "").await;
    create_idea(&server, "b", "").await;

    let body = server.get("/ideas/grouped").await.json::<Value>();
    let groups = body["groups"].as_array().unwrap();
    // Both created just now, so exactly one month bucket, newest first.
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["ideas"].as_array().unwrap().len(), 2);
    assert_eq!(groups[0]["ideas"][0]["title"], "b");
}

#[tokio::test]
async fn test_patch_idea() {
    let (server, _dir) = setup_server().await;
    let idea = create_idea(&server, "old", "body").await;

    let response = server
        .put(&format!("/ideas/{}", id_of(&idea)))
        .json(&json!({ "title": "new", "status": "completed" }))
        .await;
    response.assert_status_ok();

    let patched = response.json::<Value>();
    assert_eq!(patched["title"], "new");
    assert_eq!(patched["status"], "completed");
    assert_eq!(patched["content"], "body");
}

#[tokio::test]
async fn test_delete_requires_confirm() {
    let (server, _dir) = setup_server().await;
    let idea = create_idea(&server, "keep me", "").await;

    let response = server.delete(&format!("/ideas/{}", id_of(&idea))).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // No mutation was issued.
    let body = server.get("/ideas").await.json::<Value>();
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_delete_with_confirm() {
    let (server, _dir) = setup_server().await;
    let idea = create_idea(&server, "doomed", "").await;

    let response = server
        .delete(&format!("/ideas/{}", id_of(&idea)))
        .add_query_param("confirm", "true")
        .await;
    response.assert_status_ok();

    let body = server.get("/ideas").await.json::<Value>();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_unknown_idea_is_404() {
    let (server, _dir) = setup_server().await;

    server
        .get("/ideas/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .put("/ideas/missing")
        .json(&json!({ "title": "x" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/ideas/missing")
        .add_query_param("confirm", "true")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Folders
// ============================================================================

#[tokio::test]
async fn test_folder_lifecycle_uncategorizes_ideas() {
    let (server, _dir) = setup_server().await;

    let response = server
        .post("/folders")
        .json(&json!({ "name": "F1" }))
        .await;
    response.assert_status_ok();
    let folder = response.json::<Value>();
    let folder_id = id_of(&folder);

    let response = server
        .post("/ideas")
        .json(&json!({ "title": "A", "content": "x", "folder_id": folder_id }))
        .await;
    response.assert_status_ok();
    let idea = response.json::<Value>();
    assert_eq!(idea["folder_id"], folder_id);

    // Folder-scoped filter sees it.
    let body = server
        .get("/ideas")
        .add_query_param("folder", &folder_id)
        .await
        .json::<Value>();
    assert_eq!(body["total"], 1);

    // Delete the folder; the idea survives and becomes uncategorized.
    server
        .delete(&format!("/folders/{}", folder_id))
        .add_query_param("confirm", "true")
        .await
        .assert_status_ok();

    let body = server
        .get("/ideas")
        .add_query_param("folder", "uncategorized")
        .await
        .json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["ideas"][0]["title"], "A");
    assert!(body["ideas"][0].get("folder_id").is_none());

    let body = server.get("/folders").await.json::<Value>();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_folder_name_required() {
    let (server, _dir) = setup_server().await;

    server
        .post("/folders")
        .json(&json!({ "name": "  " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Timeline updates
// ============================================================================

#[tokio::test]
async fn test_update_lifecycle() {
    let (server, _dir) = setup_server().await;
    let idea = create_idea(&server, "I", "").await;
    let idea_id = id_of(&idea);

    // Append
    let response = server
        .post(&format!("/ideas/{}/updates", idea_id))
        .json(&json!({ "content": "done", "kind": "milestone" }))
        .await;
    response.assert_status_ok();
    let entry = response.json::<Value>();
    assert_eq!(entry["kind"], "milestone");
    let update_id = id_of(&entry);

    // Edit in place
    let response = server
        .put(&format!("/ideas/{}/updates/{}", idea_id, update_id))
        .json(&json!({ "content": "really done" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["content"], "really done");

    // The detail view groups the timeline by day.
    let detail = server.get(&format!("/ideas/{}", idea_id)).await.json::<Value>();
    let timeline = detail["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0]["updates"][0]["content"], "really done");

    // last_modified advanced past creation.
    let created_at = detail["idea"]["created_at"].as_str().unwrap();
    let last_modified = detail["idea"]["last_modified"].as_str().unwrap();
    assert!(last_modified >= created_at);

    // Delete the entry (with confirmation).
    server
        .delete(&format!("/ideas/{}/updates/{}", idea_id, update_id))
        .add_query_param("confirm", "true")
        .await
        .assert_status_ok();

    let detail = server.get(&format!("/ideas/{}", idea_id)).await.json::<Value>();
    assert_eq!(detail["idea"]["updates"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_update_content_required() {
    let (server, _dir) = setup_server().await;
    let idea = create_idea(&server, "I", "").await;

    server
        .post(&format!("/ideas/{}/updates", id_of(&idea)))
        .json(&json!({ "content": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Attachments
// ============================================================================

/// Build a single-file multipart body by hand so the request passes
/// through the real body-limit layer.
fn multipart_upload(filename: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "spark-upload-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

#[tokio::test]
async fn test_encode_attachment_batch() {
    let (server, _dir) = setup_server().await;
    let (content_type, body) = multipart_upload("pixel.png", "image/png", &[1, 2, 3]);

    let response = server
        .post("/attachments")
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    response.assert_status_ok();

    let parsed = response.json::<Value>();
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["skipped"], 0);
    assert_eq!(parsed["attachments"][0]["kind"], "image");
    assert_eq!(parsed["attachments"][0]["name"], "pixel.png");
}

#[tokio::test]
async fn test_attachment_above_default_body_cap_encodes() {
    // 3MB: over axum's stock 2MB body cap, under the attachment limit.
    let (server, _dir) = setup_server().await;
    let (content_type, body) =
        multipart_upload("big.bin", "application/octet-stream", &vec![7u8; 3 * 1024 * 1024]);

    let response = server
        .post("/attachments")
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["attachments"][0]["kind"], "file");
}

#[tokio::test]
async fn test_oversized_attachment_is_rejected_as_too_large() {
    // One byte over the 10MB attachment cap, still inside the lifted body
    // limit, so the handler's own check produces the error.
    let (server, _dir) = setup_server().await;
    let (content_type, body) = multipart_upload(
        "huge.bin",
        "application/octet-stream",
        &vec![7u8; 10 * 1024 * 1024 + 1],
    );

    let response = server
        .post("/attachments")
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["error"]["code"], "FILE_TOO_LARGE");
}

// ============================================================================
// Suggestions
// ============================================================================

#[tokio::test]
async fn test_suggestions_degrade_without_provider() {
    let (server, _dir) = setup_server().await;
    let idea = create_idea(&server, "A", "x").await;

    let response = server
        .post(&format!("/ideas/{}/suggestions", id_of(&idea)))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["available"], false);
    assert_eq!(body["tags"].as_array().unwrap().len(), 0);
    assert_eq!(body["next_steps"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_suggestions_unknown_idea_is_404() {
    let (server, _dir) = setup_server().await;

    server
        .post("/ideas/missing/suggestions")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
