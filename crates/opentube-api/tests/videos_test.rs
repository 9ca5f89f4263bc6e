//! HTTP integration tests for the video routes.
//!
//! Run with: `cargo test -p opentube-api --test videos_test`. The app is built
//! against in-memory catalog and publisher backends, so no database or object
//! store is required.

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use helpers::auth::{admin_token, user_token};
use helpers::inspector::StubInspector;
use helpers::{setup_test_app, setup_test_app_with_inspector};
use opentube_catalog::CatalogWriter;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn video_form(data: &[u8], filename: &str, title: &str) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data.to_vec()))
        .file_name(filename)
        .mime_type("video/mp4");
    MultipartForm::new()
        .add_part("file", part)
        .add_text("title", title)
        .add_text("description", "integration test upload")
}

async fn upload_video(client: &TestServer, token: &str, title: &str) -> serde_json::Value {
    let response = client
        .post("/api/videos")
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(video_form(b"fake mp4 bytes", "clip.mp4", title))
        .await;
    assert_eq!(response.status_code(), 201);
    response.json()
}

#[tokio::test]
async fn health_endpoint_reports_alive() {
    let app = setup_test_app();

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn upload_requires_authentication() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/videos")
        .multipart(video_form(b"fake mp4 bytes", "clip.mp4", "No auth"))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Missing authorization header");
}

#[tokio::test]
async fn upload_rejects_garbage_token() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", "Bearer not-a-jwt")
        .multipart(video_form(b"fake mp4 bytes", "clip.mp4", "Bad token"))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let app = setup_test_app();
    let (_user_id, token) = user_token();

    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(MultipartForm::new().add_text("title", "No file here"))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.catalog.is_empty());
}

#[tokio::test]
async fn upload_creates_asset() {
    let app = setup_test_app();
    let (user_id, token) = user_token();

    let body = upload_video(app.client(), &token, "My first video").await;

    assert_eq!(body["title"], "My first video");
    assert_eq!(body["description"], "integration test upload");
    assert_eq!(body["duration_seconds"], 20.0);
    assert_eq!(body["view_count"], 0);
    assert_eq!(body["visibility"], "public");
    assert_eq!(body["owner_id"], user_id.to_string());
    let video_url = body["video_url"].as_str().unwrap();
    assert!(video_url.starts_with("https://cdn.test/videos/"));
    let thumbnail_url = body["thumbnail_url"].as_str().unwrap();
    assert!(thumbnail_url.starts_with("https://cdn.test/thumbnails/thumb-"));

    assert_eq!(app.catalog.len(), 1);
    assert_eq!(app.publisher.object_count(), 2);
    assert_eq!(app.staged_entry_count(), 0);
}

#[tokio::test]
async fn upload_of_unsupported_media_returns_422() {
    let app = setup_test_app_with_inspector(Arc::new(StubInspector::unsupported()));
    let (_user_id, token) = user_token();

    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(video_form(b"plain text", "notes.txt", "Not a video"))
        .await;

    assert_eq!(response.status_code(), 422);
    assert!(app.catalog.is_empty());
    assert_eq!(app.publisher.object_count(), 0);
    assert_eq!(app.staged_entry_count(), 0);
}

#[tokio::test]
async fn upload_over_body_limit_returns_413() {
    // test_config caps uploads at 1 MB
    let app = setup_test_app();
    let (_user_id, token) = user_token();

    let oversized = vec![0u8; 2 * 1024 * 1024];
    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(video_form(&oversized, "huge.mp4", "Too big"))
        .await;

    assert_eq!(response.status_code(), 413);
    assert!(app.catalog.is_empty());
}

#[tokio::test]
async fn get_unknown_video_returns_404() {
    let app = setup_test_app();

    let response = app
        .client()
        .get(&format!("/api/videos/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn get_video_is_public_and_increments_view_count() {
    let app = setup_test_app();
    let (_user_id, token) = user_token();

    let body = upload_video(app.client(), &token, "Public clip").await;
    let id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();

    // No Authorization header on the read path.
    let response = app.client().get(&format!("/api/videos/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    let fetched: serde_json::Value = response.json();
    assert_eq!(fetched["id"], id.to_string());

    // The increment runs on a background task, so poll for it.
    let mut incremented = false;
    for _ in 0..100 {
        let record = app.catalog.get(id).await.unwrap().unwrap();
        if record.view_count == 1 {
            incremented = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(incremented, "view count was never incremented");
}

#[tokio::test]
async fn list_returns_uploaded_videos() {
    let app = setup_test_app();
    let (_user_id, token) = user_token();

    upload_video(app.client(), &token, "First upload").await;
    upload_video(app.client(), &token, "Second upload").await;

    let response = app.client().get("/api/videos").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let records = body.as_array().expect("expected a JSON array");
    assert_eq!(records.len(), 2);
    let titles: Vec<&str> = records
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"First upload"));
    assert!(titles.contains(&"Second upload"));
}

#[tokio::test]
async fn search_filters_by_title() {
    let app = setup_test_app();
    let (_user_id, token) = user_token();

    upload_video(app.client(), &token, "Cat video").await;
    upload_video(app.client(), &token, "Dog clip").await;

    let response = app.client().get("/api/videos?search=cat").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let records = body.as_array().expect("expected a JSON array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["title"], "Cat video");
}

#[tokio::test]
async fn delete_requires_admin_role() {
    let app = setup_test_app();
    let (_user_id, token) = user_token();

    let body = upload_video(app.client(), &token, "Protected clip").await;
    let id = body["id"].as_str().unwrap();

    let response = app
        .client()
        .delete(&format!("/api/videos/{}", id))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;

    assert_eq!(response.status_code(), 403);
    assert_eq!(app.catalog.len(), 1);
    assert_eq!(app.publisher.object_count(), 2);
}

#[tokio::test]
async fn delete_unknown_video_returns_404() {
    let app = setup_test_app();
    let (_admin_id, token) = admin_token();

    let response = app
        .client()
        .delete(&format!("/api/videos/{}", Uuid::new_v4()))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn delete_removes_asset_and_published_objects() {
    let app = setup_test_app();
    let (_user_id, user_jwt) = user_token();
    let (_admin_id, admin_jwt) = admin_token();

    let body = upload_video(app.client(), &user_jwt, "Doomed clip").await;
    let id = body["id"].as_str().unwrap();
    assert_eq!(app.publisher.object_count(), 2);

    let response = app
        .client()
        .delete(&format!("/api/videos/{}", id))
        .add_header("Authorization", format!("Bearer {}", admin_jwt))
        .await;

    assert_eq!(response.status_code(), 204);
    assert!(app.catalog.is_empty());
    assert_eq!(app.publisher.object_count(), 0);

    // The row is gone, so a second delete is a 404.
    let again = app
        .client()
        .delete(&format!("/api/videos/{}", id))
        .add_header("Authorization", format!("Bearer {}", admin_jwt))
        .await;
    assert_eq!(again.status_code(), 404);
}

#[tokio::test]
async fn delete_proceeds_when_unpublish_fails() {
    let app = setup_test_app();
    let (_user_id, user_jwt) = user_token();
    let (_admin_id, admin_jwt) = admin_token();

    let body = upload_video(app.client(), &user_jwt, "Stuck clip").await;
    let id = body["id"].as_str().unwrap();

    app.publisher.fail_unpublishes_matching("videos/");

    let response = app
        .client()
        .delete(&format!("/api/videos/{}", id))
        .add_header("Authorization", format!("Bearer {}", admin_jwt))
        .await;

    // The catalog row is deleted even though the video object is stuck.
    assert_eq!(response.status_code(), 204);
    assert!(app.catalog.is_empty());
    assert_eq!(app.publisher.object_count(), 1);
}
