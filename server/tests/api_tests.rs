use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docsearch_core::{MemoryStore, SearchEngine};
use docsearch_server::build_app;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    build_app(Arc::new(SearchEngine::new(Arc::new(MemoryStore::new()))))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn upload(app: &Router, title: &str, content: &str) -> u64 {
    let (status, body) = post(
        app,
        "/api/documents",
        json!({ "title": title, "content": content }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    body["id"].as_u64().unwrap()
}

#[tokio::test]
async fn upload_then_search_returns_ranked_results() {
    let app = app();
    let d1 = upload(&app, "cats", "the cat sat on the mat").await;
    upload(&app, "dogs", "the dog sat on the log").await;

    let (status, body) = get(&app, "/api/search?q=cat&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "cat");
    assert_eq!(body["query_terms"], json!(["cat"]));
    assert_eq!(body["count"], 1);
    assert!(body["search_time_seconds"].is_number());

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"].as_u64().unwrap(), d1);
    assert!(results[0]["score"].is_number());
    assert_eq!(results[0]["matched_terms"], json!(["cat"]));
    assert!(results[0]["snippet"].as_str().unwrap().contains("cat"));
}

#[tokio::test]
async fn upload_without_content_is_rejected() {
    let app = app();
    let (status, _) = post(&app, "/api/documents", json!({ "title": "empty" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/documents",
        json!({ "title": "blank", "content": "   " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn untitled_uploads_get_a_default_title() {
    let app = app();
    let (status, body) = post(&app, "/api/documents", json!({ "content": "some text" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Untitled");
}

#[tokio::test]
async fn blank_query_returns_empty_results() {
    let app = app();
    upload(&app, "cats", "the cat sat").await;

    let (status, body) = get(&app, "/api/search?q=&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn negative_limit_clamps_to_empty() {
    let app = app();
    upload(&app, "cats", "the cat sat").await;

    let (status, body) = get(&app, "/api/search?q=cat&limit=-5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn document_roundtrip_and_missing_id() {
    let app = app();
    let id = upload(&app, "cats", "the cat sat on the mat").await;

    let (status, body) = get(&app, &format!("/api/documents/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_u64().unwrap(), id);
    assert_eq!(body["title"], "cats");
    assert_eq!(body["content"], "the cat sat on the mat");
    assert!(body["created_at"].is_string());

    let (status, _) = get(&app, "/api/documents/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rebuild_endpoint_reindexes_everything() {
    let app = app();
    upload(&app, "cats", "the cat sat").await;
    upload(&app, "dogs", "the dog ran").await;

    let (status, body) = post(&app, "/api/index/rebuild", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["processed"], 2);
    assert_eq!(body["failed"], json!([]));

    // The index still answers queries after the full rebuild.
    let (_, body) = get(&app, "/api/search?q=dog&limit=10").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = app();
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
