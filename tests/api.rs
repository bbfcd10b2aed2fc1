//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{CannedChat, FixedRecognizer, test_pipeline};

/// Build a test API router
fn build_test_router() -> axum::Router {
    let pipeline = test_pipeline(
        Arc::new(FixedRecognizer("hello")),
        Arc::new(CannedChat("hi")),
    );
    voice_relay::api::router(pipeline)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root_reports_running() {
    let (status, json) = get_json(build_test_router(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "status": "Backend is running" }));
}

#[tokio::test]
async fn test_root_is_stable_across_calls() {
    let app = build_test_router();

    let (_, first) = get_json(app.clone(), "/").await;
    let (_, second) = get_json(app, "/").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get_json(build_test_router(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ws_route_rejects_plain_get() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ws/audio")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Not an upgrade request
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
