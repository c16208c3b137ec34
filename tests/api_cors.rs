// tests/api_cors.rs
//
// Per-route CORS allow-lists, checked on simple GETs and on preflights.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt as _;

use bluesky_digest::feed::StaticFeed;
use bluesky_digest::llm::ScriptedClient;
use bluesky_digest::{router, AppState, ServiceConfig};

fn cors_router() -> Router {
    let mut cfg = ServiceConfig::default();
    cfg.cors.default = vec!["https://digest.example".into()];
    cfg.cors
        .routes
        .insert("/check_opportunity".into(), vec!["https://jobs.example".into()]);
    cfg.cors.routes.insert("/ask".into(), vec!["*".into()]);

    router(AppState::new(
        cfg,
        Arc::new(StaticFeed::posts(vec![])),
        Arc::new(ScriptedClient::text("true")),
    ))
}

async fn allow_origin_for(uri: &str, origin: &str) -> Option<String> {
    let req = Request::builder()
        .uri(uri)
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap();
    let resp = cors_router().oneshot(req).await.unwrap();
    resp.headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn default_list_applies_to_routes_without_override() {
    assert_eq!(
        allow_origin_for("/summarize_posts", "https://digest.example").await,
        Some("https://digest.example".to_string())
    );
    assert_eq!(
        allow_origin_for("/summarize_posts", "https://evil.example").await,
        None
    );
}

#[tokio::test]
async fn route_override_replaces_default() {
    assert_eq!(
        allow_origin_for("/check_opportunity?text=x", "https://jobs.example").await,
        Some("https://jobs.example".to_string())
    );
    assert_eq!(
        allow_origin_for("/check_opportunity?text=x", "https://digest.example").await,
        None
    );
}

#[tokio::test]
async fn wildcard_allows_any_origin() {
    assert_eq!(
        allow_origin_for("/ask?question=hi", "https://anyone.example").await,
        Some("*".to_string())
    );
}

#[tokio::test]
async fn preflight_is_answered_for_allowed_origin() {
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/extract_keywords")
        .header(header::ORIGIN, "https://digest.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let resp = cors_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://digest.example")
    );
}
