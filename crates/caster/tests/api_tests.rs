//! API integration tests.

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use caster::relay::{ChatHub, ChatSession, assistant_line, user_line};
use caster::server::{self, AppState};
use common::{MockReply, spawn_upstream, test_client};

/// Create a test application wired to a mock upstream.
async fn test_app(reply: MockReply) -> Router {
    let upstream = spawn_upstream(reply).await;
    let (hub, router) = ChatHub::new();
    tokio::spawn(router.run());
    let session = Arc::new(ChatSession::new(test_client(&upstream.url), hub.clone(), None));
    server::create_router(AppState::new(session, hub, false))
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(MockReply::Chat("unused".to_string())).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_chat_page_is_served() {
    let app = test_app(MockReply::Chat("unused".to_string())).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.contains("<form"));
    assert!(page.contains("/ws"));
}

#[tokio::test]
async fn test_send_returns_rendered_exchange() {
    let app = test_app(MockReply::Chat("Sure.".to_string())).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/send")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("message=Hi+there"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(
        html,
        format!("{}{}", user_line("Hi there"), assistant_line("Sure."))
    );
}

#[tokio::test]
async fn test_send_empty_message_is_bad_request() {
    let app = test_app(MockReply::Chat("unused".to_string())).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/send")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("message=++"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_send_upstream_failure_is_bad_gateway() {
    let app = test_app(MockReply::Error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "boom".to_string(),
    ))
    .await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/send")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("message=Hi"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "BAD_GATEWAY");
    assert!(json["error"]["message"].as_str().unwrap().contains("boom"));
}
