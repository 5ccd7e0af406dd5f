//! Unauthenticated or unreadable deliveries are errors and never queue.

use crate::prelude::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dq_ingress::{EVENT_HEADER, SIGNATURE_HEADER};

#[tokio::test]
async fn forged_signature_is_rejected() {
    let sandbox = Sandbox::new();
    let body = push_body("svc1", "refs/heads/main");
    let request = Request::post("/webhook/github")
        .header(EVENT_HEADER, "push")
        .header(SIGNATURE_HEADER, github_signature("guessed", &body))
        .body(Body::from(body))
        .unwrap();

    let (status, body) = sandbox.ingress().send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
    assert!(!sandbox.is_pending("svc1"));
}

#[tokio::test]
async fn unsigned_delivery_is_rejected() {
    let sandbox = Sandbox::new();
    let request = Request::post("/webhook/github")
        .header(EVENT_HEADER, "push")
        .body(Body::from(push_body("svc1", "refs/heads/main")))
        .unwrap();

    let (status, _) = sandbox.ingress().send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!sandbox.is_pending("svc1"));
}

#[tokio::test]
async fn signed_garbage_is_a_bad_request() {
    let sandbox = Sandbox::new();

    let (status, body) = sandbox.ingress().deliver("push", "ref=refs/heads/main").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid JSON");
}

#[tokio::test]
async fn health_needs_no_signature() {
    let sandbox = Sandbox::new();
    let request = Request::get("/health").body(Body::empty()).unwrap();

    let (status, body) = sandbox.ingress().send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
