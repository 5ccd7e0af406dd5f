//! Well-signed deliveries that are not deployable pushes are answered with
//! `ok: true` and leave the mailbox untouched.

use crate::prelude::*;
use axum::http::StatusCode;

#[tokio::test]
async fn pull_request_event_is_ignored() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project("svc1");

    let (status, body) = sandbox
        .ingress()
        .deliver("pull_request", &push_body("svc1", "refs/heads/main"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ignored("not a push"));
    assert!(!sandbox.is_pending("svc1"));
    assert!(sandbox.watcher().run_cycle().await.unwrap().is_empty());
    assert!(svc1.deploys().is_empty());
}

#[tokio::test]
async fn push_to_other_branch_is_ignored() {
    let sandbox = Sandbox::new();

    let (status, body) = sandbox.ingress().push("svc1", "refs/heads/feature").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ignored("not main"));
    assert!(!sandbox.mailbox_root().join("svc1").exists());
}

#[tokio::test]
async fn tag_push_is_ignored() {
    let sandbox = Sandbox::new();

    let (_, body) = sandbox.ingress().push("svc1", "refs/tags/main").await;

    assert_eq!(body, ignored("not main"));
}

#[tokio::test]
async fn unsafe_repository_name_is_ignored() {
    let sandbox = Sandbox::new();

    for name in ["../escape", "svc 1", ".hidden", ""] {
        let (status, body) = sandbox.ingress().push(name, "refs/heads/main").await;
        assert_eq!(status, StatusCode::OK, "name {name:?}");
        assert_eq!(body, ignored("invalid repository"), "name {name:?}");
    }
    assert!(!sandbox.mailbox_root().exists());
    assert!(!sandbox.path().join("escape").exists());
}
