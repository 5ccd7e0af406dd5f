//! A signed push to main is queued and deployed by the next cycle.

use crate::prelude::*;
use axum::http::StatusCode;

#[tokio::test]
async fn push_to_main_is_queued_then_deployed() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project("svc1");
    let tip = svc1.push_commit("v2");
    let ingress = sandbox.ingress();
    let watcher = sandbox.watcher();

    let (status, body) = ingress.push("svc1", "refs/heads/main").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, queued());
    assert!(sandbox.is_pending("svc1"));

    let reports = watcher.run_cycle().await.unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].project, "svc1");
    match &reports[0].outcome {
        CycleOutcome::Deployed { head, .. } => assert_eq!(head, &tip),
        other => panic!("expected Deployed, got {other:?}"),
    }
    assert!(!sandbox.is_pending("svc1"));
    assert_eq!(svc1.working_copy_head(), tip);
    assert_eq!(svc1.deploys(), vec![tip]);
    assert!(sandbox
        .other_watcher_locks()
        .try_acquire(&id("svc1"))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn nothing_pending_means_nothing_deployed() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project("svc1");
    svc1.push_commit("v2");

    let reports = sandbox.watcher().run_cycle().await.unwrap();

    assert!(reports.is_empty());
    assert!(svc1.deploys().is_empty());
}

#[tokio::test]
async fn each_project_deploys_its_own_working_copy() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project("svc1");
    let svc2 = sandbox.project("svc2");
    let tip1 = svc1.push_commit("svc1 v2");
    let tip2 = svc2.push_commit("svc2 v2");
    let ingress = sandbox.ingress();

    assert_eq!(ingress.push("svc2", "refs/heads/main").await.1, queued());
    assert_eq!(ingress.push("svc1", "refs/heads/main").await.1, queued());

    let reports = sandbox.watcher().run_cycle().await.unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.outcome.is_deployed()));
    assert_eq!(svc1.deploys(), vec![tip1]);
    assert_eq!(svc2.deploys(), vec![tip2]);
}

#[tokio::test]
async fn local_drift_is_discarded_before_deploy() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project("svc1");
    std::fs::write(svc1.workdir.join("app.txt"), "hotfixed on the server").unwrap();
    git(&svc1.workdir, &["commit", "--quiet", "-am", "local hotfix"]);
    let tip = svc1.push_commit("v2");

    sandbox.ingress().push("svc1", "refs/heads/main").await;
    sandbox.watcher().run_cycle().await.unwrap();

    assert_eq!(svc1.working_copy_head(), tip);
    assert_eq!(
        std::fs::read_to_string(svc1.workdir.join("app.txt")).unwrap(),
        "v2"
    );
}
