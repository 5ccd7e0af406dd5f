//! Pushes that arrive before the next cycle collapse into one deploy of
//! the latest state.

use crate::prelude::*;

#[tokio::test]
async fn back_to_back_pushes_deploy_once_at_latest_tip() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project("svc1");
    let ingress = sandbox.ingress();

    let first = svc1.push_commit("v2");
    assert_eq!(ingress.push("svc1", "refs/heads/main").await.1, queued());
    let second = svc1.push_commit("v3");
    assert_eq!(ingress.push("svc1", "refs/heads/main").await.1, queued());
    assert_ne!(first, second);

    let reports = sandbox.watcher().run_cycle().await.unwrap();

    assert_eq!(reports.len(), 1);
    match &reports[0].outcome {
        CycleOutcome::Deployed { head, .. } => assert_eq!(head, &second),
        other => panic!("expected Deployed, got {other:?}"),
    }
    assert_eq!(svc1.deploys(), vec![second]);
    assert!(!sandbox.is_pending("svc1"));
}

#[tokio::test]
async fn push_after_cycle_triggers_another_deploy() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project("svc1");
    let ingress = sandbox.ingress();
    let watcher = sandbox.watcher();

    let v2 = svc1.push_commit("v2");
    ingress.push("svc1", "refs/heads/main").await;
    watcher.run_cycle().await.unwrap();

    let v3 = svc1.push_commit("v3");
    ingress.push("svc1", "refs/heads/main").await;
    watcher.run_cycle().await.unwrap();

    assert_eq!(svc1.deploys(), vec![v2, v3]);
}
