//! Failed syncs and deploys are reported, release the lock, and are not
//! retried until the next push.

use crate::prelude::*;

const FAILING_DEPLOY_SCRIPT: &str = r#"#!/bin/sh
echo "building image" >&2
echo "error: registry unreachable" >&2
exit 3
"#;

#[tokio::test]
async fn failing_deploy_is_reported_and_not_requeued() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project_with_script("svc1", FAILING_DEPLOY_SCRIPT);
    let ingress = sandbox.ingress();
    let watcher = sandbox.watcher();

    ingress.push("svc1", "refs/heads/main").await;
    let reports = watcher.run_cycle().await.unwrap();

    assert_eq!(
        reports[0].outcome,
        CycleOutcome::DeployFailed {
            exit_code: Some(3),
            timed_out: false,
            reason: None,
        }
    );
    assert!(!sandbox.is_pending("svc1"));
    assert!(watcher.run_cycle().await.unwrap().is_empty());

    // the next push deploys the fixed script
    let fixed = svc1.push_script(RECORDING_DEPLOY_SCRIPT);
    ingress.push("svc1", "refs/heads/main").await;
    let reports = watcher.run_cycle().await.unwrap();
    assert!(reports[0].outcome.is_deployed());
    assert_eq!(svc1.deploys(), vec![fixed]);
}

#[tokio::test]
async fn missing_working_copy_is_a_sync_failure() {
    let sandbox = Sandbox::new();
    let ingress = sandbox.ingress();

    assert_eq!(ingress.push("ghost", "refs/heads/main").await.1, queued());
    let reports = sandbox.watcher().run_cycle().await.unwrap();

    assert!(matches!(reports[0].outcome, CycleOutcome::SyncFailed(_)));
    assert!(!sandbox.is_pending("ghost"));
    assert!(sandbox
        .other_watcher_locks()
        .try_acquire(&id("ghost"))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn one_failing_project_does_not_stop_the_others() {
    let sandbox = Sandbox::new();
    sandbox.project_with_script("bad", FAILING_DEPLOY_SCRIPT);
    let good = sandbox.project("good");
    let tip = good.push_commit("v2");
    let ingress = sandbox.ingress();

    ingress.push("bad", "refs/heads/main").await;
    ingress.push("ghost", "refs/heads/main").await;
    ingress.push("good", "refs/heads/main").await;
    let reports = sandbox.watcher().run_cycle().await.unwrap();

    let names: Vec<&str> = reports.iter().map(|r| r.project.as_str()).collect();
    assert_eq!(names, vec!["bad", "ghost", "good"]);
    assert!(matches!(reports[0].outcome, CycleOutcome::DeployFailed { .. }));
    assert!(matches!(reports[1].outcome, CycleOutcome::SyncFailed(_)));
    assert!(reports[2].outcome.is_deployed());
    assert_eq!(good.deploys(), vec![tip]);
}
