//! A project whose lock is held elsewhere is deferred, never double-run.

use crate::prelude::*;

#[tokio::test]
async fn busy_project_stays_pending_until_lock_is_released() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project("svc1");
    let ingress = sandbox.ingress();
    let watcher = sandbox.watcher();
    let other = sandbox.other_watcher_locks();

    let held = other.try_acquire(&id("svc1")).unwrap().unwrap();
    ingress.push("svc1", "refs/heads/main").await;

    let reports = watcher.run_cycle().await.unwrap();
    assert_eq!(reports[0].outcome, CycleOutcome::Busy);
    assert!(sandbox.is_pending("svc1"));
    assert!(svc1.deploys().is_empty());

    let tip = svc1.push_commit("v2");
    ingress.push("svc1", "refs/heads/main").await;
    drop(held);

    let reports = watcher.run_cycle().await.unwrap();
    assert!(reports[0].outcome.is_deployed());
    assert_eq!(svc1.deploys(), vec![tip]);
}

#[tokio::test]
async fn two_watchers_deploy_a_project_once() {
    let sandbox = Sandbox::new();
    let svc1 = sandbox.project_with_script(
        "svc1",
        "#!/bin/sh\nsleep 1\ngit rev-parse HEAD >> \"../$(basename \"$PWD\")-deploys.log\"\n",
    );
    sandbox.ingress().push("svc1", "refs/heads/main").await;

    let first = sandbox.watcher();
    let second = sandbox.watcher();
    let (a, b) = tokio::join!(first.run_cycle(), second.run_cycle());

    let deployed = a
        .unwrap()
        .into_iter()
        .chain(b.unwrap())
        .filter(|r| r.outcome.is_deployed())
        .count();
    assert_eq!(deployed, 1);
    assert_eq!(svc1.deploys().len(), 1);
}
