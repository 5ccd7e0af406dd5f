//! Test helpers for the end-to-end scenarios.
//!
//! A [`Sandbox`] owns one temporary directory holding the mailbox, the
//! watcher state, bare "origin" repositories, developer clones and the
//! deploy working copies.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use dq_adapters::{GitCliAdapter, ScriptDeployAdapter, TracedDeploy, TracedGit};
use dq_ingress::{router, AppState, IngressConfig, EVENT_HEADER, SIGNATURE_HEADER};
use dq_storage::{Mailbox, ProjectLocks};
use dq_watcher::{Watcher, WatcherConfig};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use tempfile::TempDir;
use tower::ServiceExt;

pub use dq_core::ProjectId;
pub use dq_watcher::CycleOutcome;

pub const SECRET: &str = "e2e-webhook-secret";

/// Records the deployed commit next to the working copy.
pub const RECORDING_DEPLOY_SCRIPT: &str = r#"#!/bin/sh
set -e
git rev-parse HEAD >> "../$(basename "$PWD")-deploys.log"
"#;

pub type RealWatcher = Watcher<TracedGit<GitCliAdapter>, TracedDeploy<ScriptDeployAdapter>>;

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "dq e2e")
        .env("GIT_AUTHOR_EMAIL", "dq@example.com")
        .env("GIT_COMMITTER_NAME", "dq e2e")
        .env("GIT_COMMITTER_EMAIL", "dq@example.com")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub struct Sandbox {
    tmp: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            tmp: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn mailbox_root(&self) -> PathBuf {
        self.path().join("jobs")
    }

    pub fn lock_dir(&self) -> PathBuf {
        self.path().join("state/locks")
    }

    pub fn projects_root(&self) -> PathBuf {
        self.path().join("projects")
    }

    pub fn mailbox(&self) -> Mailbox {
        Mailbox::new(self.mailbox_root())
    }

    /// Lock directory as seen by a second watcher process
    pub fn other_watcher_locks(&self) -> ProjectLocks {
        ProjectLocks::new(self.lock_dir())
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.mailbox().is_pending(&id(name))
    }

    pub fn ingress(&self) -> Ingress {
        let mut config = IngressConfig::with_secret(SECRET).unwrap();
        config.settings.mailbox_root = self.mailbox_root();
        Ingress {
            app: router(AppState::new(config)),
        }
    }

    pub fn watcher(&self) -> RealWatcher {
        let config = WatcherConfig::new(self.mailbox_root(), self.lock_dir(), self.projects_root());
        Watcher::new(
            config,
            TracedGit::new(GitCliAdapter::new()),
            TracedDeploy::new(ScriptDeployAdapter::new()),
        )
    }

    /// Origin repository, developer clone and deploy working copy for
    /// `name`, with the recording deploy script committed on main.
    pub fn project(&self, name: &str) -> Project {
        self.project_with_script(name, RECORDING_DEPLOY_SCRIPT)
    }

    pub fn project_with_script(&self, name: &str, script: &str) -> Project {
        let origin = self.path().join("origins").join(format!("{name}.git"));
        let dev = self.path().join("dev").join(name);
        let workdir = self.projects_root().join(name);

        std::fs::create_dir_all(&origin).unwrap();
        git(&origin, &["init", "--bare", "--quiet"]);
        git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        std::fs::create_dir_all(&dev).unwrap();
        git(&dev, &["init", "--quiet"]);
        git(&dev, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&dev, &["remote", "add", "origin", origin.to_str().unwrap()]);

        let project = Project {
            name: name.to_string(),
            dev,
            workdir,
        };
        project.write_script(script);
        project.push_commit("v1");

        std::fs::create_dir_all(self.projects_root()).unwrap();
        git(
            &self.projects_root(),
            &["clone", "--quiet", origin.to_str().unwrap(), name],
        );
        project
    }
}

pub struct Project {
    pub name: String,
    pub dev: PathBuf,
    pub workdir: PathBuf,
}

impl Project {
    fn write_script(&self, script: &str) {
        let path = self.dev.join("deploy.sh");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        git(&self.dev, &["add", "deploy.sh"]);
    }

    /// Commit `content` to `app.txt` on main and push; returns the sha.
    pub fn push_commit(&self, content: &str) -> String {
        std::fs::write(self.dev.join("app.txt"), content).unwrap();
        git(&self.dev, &["add", "app.txt"]);
        git(&self.dev, &["commit", "--quiet", "-m", content]);
        git(&self.dev, &["push", "--quiet", "origin", "main"]);
        git(&self.dev, &["rev-parse", "HEAD"])
    }

    /// Replace the deploy script on main and push; returns the sha.
    pub fn push_script(&self, script: &str) -> String {
        self.write_script(script);
        git(&self.dev, &["commit", "--quiet", "-m", "update deploy script"]);
        git(&self.dev, &["push", "--quiet", "origin", "main"]);
        git(&self.dev, &["rev-parse", "HEAD"])
    }

    pub fn working_copy_head(&self) -> String {
        git(&self.workdir, &["rev-parse", "HEAD"])
    }

    /// Commits recorded by the deploy script, oldest first
    pub fn deploys(&self) -> Vec<String> {
        let log = self
            .workdir
            .parent()
            .unwrap()
            .join(format!("{}-deploys.log", self.name));
        std::fs::read_to_string(log)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// In-process ingress
pub struct Ingress {
    app: Router,
}

impl Ingress {
    /// Correctly signed delivery of `event` with `body`
    pub async fn deliver(&self, event: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::post("/webhook/github")
            .header("content-type", "application/json")
            .header(EVENT_HEADER, event)
            .header(SIGNATURE_HEADER, github_signature(SECRET, body))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Signed push of `git_ref` for repository `name`
    pub async fn push(&self, name: &str, git_ref: &str) -> (StatusCode, Value) {
        self.deliver("push", &push_body(name, git_ref)).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

pub fn push_body(name: &str, git_ref: &str) -> String {
    json!({
        "ref": git_ref,
        "before": "0000000000000000000000000000000000000000",
        "repository": { "name": name, "full_name": format!("acme/{name}") },
        "pusher": { "name": "dev" },
    })
    .to_string()
}

/// Signature computed the way GitHub does, independently of the ingress.
pub fn github_signature(secret: &str, body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

pub fn id(name: &str) -> ProjectId {
    ProjectId::parse(name).unwrap()
}

pub fn queued() -> Value {
    json!({ "ok": true, "queued": true })
}

pub fn ignored(reason: &str) -> Value {
    json!({ "ok": true, "ignored": reason })
}
