// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the watcher crate.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use dq_adapters::subprocess::{DEPLOY_TIMEOUT, GIT_TIMEOUT};
use dq_core::env::{secs_var, var};
use dq_core::ConfigError;

use crate::lifecycle::LifecycleError;

pub const DEFAULT_PROJECTS_ROOT: &str = "/srv/projects";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_DEPLOY_SCRIPT: &str = "deploy.sh";
pub const DEFAULT_GIT_REMOTE: &str = "origin";

/// Resolve state directory: DQ_STATE_DIR > XDG_STATE_HOME/dq > ~/.local/state/dq
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Some(dir) = var("DQ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("dq"));
    }
    let home = var("HOME").ok_or(LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/dq"))
}

pub fn projects_root() -> PathBuf {
    var("DQ_PROJECTS_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECTS_ROOT))
}

pub fn poll_interval() -> Result<Duration, ConfigError> {
    Ok(secs_var("DQ_POLL_INTERVAL_SECS")?.unwrap_or(DEFAULT_POLL_INTERVAL))
}

pub fn deploy_timeout() -> Result<Duration, ConfigError> {
    Ok(secs_var("DQ_DEPLOY_TIMEOUT_SECS")?.unwrap_or(DEPLOY_TIMEOUT))
}

pub fn git_timeout() -> Result<Duration, ConfigError> {
    Ok(secs_var("DQ_GIT_TIMEOUT_SECS")?.unwrap_or(GIT_TIMEOUT))
}

pub fn git_remote() -> String {
    var("DQ_GIT_REMOTE").unwrap_or_else(|| DEFAULT_GIT_REMOTE.to_string())
}

/// Deploy entry point, relative to the working copy.
pub fn deploy_script() -> Result<PathBuf, ConfigError> {
    let script = var("DQ_DEPLOY_SCRIPT").unwrap_or_else(|| DEFAULT_DEPLOY_SCRIPT.to_string());
    validate_deploy_script(Path::new(&script)).map_err(|reason| ConfigError::Invalid {
        var: "DQ_DEPLOY_SCRIPT",
        reason: reason.to_string(),
    })?;
    Ok(PathBuf::from(script))
}

/// The entry point must name a file inside the working copy.
pub(crate) fn validate_deploy_script(script: &Path) -> Result<(), &'static str> {
    let mut has_name = false;
    for component in script.components() {
        match component {
            Component::Normal(_) => has_name = true,
            Component::CurDir => {}
            Component::ParentDir => return Err("must not leave the working copy"),
            Component::RootDir | Component::Prefix(_) => return Err("must be a relative path"),
        }
    }
    if has_name {
        Ok(())
    } else {
        Err("must name a file")
    }
}
