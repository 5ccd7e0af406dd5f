// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project execution locks.
//!
//! Each project has a lock file under the lock directory held with an
//! exclusive advisory lock. The lock belongs to the open file: dropping the
//! [`LockGuard`] releases it, and so does the OS when the holding process
//! dies, so a crashed watcher never leaves a project wedged. The file
//! itself is never removed.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use dq_core::ProjectId;
use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

/// Errors other than contention; a busy lock is `Ok(None)`.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory of per-project lock files
#[derive(Debug, Clone)]
pub struct ProjectLocks {
    dir: PathBuf,
}

impl ProjectLocks {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn lock_path(&self, project: &ProjectId) -> PathBuf {
        self.dir.join(format!("{}.lock", project))
    }

    /// Try to take the lock for `project` without blocking.
    ///
    /// Returns `Ok(None)` if another holder (in this or any other process)
    /// has it.
    pub fn try_acquire(&self, project: &ProjectId) -> Result<Option<LockGuard>, LockError> {
        let path = self.lock_path(project);
        let io_err = |source| LockError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|source| LockError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Don't truncate before holding the lock: that would wipe the
        // current holder's diagnostics.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(io_err)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                debug!(project = %project, "lock busy");
                return Ok(None);
            }
            return Err(io_err(e));
        }

        let mut file = file;
        file.set_len(0).map_err(io_err)?;
        writeln!(
            file,
            "pid={} acquired_at={}",
            std::process::id(),
            Utc::now().to_rfc3339()
        )
        .map_err(io_err)?;

        debug!(project = %project, "lock acquired");
        Ok(Some(LockGuard {
            project: project.clone(),
            path,
            file,
        }))
    }

    /// Diagnostics written by the most recent holder, if any.
    pub fn last_holder(&self, project: &ProjectId) -> Option<String> {
        fs::read_to_string(self.lock_path(project))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Held execution lock; released on drop
#[derive(Debug)]
pub struct LockGuard {
    project: ProjectId,
    path: PathBuf,
    file: File,
}

impl LockGuard {
    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(project = %self.project, "lock released");
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
