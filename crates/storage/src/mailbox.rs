// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-deploy mailbox.
//!
//! One directory per project under a shared root; presence means a deploy
//! is pending. Marking is idempotent (a burst of pushes collapses onto one
//! slot) and clearing is a single atomic rename, so a slot is never seen
//! half-removed by a concurrent `mark_pending`.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dq_core::{IdentityPattern, ProjectId};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Marker between the project name and the uuid in a tombstone name.
const TOMBSTONE_INFIX: &str = ".claimed-";

/// Attempts to create a slot while a concurrent clear keeps renaming it away.
const MARK_ATTEMPTS: usize = 3;

/// Errors that can occur in mailbox operations
#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("mailbox I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("mailbox slot {} exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> MailboxError + '_ {
    move |source| MailboxError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Directory-backed queue with one slot per project
#[derive(Debug, Clone)]
pub struct Mailbox {
    root: PathBuf,
    pattern: IdentityPattern,
}

impl Mailbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: IdentityPattern::default(),
        }
    }

    /// Only directories matching `pattern` are reported by [`Self::list_pending`].
    pub fn with_pattern(mut self, pattern: IdentityPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_path(&self, project: &ProjectId) -> PathBuf {
        self.root.join(project.as_str())
    }

    pub fn is_pending(&self, project: &ProjectId) -> bool {
        fs::symlink_metadata(self.slot_path(project))
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Mark `project` pending. Succeeds (and does nothing) if it already is.
    ///
    /// Returns only after the slot's directory entry has been synced, so a
    /// caller may report the push as queued.
    pub fn mark_pending(&self, project: &ProjectId) -> Result<(), MailboxError> {
        fs::create_dir_all(&self.root).map_err(io_at(&self.root))?;
        let slot = self.slot_path(project);

        for _ in 0..MARK_ATTEMPTS {
            match fs::create_dir(&slot) {
                Ok(()) => {
                    sync_dir(&self.root)?;
                    debug!(project = %project, "slot marked pending");
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    match fs::symlink_metadata(&slot) {
                        Ok(meta) if meta.is_dir() => {
                            debug!(project = %project, "slot already pending");
                            return Ok(());
                        }
                        Ok(_) => return Err(MailboxError::NotADirectory(slot)),
                        // Cleared between create and stat; try again
                        Err(e) if e.kind() == ErrorKind::NotFound => continue,
                        Err(e) => return Err(io_at(&slot)(e)),
                    }
                }
                Err(e) => return Err(io_at(&slot)(e)),
            }
        }

        Err(io_at(&slot)(std::io::Error::new(
            ErrorKind::Other,
            "slot kept disappearing while being marked",
        )))
    }

    /// Pending projects in lexicographic order.
    ///
    /// A missing root is an empty queue. Hidden entries, plain files and
    /// names outside the identity pattern are skipped.
    pub fn list_pending(&self) -> Result<Vec<ProjectId>, MailboxError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_at(&self.root)(e)),
        };

        let mut pending = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_at(&self.root))?;
            let Ok(file_type) = entry.file_type() else {
                // Entry vanished (cleared) while listing
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!(entry = ?entry.path(), "ignoring non-utf8 mailbox entry");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            match self.pattern.parse(name) {
                Ok(project) => pending.push(project),
                Err(e) => warn!(error = %e, "ignoring unrecognized mailbox entry"),
            }
        }

        pending.sort();
        Ok(pending)
    }

    /// Remove the slot for `project`.
    ///
    /// Returns `false` when there was nothing to clear. The slot is renamed
    /// to a hidden tombstone first; a `mark_pending` racing with this call
    /// either lands before the rename (and is consumed with it) or creates
    /// a fresh slot afterwards.
    pub fn clear(&self, project: &ProjectId) -> Result<bool, MailboxError> {
        let slot = self.slot_path(project);
        let tombstone = self.root.join(format!(
            ".{}{}{}",
            project,
            TOMBSTONE_INFIX,
            Uuid::new_v4().simple()
        ));

        match fs::rename(&slot, &tombstone) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_at(&slot)(e)),
        }

        if let Err(e) = sync_dir(&self.root) {
            warn!(error = %e, "failed to sync mailbox root after clear");
        }
        if let Err(e) = fs::remove_dir_all(&tombstone) {
            warn!(
                error = %e,
                path = %tombstone.display(),
                "failed to remove mailbox tombstone"
            );
        }

        debug!(project = %project, "slot cleared");
        Ok(true)
    }

    /// Remove tombstones left behind by an interrupted [`Self::clear`].
    ///
    /// Returns how many were removed.
    pub fn sweep_tombstones(&self) -> Result<usize, MailboxError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(io_at(&self.root)(e)),
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let is_tombstone = name
                .to_str()
                .is_some_and(|n| n.starts_with('.') && n.contains(TOMBSTONE_INFIX));
            if !is_tombstone {
                continue;
            }
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!(
                    error = %e,
                    path = %entry.path().display(),
                    "failed to sweep mailbox tombstone"
                ),
            }
        }
        Ok(removed)
    }
}

fn sync_dir(dir: &Path) -> Result<(), MailboxError> {
    File::open(dir)
        .and_then(|f| f.sync_all())
        .map_err(io_at(dir))
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
