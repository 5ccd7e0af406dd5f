// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Filesystem state shared between the ingress and the watcher:
//! the pending-deploy mailbox and per-project execution locks.

mod lock;
mod mailbox;

pub use lock::{LockError, LockGuard, ProjectLocks};
pub use mailbox::{Mailbox, MailboxError};
