// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dq watcher
//!
//! Polls the mailbox and, for each pending project whose execution lock is
//! free, clears the slot, hard-resets the working copy to the deploy branch
//! and runs the project's deploy procedure.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
pub mod lifecycle;
pub mod watcher;

pub use lifecycle::{Config, LifecycleError, STARTUP_MARKER_PREFIX};
pub use watcher::{CycleOutcome, CycleReport, Watcher, WatcherConfig};
