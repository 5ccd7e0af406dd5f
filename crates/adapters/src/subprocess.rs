// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Default timeout for each git command of a working copy sync.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default timeout for one run of a project's deploy procedure.
/// Long enough for image builds; a hung procedure must not hold the lock forever.
pub const DEPLOY_TIMEOUT: Duration = Duration::from_secs(1800);

/// Failure to obtain an exit status from a subprocess
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{description} failed: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} timed out after {}s", timeout.as_secs())]
    TimedOut {
        description: String,
        timeout: Duration,
    },
}

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`. A non-zero exit
/// is not an error here; callers inspect `Output::status`. The child is
/// killed when the timeout elapses.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, SubprocessError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(SubprocessError::Io {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(SubprocessError::TimedOut {
            description: description.to_string(),
            timeout,
        }),
    }
}

/// Last `n` lines of captured output, for log messages.
pub fn tail_lines(bytes: &[u8], n: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
