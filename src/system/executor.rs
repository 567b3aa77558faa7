// src/system/executor.rs

use crate::constants::{LAUNCH_FAILURE_STATUS, SHELL, SHELL_COMMAND_FLAG};
use crate::core::abort_router::AbortRouter;
use crate::models::{AbortScope, CommandResult};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Failures at the process boundary that cannot be expressed as an exit status.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Waiting on, or reading from, a running child failed.
    #[error("Could not wait for command '{0}': {1}")]
    Wait(String, std::io::Error),
}

/// How a shell invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The child exited (or never launched; see [`LAUNCH_FAILURE_STATUS`]).
    Finished(CommandResult),
    /// An operator interrupt arrived while waiting.
    Aborted(AbortScope),
}

/// Runs `command_line` through the host shell and waits for it, unless the
/// router announces an abort first.
///
/// With `capture` the child's stdout and stderr are buffered separately and
/// returned; otherwise they are inherited and only the exit status is known.
/// A child that cannot be spawned yields a finished result carrying the
/// sentinel status and the launch error on stderr.
///
/// On abort the child is asked to die, but whether it actually does is up to
/// the child.
pub async fn run_shell(
    command_line: &str,
    cwd: &Path,
    capture: bool,
    router: &AbortRouter,
) -> Result<Completion, ExecutionError> {
    let mut command = Command::new(SHELL);
    command
        .arg(SHELL_COMMAND_FLAG)
        .arg(command_line)
        .current_dir(dunce::simplified(cwd))
        .kill_on_drop(true);

    if capture {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
    } else {
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::debug!("Could not launch '{}': {}", command_line, e);
            return Ok(Completion::Finished(CommandResult {
                exit_status: LAUNCH_FAILURE_STATUS,
                stdout: String::new(),
                stderr: format!("{}: {}", command_line, e),
            }));
        }
    };
    log::debug!(
        "Spawned '{}' (PID: {:?}, capture: {})",
        command_line,
        child.id(),
        capture
    );

    let _running = router.command_started();

    if capture {
        // Dropping the output future on abort drops the child, which requests a kill.
        tokio::select! {
            output = child.wait_with_output() => {
                let output = output.map_err(|e| ExecutionError::Wait(command_line.to_string(), e))?;
                Ok(Completion::Finished(CommandResult {
                    exit_status: exit_code(output.status),
                    stdout: chomp(String::from_utf8_lossy(&output.stdout).into_owned()),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }))
            }
            scope = router.cancelled() => Ok(Completion::Aborted(scope)),
        }
    } else {
        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| ExecutionError::Wait(command_line.to_string(), e))?;
                Ok(Completion::Finished(CommandResult {
                    exit_status: exit_code(status),
                    ..CommandResult::empty()
                }))
            }
            scope = router.cancelled() => {
                if let Err(e) = child.start_kill() {
                    log::warn!("Failed to kill child process {:?}: {}", child.id(), e);
                }
                Ok(Completion::Aborted(scope))
            }
        }
    }
}

/// Maps an exit status to an integer code. Children killed by a signal get
/// the shell convention of `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    LAUNCH_FAILURE_STATUS
}

/// Removes at most one trailing line terminator (`\n`, `\r\n` or `\r`).
pub fn chomp(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    } else if text.ends_with('\r') {
        text.pop();
    }
    text
}
