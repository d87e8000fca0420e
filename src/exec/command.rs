// src/exec/command.rs

//! Spawning a single action line.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::dag::ScheduledAction;
use crate::errors::{FailureReason, Result};

/// Build a shell command appropriate for the platform.
pub fn shell_command(line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    }
}

/// Run one action line in `working_dir` and wait for it to exit.
///
/// stdin, stdout and stderr are inherited. Ctrl-C while the command runs
/// kills it and fails the action as interrupted.
pub async fn run_shell(action: &ScheduledAction, working_dir: &Path, echo: bool) -> Result<()> {
    debug!(
        rule = %action.target,
        position = action.position,
        command = %action.command,
        "starting action"
    );

    // Anything fab printed so far must reach stdout before the child's output.
    if let Err(e) = std::io::stdout().flush() {
        warn!(error = %e, "failed to flush stdout before spawning action");
    }
    if echo {
        eprintln!("{}", action.command);
    }

    let mut cmd = shell_command(&action.command);
    cmd.current_dir(working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| action.failure(FailureReason::Spawn(e)))?;

    // The first `ctrl_c()` replaces the default SIGINT disposition for the
    // rest of the process. A listener only sees signals sent after it
    // subscribed, so a Ctrl-C in the gap between two actions (bookkeeping
    // only, no child running) is dropped.
    let status = tokio::select! {
        status = child.wait() => status.map_err(|e| action.failure(FailureReason::Wait(e)))?,

        Ok(()) = tokio::signal::ctrl_c() => {
            info!(
                rule = %action.target,
                command = %action.command,
                "interrupted; killing running action"
            );
            if let Err(e) = child.kill().await {
                warn!(rule = %action.target, error = %e, "failed to kill action on interrupt");
            }
            return Err(action.failure(FailureReason::Interrupted));
        }
    };

    debug!(
        rule = %action.target,
        position = action.position,
        exit_code = ?status.code(),
        success = status.success(),
        "action exited"
    );

    if status.success() {
        return Ok(());
    }

    let reason = match status.code() {
        Some(code) => FailureReason::Exit(code),
        None => FailureReason::Signal,
    };
    Err(action.failure(reason))
}
