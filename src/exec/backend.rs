// src/exec/backend.rs

//! Pluggable action runner abstraction.
//!
//! The scheduler hands each action line to an `ActionRunner` and awaits it
//! before moving on, so runners never see two actions at once.
//!
//! - `ShellRunner` is the implementation used by `fab`. It spawns the
//!   command with inherited stdio, so the command's output appears exactly as
//!   if `fab` had written it.
//! - Tests can provide a runner that records the actions and reports
//!   success or failure without spawning anything.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::dag::ScheduledAction;
use crate::errors::Result;

use super::command::run_shell;

/// Trait abstracting how a single action line is executed.
pub trait ActionRunner: Send {
    /// Run `action` to completion.
    ///
    /// Must resolve to `FabError::ActionFailure` if the command fails; the
    /// scheduler stops the build on the first error.
    fn run_action<'a>(
        &'a mut self,
        action: &'a ScheduledAction,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Runs action lines through the platform shell.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    working_dir: PathBuf,
    echo: bool,
}

impl ShellRunner {
    /// Commands run with `working_dir` as their current directory.
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            echo: false,
        }
    }

    /// Print each command to stderr before running it.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

impl ActionRunner for ShellRunner {
    fn run_action<'a>(
        &'a mut self,
        action: &'a ScheduledAction,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(run_shell(action, &self.working_dir, self.echo))
    }
}
