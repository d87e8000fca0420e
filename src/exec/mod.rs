// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ActionRunner` trait the scheduler talks to and
//!   the production `ShellRunner`. Tests swap in a fake runner.
//! - [`command`] spawns one action line through the platform shell and waits
//!   for it, turning failures into `FabError::ActionFailure`.

pub mod backend;
pub mod command;

pub use backend::{ActionRunner, ShellRunner};
pub use command::{run_shell, shell_command};
