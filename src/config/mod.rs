// src/config/mod.rs

//! Invocation configuration and build-file loading.
//!
//! - [`BuildConfig`] is the explicit value threaded through loading and
//!   execution (build-file path, working directory, requested target, ...).
//! - [`loader`] reads a build file and turns it into a validated graph.

pub mod loader;

use std::path::{Path, PathBuf};

use crate::cli::CliArgs;

pub use loader::{
    default_build_file_path, load_from_path, load_from_str, load_graph, load_requested,
};

/// Everything one invocation of the engine needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Build file to read.
    pub build_file: PathBuf,
    /// Directory actions run in, and where requested leaves are looked up.
    pub working_dir: PathBuf,
    /// Target to build; `None` builds the default (first declared) target.
    pub target: Option<String>,
    /// Print the planned commands instead of running them.
    pub dry_run: bool,
    /// Echo each command to stderr before running it.
    pub echo: bool,
}

impl BuildConfig {
    pub fn new(build_file: impl AsRef<Path>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            build_file: build_file.as_ref().to_path_buf(),
            working_dir: working_dir.as_ref().to_path_buf(),
            target: None,
            dry_run: false,
            echo: false,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Configuration for the command line, using the process's current
    /// directory as the working directory.
    pub fn from_args(args: &CliArgs) -> std::io::Result<Self> {
        let working_dir = std::env::current_dir()?;
        Ok(Self {
            build_file: args.file.clone(),
            working_dir,
            target: args.target.clone(),
            dry_run: args.dry_run,
            echo: args.echo,
        })
    }
}
