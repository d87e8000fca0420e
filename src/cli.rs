// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `fab`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fab",
    version,
    about = "Build targets from a Fabfile, dependencies first.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the build file.
    #[arg(short = 'f', long, value_name = "PATH", default_value = crate::config::loader::DEFAULT_BUILD_FILE)]
    pub file: PathBuf,

    /// Target to build. Defaults to the first rule in the build file.
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Print the commands that would run, without running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print each command to stderr before running it.
    #[arg(short, long)]
    pub echo: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FAB_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
