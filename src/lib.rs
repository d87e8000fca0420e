// src/lib.rs

//! `fab`: a dependency-driven build tool.
//!
//! A build file declares targets, their dependencies and the shell commands
//! that build them. Text flows strictly downward:
//!
//! 1. [`parse`] turns build-file text into declarations.
//! 2. [`expand`] resolves macro references.
//! 3. [`dag`] builds the target graph and plans a dependency-first build.
//! 4. [`exec`] runs each planned action line, one at a time.

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod expand;
pub mod logging;
pub mod parse;

use tracing::{debug, info};

use crate::config::{load_graph, BuildConfig};
use crate::dag::{BuildGraph, BuildPlan, BuildReport, Scheduler};
use crate::errors::Result;
use crate::exec::ShellRunner;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the build file, plans the requested (or default)
/// target and either prints the plan (`--dry-run`) or runs it.
pub async fn run(config: &BuildConfig) -> Result<BuildReport> {
    let graph = load_graph(config)?;
    info!(
        build_file = %config.build_file.display(),
        targets = graph.len(),
        "loaded build file"
    );

    let scheduler = Scheduler::new(&graph).with_working_dir(&config.working_dir);
    let plan = scheduler.plan(config.target.as_deref())?;

    if config.dry_run {
        print_dry_run(&graph, &plan);
        return Ok(BuildReport::default());
    }

    let mut runner = ShellRunner::new(&config.working_dir).with_echo(config.echo);
    scheduler.execute(&plan, &mut runner).await
}

/// Dry-run output: the commands a build would run, one per line.
fn print_dry_run(graph: &BuildGraph, plan: &BuildPlan) {
    for action in plan.actions(graph) {
        println!("{}", action.command);
    }
    debug!(requested = %plan.requested, "dry-run complete (no execution)");
}
