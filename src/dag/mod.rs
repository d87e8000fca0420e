// src/dag/mod.rs

//! Dependency graph and build scheduling.
//!
//! - [`target`] holds target records and scheduled actions.
//! - [`graph`] is the arena-backed graph keyed by canonical and alias names.
//! - [`builder`] expands macros, turns declarations into a graph and
//!   instantiates `%` pattern rules.
//! - [`validate`] rejects dependency cycles.
//! - [`scheduler`] plans the post-order build and drives an action runner.

pub mod builder;
pub mod graph;
pub mod scheduler;
pub mod target;
pub mod validate;

pub use builder::{build_graph, build_graph_for};
pub use graph::{BuildGraph, Dependency, TargetId};
pub use scheduler::{BuildPlan, BuildReport, Scheduler};
pub use target::{ActionLine, ScheduledAction, Target};
