// src/dag/scheduler.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::dag::graph::{BuildGraph, Dependency, TargetId};
use crate::dag::target::ScheduledAction;
use crate::errors::{FabError, Result};
use crate::exec::ActionRunner;

/// The targets a build will run, dependencies first, each at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// What was asked for: a canonical target name or a leaf.
    pub requested: String,
    pub order: Vec<TargetId>,
}

impl BuildPlan {
    /// A plan for a leaf: there is nothing to run.
    pub fn nothing_to_do(requested: impl Into<String>) -> Self {
        Self {
            requested: requested.into(),
            order: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Canonical names of the planned targets, in build order.
    pub fn target_names<'g>(&self, graph: &'g BuildGraph) -> Vec<&'g str> {
        self.order
            .iter()
            .map(|&id| graph.target(id).name.as_str())
            .collect()
    }

    /// Every action line the plan will run, in execution order.
    pub fn actions(&self, graph: &BuildGraph) -> Vec<ScheduledAction> {
        self.order
            .iter()
            .map(|&id| graph.target(id))
            .flat_map(|target| {
                target
                    .actions
                    .iter()
                    .map(move |action| ScheduledAction::new(target, action))
            })
            .collect()
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Canonical names of the targets built, in order.
    pub built: Vec<String>,
    pub actions_run: usize,
}

/// Plans and runs builds over an immutable [`BuildGraph`].
///
/// Planning is a depth-first post-order walk from the requested target,
/// visiting dependencies left to right. The visited set is keyed by
/// [`TargetId`], so a target reachable through several paths (a diamond, or
/// a request made through an alias) is planned once, on first visit.
#[derive(Debug)]
pub struct Scheduler<'g> {
    graph: &'g BuildGraph,
    /// Where requested leaves are looked up as files.
    working_dir: Option<PathBuf>,
}

impl<'g> Scheduler<'g> {
    pub fn new(graph: &'g BuildGraph) -> Self {
        Self {
            graph,
            working_dir: None,
        }
    }

    /// Also accept requests for files that exist under `dir`.
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn graph(&self) -> &'g BuildGraph {
        self.graph
    }

    /// Plan a build of `request`, or of the default target when `None`.
    pub fn plan(&self, request: Option<&str>) -> Result<BuildPlan> {
        let root = match request {
            None => self.graph.default_target(),
            Some(name) => match self.graph.resolve(name) {
                Some(id) => id,
                None if self.is_existing_leaf(name) => {
                    info!(request = %name, "nothing to be done for leaf");
                    return Ok(BuildPlan::nothing_to_do(name));
                }
                None => {
                    return Err(FabError::UnknownTarget {
                        name: name.to_string(),
                    });
                }
            },
        };

        let plan = BuildPlan {
            requested: self.graph.target(root).name.clone(),
            order: self.post_order(root),
        };
        debug!(
            requested = %plan.requested,
            targets = ?plan.target_names(self.graph),
            "planned build"
        );
        Ok(plan)
    }

    /// Post-order from `root` over an explicit stack of
    /// `(target, next dependency index)` frames, so chain depth is bounded
    /// by the heap rather than the thread stack.
    fn post_order(&self, root: TargetId) -> Vec<TargetId> {
        let mut visited = HashSet::from([root]);
        let mut order = Vec::new();
        let mut stack: Vec<(TargetId, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (id, next) = *frame;
            let Some(dep) = self.graph.dependency(id, next) else {
                stack.pop();
                order.push(id);
                continue;
            };
            frame.1 += 1;

            match dep {
                Dependency::Target(dep_id) if visited.insert(dep_id) => stack.push((dep_id, 0)),
                Dependency::Target(dep_id) => {
                    trace!(rule = %self.graph.target(dep_id).name, "already planned");
                }
                Dependency::Leaf(name) => trace!(leaf = %name, "leaf dependency satisfied"),
            }
        }

        order
    }

    fn is_existing_leaf(&self, name: &str) -> bool {
        if self.graph.is_leaf(name) {
            return true;
        }
        self.working_dir
            .as_ref()
            .is_some_and(|dir| dir.join(name).exists())
    }

    /// Run every action of `plan`, one at a time, stopping at the first
    /// failure. Actions that already ran are not undone.
    pub async fn execute<R>(&self, plan: &BuildPlan, runner: &mut R) -> Result<BuildReport>
    where
        R: ActionRunner + ?Sized,
    {
        let mut report = BuildReport::default();

        for &id in &plan.order {
            let target = self.graph.target(id);
            if target.is_phony() {
                debug!(rule = %target.name, "no actions; dependencies satisfied");
            } else {
                info!(rule = %target.name, actions = target.actions.len(), "building target");
            }

            for action in &target.actions {
                let scheduled = ScheduledAction::new(target, action);
                runner.run_action(&scheduled).await?;
                report.actions_run += 1;
            }
            report.built.push(target.name.clone());
        }

        info!(
            requested = %plan.requested,
            targets = report.built.len(),
            actions = report.actions_run,
            "build finished"
        );
        Ok(report)
    }

    /// [`plan`](Self::plan) then [`execute`](Self::execute).
    pub async fn build<R>(&self, request: Option<&str>, runner: &mut R) -> Result<BuildReport>
    where
        R: ActionRunner + ?Sized,
    {
        let plan = self.plan(request)?;
        self.execute(&plan, runner).await
    }
}
