// src/dag/validate.rs

use petgraph::algo::toposort;
use tracing::debug;

use crate::dag::graph::{BuildGraph, Dependency, TargetId};
use crate::errors::{FabError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Fail with [`FabError::Cycle`] if the dependency edges contain a cycle.
///
/// `toposort` decides whether there is a cycle at all. The members are then
/// found with a depth-first walk in declaration order, following each
/// target's dependencies left to right, so the reported cycle is the first
/// one a build of the file would run into.
pub fn ensure_acyclic(graph: &BuildGraph) -> Result<()> {
    let flagged = match toposort(graph.arena(), None) {
        Ok(_order) => return Ok(()),
        Err(cycle) => cycle.node_id(),
    };

    let mut walk = CycleWalk {
        graph,
        marks: vec![Mark::Unvisited; graph.len()],
        stack: Vec::new(),
    };

    let cycle = graph
        .targets()
        .find_map(|(id, _)| walk.visit(id))
        .unwrap_or_else(|| vec![flagged, flagged]);

    let members: Vec<String> = cycle
        .into_iter()
        .map(|id| graph.target(id).name.clone())
        .collect();

    debug!(?members, "dependency cycle detected");
    Err(FabError::Cycle { members })
}

struct CycleWalk<'g> {
    graph: &'g BuildGraph,
    marks: Vec<Mark>,
    /// `(target, next dependency index)` for every target on the path.
    stack: Vec<(TargetId, usize)>,
}

impl CycleWalk<'_> {
    /// Returns the cycle (first member repeated at the end) if one is
    /// reachable from `root`.
    fn visit(&mut self, root: TargetId) -> Option<Vec<TargetId>> {
        if self.mark(root)? != Mark::Unvisited {
            return None;
        }
        self.set_mark(root, Mark::OnStack);
        self.stack.push((root, 0));

        while let Some(&(id, next)) = self.stack.last() {
            let Some(dep) = self.graph.dependency(id, next) else {
                self.stack.pop();
                self.set_mark(id, Mark::Done);
                continue;
            };
            if let Some(top) = self.stack.last_mut() {
                top.1 += 1;
            }

            let Dependency::Target(dep_id) = dep else {
                continue;
            };
            match self.mark(dep_id)? {
                Mark::Done => {}
                Mark::OnStack => {
                    let start = self.stack.iter().position(|&(n, _)| n == dep_id)?;
                    let mut cycle: Vec<TargetId> =
                        self.stack[start..].iter().map(|&(n, _)| n).collect();
                    cycle.push(dep_id);
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    self.set_mark(dep_id, Mark::OnStack);
                    self.stack.push((dep_id, 0));
                }
            }
        }

        None
    }

    fn mark(&self, id: TargetId) -> Option<Mark> {
        self.marks.get(id.index()).copied()
    }

    fn set_mark(&mut self, id: TargetId, mark: Mark) {
        if let Some(slot) = self.marks.get_mut(id.index()) {
            *slot = mark;
        }
    }
}
