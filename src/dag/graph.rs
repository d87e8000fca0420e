// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::dag::target::Target;
use crate::dag::validate::ensure_acyclic;
use crate::errors::{FabError, Result};

/// Index of a target in the graph arena.
pub type TargetId = NodeIndex;

/// A dependency as seen from the target that names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency<'a> {
    /// Another declared rule.
    Target(TargetId),
    /// A name no rule declares; assumed to exist already.
    Leaf(&'a str),
}

/// The dependency graph of one build file.
///
/// Targets live in a flat arena (`petgraph` nodes) and are addressed by
/// [`TargetId`]. `index` maps every canonical and alias name to its single
/// node, so an alias never produces a second target. Edges run from a target
/// to each declared target it depends on; leaf names get no node.
#[derive(Debug, Clone)]
pub struct BuildGraph {
    graph: DiGraph<Target, ()>,
    index: HashMap<String, TargetId>,
    leaves: BTreeSet<String>,
    default: TargetId,
}

impl BuildGraph {
    /// Wire up edges and leaves for already-registered targets and check
    /// that the result is acyclic.
    ///
    /// The first node added is the default target.
    pub(crate) fn assemble(
        mut graph: DiGraph<Target, ()>,
        index: HashMap<String, TargetId>,
    ) -> Result<Self> {
        let default = graph.node_indices().next().ok_or(FabError::NoTargets)?;

        let mut leaves = BTreeSet::new();
        let mut edges = Vec::new();
        for id in graph.node_indices() {
            for dep in &graph[id].deps {
                match index.get(dep) {
                    Some(&dep_id) => edges.push((id, dep_id)),
                    None => {
                        leaves.insert(dep.clone());
                    }
                }
            }
        }
        for (from, to) in edges {
            graph.update_edge(from, to, ());
        }

        let built = Self {
            graph,
            index,
            leaves,
            default,
        };
        ensure_acyclic(&built)?;
        Ok(built)
    }

    /// Resolve a canonical or alias name.
    pub fn resolve(&self, name: &str) -> Option<TargetId> {
        self.index.get(name).copied()
    }

    /// The target for `id`.
    ///
    /// # Panics
    ///
    /// If `id` did not come from this graph.
    pub fn target(&self, id: TargetId) -> &Target {
        &self.graph[id]
    }

    pub fn get(&self, name: &str) -> Option<&Target> {
        self.resolve(name).map(|id| self.target(id))
    }

    /// The first rule declared in the build file.
    pub fn default_target(&self) -> TargetId {
        self.default
    }

    /// All targets in declaration order.
    pub fn targets(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.graph
            .node_indices()
            .map(move |id| (id, &self.graph[id]))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Dependency names that no rule declares.
    pub fn leaves(&self) -> impl Iterator<Item = &str> {
        self.leaves.iter().map(|s| s.as_str())
    }

    pub fn is_leaf(&self, name: &str) -> bool {
        self.leaves.contains(name)
    }

    /// Dependencies of `id` in declared order.
    pub fn dependencies(&self, id: TargetId) -> impl Iterator<Item = Dependency<'_>> {
        self.target(id)
            .deps
            .iter()
            .map(move |dep| self.classify(dep))
    }

    /// The `index`-th dependency of `id`, if it has that many.
    pub fn dependency(&self, id: TargetId, index: usize) -> Option<Dependency<'_>> {
        self.target(id).deps.get(index).map(|dep| self.classify(dep))
    }

    fn classify<'a>(&self, dep: &'a str) -> Dependency<'a> {
        match self.resolve(dep) {
            Some(dep_id) => Dependency::Target(dep_id),
            None => Dependency::Leaf(dep),
        }
    }

    /// Targets that list `id` as a dependency.
    pub fn dependents_of(&self, id: TargetId) -> impl Iterator<Item = TargetId> {
        self.graph
            .neighbors_directed(id, petgraph::Direction::Incoming)
    }

    pub(crate) fn arena(&self) -> &DiGraph<Target, ()> {
        &self.graph
    }
}
