// src/dag/target.rs

//! Target records and the actions scheduled from them.

use crate::errors::{FabError, FailureReason};
use crate::parse::Position;

/// One fully expanded command in a target's action block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLine {
    /// 0-based index within the block.
    pub position: usize,
    pub command: String,
}

/// A declared rule after macro expansion.
///
/// Immutable once the graph is built; the scheduler only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub aliases: Vec<String>,
    /// Dependency names in declared order (targets and leaves alike).
    pub deps: Vec<String>,
    pub actions: Vec<ActionLine>,
    /// Where the rule was declared.
    pub declared_at: Position,
    /// The `%` pattern this target was instantiated from, if any.
    pub pattern: Option<String>,
}

impl Target {
    /// A target with no actions only gathers its dependencies.
    pub fn is_phony(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether `name` is this target's canonical name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

/// An action line handed to an [`ActionRunner`](crate::exec::ActionRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAction {
    pub target: String,
    pub position: usize,
    pub command: String,
}

impl ScheduledAction {
    pub fn new(target: &Target, action: &ActionLine) -> Self {
        Self {
            target: target.name.clone(),
            position: action.position,
            command: action.command.clone(),
        }
    }

    /// The error reported when this action fails for `reason`.
    pub fn failure(&self, reason: FailureReason) -> FabError {
        FabError::ActionFailure {
            target: self.target.clone(),
            command: self.command.clone(),
            reason,
        }
    }
}
