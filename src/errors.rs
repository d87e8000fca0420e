// src/errors.rs

//! Crate-wide error type.
//!
//! Everything that can stop a build is a [`FabError`]. Problems with the build
//! file itself (syntax, macros, cycles, unknown targets) are raised while
//! loading and planning, before any action runs. [`FabError::ActionFailure`]
//! is the only error that can happen mid-build.

use std::path::PathBuf;

use thiserror::Error;

use crate::parse::Position;

#[derive(Error, Debug)]
pub enum FabError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("circular macro reference: {}", .chain.join(" -> "))]
    MacroCycle { chain: Vec<String> },

    #[error("dependency cycle detected: {}", .members.join(" -> "))]
    Cycle { members: Vec<String> },

    #[error("no rule to make target `{name}'")]
    UnknownTarget { name: String },

    #[error("build file declares no targets")]
    NoTargets,

    #[error("target `{target}': command `{command}' {reason}")]
    ActionFailure {
        target: String,
        command: String,
        #[source]
        reason: FailureReason,
    },

    #[error("could not read build file {}: {source}", .path.display())]
    ReadBuildFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a single action line failed.
#[derive(Error, Debug)]
pub enum FailureReason {
    #[error("exited with status {0}")]
    Exit(i32),

    #[error("was terminated by a signal")]
    Signal,

    #[error("could not be spawned: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("could not be waited on: {0}")]
    Wait(#[source] std::io::Error),

    #[error("was interrupted")]
    Interrupted,
}

/// A syntax or reference error located in the build file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{origin}:{position}: {kind}")]
pub struct ParseError {
    /// Where the source came from, usually the build-file path.
    pub origin: String,
    pub position: Position,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(origin: impl Into<String>, position: Position, kind: ParseErrorKind) -> Self {
        Self {
            origin: origin.into(),
            position,
            kind,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected character '{found}', expected {expected}")]
    UnexpectedChar { found: char, expected: &'static str },

    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("unterminated action block")]
    UnterminatedBlock,

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("unterminated macro reference")]
    UnterminatedMacroRef,

    #[error("invalid identifier `{text}'")]
    InvalidIdentifier { text: String },

    #[error("undefined macro `{name}'")]
    UnknownMacro { name: String },

    #[error("macro name must be a literal identifier, got `$({name})'")]
    NonLiteralMacroName { name: String },

    #[error("target `{name}' already declared at {previous}")]
    DuplicateTarget { name: String, previous: Position },

    #[error("macro `{name}' already declared at {previous}")]
    DuplicateMacro { name: String, previous: Position },

    #[error("`${var}' is only valid inside an action block")]
    MisplacedAutoVariable { var: char },

    #[error("pattern `{text}' must contain exactly one `%'")]
    InvalidPattern { text: String },

    #[error("`{text}': `%' is only valid in a pattern rule's name and dependencies")]
    MisplacedPattern { text: String },

    #[error("pattern rule `{pattern}' cannot have aliases")]
    PatternAlias { pattern: String },
}

pub type Result<T> = std::result::Result<T, FabError>;
