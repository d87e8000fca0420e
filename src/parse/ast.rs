// src/parse/ast.rs

//! Raw declarations produced by the parser, before macro expansion.

use std::fmt;

/// 1-based line/column location in the build file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Automatic variables, only meaningful inside an action block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoVar {
    /// `$@`: canonical name of the target being built.
    Target,
    /// `$^`: the target's dependency names, space separated.
    Dependencies,
}

impl AutoVar {
    pub fn from_sigil(c: char) -> Option<Self> {
        match c {
            '@' => Some(AutoVar::Target),
            '^' => Some(AutoVar::Dependencies),
            _ => None,
        }
    }

    pub fn sigil(self) -> char {
        match self {
            AutoVar::Target => '@',
            AutoVar::Dependencies => '^',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Macro { name: String, position: Position },
    Auto(AutoVar),
}

/// A piece of unexpanded source text: literals interleaved with references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub segments: Vec<Segment>,
    pub position: Position,
}

impl Text {
    pub fn new(position: Position) -> Self {
        Self {
            segments: Vec::new(),
            position,
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.segments.last_mut() {
            Some(Segment::Literal(lit)) => lit.push(c),
            _ => self.segments.push(Segment::Literal(c.to_string())),
        }
    }

    pub fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Literal(lit)) => lit.push_str(s),
            _ => self.segments.push(Segment::Literal(s.to_string())),
        }
    }

    pub fn push(&mut self, segment: Segment) {
        match segment {
            Segment::Literal(lit) => self.push_str(&lit),
            other => self.segments.push(other),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The text as a plain string, if it contains no references.
    pub fn as_literal(&self) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                _ => return None,
            }
        }
        Some(out)
    }

    /// Names of the macros this text references, in textual order.
    pub fn macro_refs(&self) -> impl Iterator<Item = (&str, Position)> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Macro { name, position } => Some((name.as_str(), *position)),
            _ => None,
        })
    }
}

impl fmt::Display for Text {
    /// Renders the text back in source syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => write!(f, "{}", lit.replace('$', "$$"))?,
                Segment::Macro { name, .. } => write!(f, "$({name})")?,
                Segment::Auto(var) => write!(f, "${}", var.sigil())?,
            }
        }
        Ok(())
    }
}

/// `name [<- deps] { actions }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecl {
    pub name: Text,
    pub deps: Vec<Text>,
    pub actions: Vec<Text>,
    pub position: Position,
}

/// An extra name from a rule header (`name, alias <- ...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDecl {
    pub alias: Text,
    pub target: Text,
    pub position: Position,
}

/// `NAME := body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDecl {
    pub name: String,
    pub body: Text,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Rule(RuleDecl),
    Alias(AliasDecl),
    Macro(MacroDecl),
}

impl Decl {
    pub fn position(&self) -> Position {
        match self {
            Decl::Rule(rule) => rule.position,
            Decl::Alias(alias) => alias.position,
            Decl::Macro(m) => m.position,
        }
    }
}

/// Parse result: every declaration in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFile {
    pub origin: String,
    pub decls: Vec<Decl>,
}

impl BuildFile {
    pub fn rules(&self) -> impl Iterator<Item = &RuleDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn aliases(&self) -> impl Iterator<Item = &AliasDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Alias(alias) => Some(alias),
            _ => None,
        })
    }

    pub fn macros(&self) -> impl Iterator<Item = &MacroDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Macro(m) => Some(m),
            _ => None,
        })
    }
}
