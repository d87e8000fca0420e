// src/parse/mod.rs

//! Build-file parsing.
//!
//! - [`cursor`] walks the source text and tracks positions.
//! - [`parser`] turns text into an ordered list of [`Decl`]s.
//! - [`ast`] holds the declaration types and unexpanded [`Text`].
//!
//! Parsing is a pure transform: macros are resolved later by
//! [`crate::expand`], and the graph is built by [`crate::dag`].

pub mod ast;
pub mod cursor;
pub mod parser;

pub use ast::{AliasDecl, AutoVar, BuildFile, Decl, MacroDecl, Position, RuleDecl, Segment, Text};
pub use parser::Parser;

use crate::errors::ParseError;

/// Origin used when parsing text that did not come from a file.
pub const INLINE_ORIGIN: &str = "<inline>";

/// Characters allowed in target, alias, dependency and macro names.
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/' | '+' | '@' | '%' | '~')
}

pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_ident_char)
}

/// Parse build-file text that has no file of its own.
pub fn parse(source: &str) -> Result<BuildFile, ParseError> {
    parse_with_origin(source, INLINE_ORIGIN)
}

/// Parse build-file text, naming `origin` in any error.
pub fn parse_with_origin(source: &str, origin: impl Into<String>) -> Result<BuildFile, ParseError> {
    Parser::new(source, origin).parse()
}
