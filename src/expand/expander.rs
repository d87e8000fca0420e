// src/expand/expander.rs

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::errors::{FabError, ParseError, ParseErrorKind, Result};
use crate::expand::table::MacroTable;
use crate::parse::{AutoVar, MacroDecl, Position, Segment, Text};

/// The rule an action line belongs to, for `$@` and `$^`.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub target: &'a str,
    pub deps: &'a [String],
}

/// Resolves macro references against a [`MacroTable`].
///
/// Fully expanded macro bodies are memoised. A macro body is expanded over
/// an explicit stack of frames, one per macro being expanded; meeting a name
/// that already has a frame is a [`FabError::MacroCycle`].
#[derive(Debug)]
pub struct Expander<'a> {
    table: &'a MacroTable,
    origin: &'a str,
    resolved: HashMap<String, String>,
}

/// A macro body partway through expansion.
struct Frame<'t> {
    decl: &'t MacroDecl,
    next: usize,
    out: String,
}

impl<'a> Expander<'a> {
    pub fn new(table: &'a MacroTable, origin: &'a str) -> Self {
        Self {
            table,
            origin,
            resolved: HashMap::new(),
        }
    }

    /// Expand every declared macro once, so that a broken macro is reported
    /// even if no rule uses it.
    pub fn expand_all(&mut self) -> Result<()> {
        let table = self.table;
        for decl in table.iter() {
            self.expand_macro(&decl.name, decl.position)?;
        }
        debug!(macros = self.resolved.len(), "expanded macro table");
        Ok(())
    }

    /// Value of the macro `name`, referenced at `position`.
    pub fn expand_macro(&mut self, name: &str, position: Position) -> Result<String> {
        if let Some(value) = self.resolved.get(name) {
            return Ok(value.clone());
        }

        let mut value = String::new();
        let mut stack = vec![self.open(name, position)?];
        while let Some(frame) = stack.last_mut() {
            let decl = frame.decl;
            let Some(segment) = decl.body.segments.get(frame.next) else {
                if let Some(done) = stack.pop() {
                    trace!(macro_name = %done.decl.name, value = %done.out, "resolved macro");
                    self.resolved
                        .insert(done.decl.name.clone(), done.out.clone());
                    match stack.last_mut() {
                        Some(parent) => parent.out.push_str(&done.out),
                        None => value = done.out,
                    }
                }
                continue;
            };
            frame.next += 1;

            match segment {
                Segment::Literal(lit) => frame.out.push_str(lit),
                Segment::Macro { name, position } => {
                    if let Some(known) = self.resolved.get(name) {
                        frame.out.push_str(known);
                        continue;
                    }
                    if let Some(start) = stack.iter().position(|f| f.decl.name == *name) {
                        let mut chain: Vec<String> =
                            stack[start..].iter().map(|f| f.decl.name.clone()).collect();
                        chain.push(name.clone());
                        return Err(FabError::MacroCycle { chain });
                    }
                    stack.push(self.open(name, *position)?);
                }
                Segment::Auto(var) => {
                    return Err(ParseError::new(
                        self.origin,
                        decl.body.position,
                        ParseErrorKind::MisplacedAutoVariable { var: var.sigil() },
                    )
                    .into());
                }
            }
        }

        Ok(value)
    }

    fn open(&self, name: &str, position: Position) -> std::result::Result<Frame<'a>, ParseError> {
        let table = self.table;
        let decl = table.get(name).ok_or_else(|| self.unknown(name, position))?;
        Ok(Frame {
            decl,
            next: 0,
            out: String::new(),
        })
    }

    fn unknown(&self, name: &str, position: Position) -> ParseError {
        ParseError::new(
            self.origin,
            position,
            ParseErrorKind::UnknownMacro {
                name: name.to_string(),
            },
        )
    }

    /// Expand `text` left to right. `rule` supplies `$@` / `$^`; without it
    /// an automatic variable is an error.
    pub fn expand(&mut self, text: &Text, rule: Option<RuleContext<'_>>) -> Result<String> {
        let mut out = String::new();

        for segment in &text.segments {
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Macro { name, position } => {
                    let value = self.expand_macro(name, *position)?;
                    out.push_str(&value);
                }
                Segment::Auto(var) => match (var, rule) {
                    (AutoVar::Target, Some(rule)) => out.push_str(rule.target),
                    (AutoVar::Dependencies, Some(rule)) => out.push_str(&rule.deps.join(" ")),
                    (_, None) => {
                        return Err(ParseError::new(
                            self.origin,
                            text.position,
                            ParseErrorKind::MisplacedAutoVariable { var: var.sigil() },
                        )
                        .into());
                    }
                },
            }
        }

        Ok(out)
    }
}
