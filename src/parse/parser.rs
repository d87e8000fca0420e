// src/parse/parser.rs

//! Recursive-descent parser for build files.
//!
//! ```text
//! file     := (comment | decl)*
//! decl     := word ":=" text (";" | "\n" | EOF)
//!           | word ("," word)* ["<-" word*] "{" text (";" text)* [";"] "}"
//! word     := (ident-char | "$(" name ")")+
//! ```
//!
//! Action and macro text keeps `$(NAME)` references as segments; nothing is
//! expanded here.

use tracing::trace;

use crate::errors::{ParseError, ParseErrorKind};
use crate::parse::ast::{
    AliasDecl, AutoVar, BuildFile, Decl, MacroDecl, Position, RuleDecl, Segment, Text,
};
use crate::parse::cursor::Cursor;
use crate::parse::{is_ident_char, is_identifier};

type PResult<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextContext {
    /// Inside `{ ... }`: ends at `;` or `}`.
    Action,
    /// After `:=`: ends at `;` or newline.
    MacroBody,
}

pub struct Parser<'a> {
    cursor: Cursor<'a>,
    origin: String,
    decls: Vec<Decl>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, origin: impl Into<String>) -> Self {
        Self {
            cursor: Cursor::new(source),
            origin: origin.into(),
            decls: Vec::new(),
        }
    }

    pub fn parse(mut self) -> PResult<BuildFile> {
        loop {
            self.skip_trivia();
            if self.cursor.is_eof() {
                break;
            }
            self.declaration()?;
        }

        trace!(origin = %self.origin, decls = self.decls.len(), "parsed build file");
        Ok(BuildFile {
            origin: self.origin,
            decls: self.decls,
        })
    }

    fn error(&self, position: Position, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.origin.clone(), position, kind)
    }

    /// Error for whatever sits at the cursor when `expected` was wanted.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        let kind = match self.cursor.peek() {
            Some(found) => ParseErrorKind::UnexpectedChar { found, expected },
            None => ParseErrorKind::UnexpectedEof { expected },
        };
        self.error(self.cursor.position(), kind)
    }

    /// Whitespace (including newlines) and `//` comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.bump();
                }
                Some('/') if self.cursor.starts_with("//") => self.cursor.skip_line(),
                _ => break,
            }
        }
    }

    fn declaration(&mut self) -> PResult<()> {
        let position = self.cursor.position();
        let name = self.word("a target or macro name")?;
        self.skip_trivia();

        if self.cursor.starts_with(":=") {
            self.cursor.bump_n(2);
            return self.macro_declaration(name, position);
        }

        let mut aliases = Vec::new();
        while self.cursor.eat(',') {
            self.skip_trivia();
            aliases.push(self.word("an alias name")?);
            self.skip_trivia();
        }

        let deps = if self.cursor.starts_with("<-") {
            self.cursor.bump_n(2);
            self.dependencies()?
        } else {
            Vec::new()
        };

        let open = self.cursor.position();
        if !self.cursor.eat('{') {
            let expected = if deps.is_empty() {
                "':=', ',', '<-' or '{'"
            } else {
                "'{'"
            };
            return Err(self.unexpected(expected));
        }
        let actions = self.action_block(open)?;

        trace!(
            rule = %name,
            deps = deps.len(),
            actions = actions.len(),
            "parsed rule"
        );

        self.decls.push(Decl::Rule(RuleDecl {
            name: name.clone(),
            deps,
            actions,
            position,
        }));
        for alias in aliases {
            let position = alias.position;
            self.decls.push(Decl::Alias(AliasDecl {
                alias,
                target: name.clone(),
                position,
            }));
        }

        Ok(())
    }

    fn macro_declaration(&mut self, name: Text, position: Position) -> PResult<()> {
        let name = match name.as_literal() {
            Some(name) => name,
            None => {
                let referenced = name
                    .macro_refs()
                    .next()
                    .map(|(n, _)| n.to_string())
                    .unwrap_or_default();
                return Err(self.error(
                    position,
                    ParseErrorKind::NonLiteralMacroName { name: referenced },
                ));
            }
        };

        let (body, _) = self.text_until(TextContext::MacroBody)?;
        trace!(macro_name = %name, "parsed macro");
        self.decls.push(Decl::Macro(MacroDecl {
            name,
            body,
            position,
        }));
        Ok(())
    }

    fn dependencies(&mut self) -> PResult<Vec<Text>> {
        let mut deps = Vec::new();
        loop {
            self.skip_trivia();
            match self.cursor.peek() {
                Some('{') | None => return Ok(deps),
                _ => deps.push(self.word("a dependency name or '{'")?),
            }
        }
    }

    /// A name: identifier characters and `$(NAME)` references.
    fn word(&mut self, expected: &'static str) -> PResult<Text> {
        let mut text = Text::new(self.cursor.position());
        loop {
            match self.cursor.peek() {
                Some('$') => {
                    let at = self.cursor.position();
                    self.cursor.bump();
                    match self.cursor.peek() {
                        Some('(') => {
                            let segment = self.macro_reference(at)?;
                            text.push(segment);
                        }
                        Some(var) if AutoVar::from_sigil(var).is_some() => {
                            return Err(
                                self.error(at, ParseErrorKind::MisplacedAutoVariable { var })
                            );
                        }
                        _ => {
                            return Err(self.error(
                                at,
                                ParseErrorKind::InvalidIdentifier {
                                    text: format!("{text}$"),
                                },
                            ));
                        }
                    }
                }
                Some(c) if is_ident_char(c) => {
                    self.cursor.bump();
                    text.push_char(c);
                }
                _ => break,
            }
        }

        if text.is_empty() {
            return Err(self.unexpected(expected));
        }
        Ok(text)
    }

    /// `(NAME)` following a `$` at `at`.
    fn macro_reference(&mut self, at: Position) -> PResult<Segment> {
        self.cursor.bump();
        let mut name = String::new();
        loop {
            match self.cursor.peek() {
                Some(')') => {
                    self.cursor.bump();
                    break;
                }
                Some('\n') | None => {
                    return Err(self.error(at, ParseErrorKind::UnterminatedMacroRef));
                }
                Some(c) => {
                    self.cursor.bump();
                    name.push(c);
                }
            }
        }

        if !is_identifier(&name) {
            return Err(self.error(at, ParseErrorKind::InvalidIdentifier { text: name }));
        }
        Ok(Segment::Macro { name, position: at })
    }

    /// Action lines up to the closing `}` of a block opened at `open`.
    fn action_block(&mut self, open: Position) -> PResult<Vec<Text>> {
        let mut actions = Vec::new();
        loop {
            let (line, terminator) = self.text_until(TextContext::Action)?;
            if !line.is_empty() {
                actions.push(line);
            }
            match terminator {
                Some(';') => continue,
                Some('}') => return Ok(actions),
                _ => return Err(self.error(open, ParseErrorKind::UnterminatedBlock)),
            }
        }
    }

    /// Scan text until an unquoted terminator for `context`.
    ///
    /// Whitespace runs outside quotes collapse to one space and the result is
    /// trimmed. Returns the consumed terminator, or `None` at end of input.
    fn text_until(&mut self, context: TextContext) -> PResult<(Text, Option<char>)> {
        let mut text = Text::new(self.cursor.position());
        let mut pending_space = false;
        let mut quote: Option<(char, Position)> = None;

        loop {
            let Some(c) = self.cursor.peek() else {
                if let Some((_, at)) = quote {
                    return Err(self.error(at, ParseErrorKind::UnterminatedQuote));
                }
                return Ok((text, None));
            };

            if let Some((q, _)) = quote {
                match c {
                    '$' => self.dollar(&mut text, context)?,
                    '\\' if q == '"' => self.escaped(&mut text),
                    _ => {
                        self.cursor.bump();
                        text.push_char(c);
                        if c == q {
                            quote = None;
                        }
                    }
                }
                continue;
            }

            match c {
                ';' => {
                    self.cursor.bump();
                    return Ok((text, Some(';')));
                }
                '}' if context == TextContext::Action => {
                    self.cursor.bump();
                    return Ok((text, Some('}')));
                }
                '\n' if context == TextContext::MacroBody => {
                    self.cursor.bump();
                    return Ok((text, Some('\n')));
                }
                '/' if self.cursor.starts_with("//") && (text.is_empty() || pending_space) => {
                    self.cursor.skip_line();
                }
                c if c.is_whitespace() => {
                    self.cursor.bump();
                    pending_space = !text.is_empty();
                }
                _ => {
                    if pending_space {
                        text.push_char(' ');
                        pending_space = false;
                    }
                    if text.is_empty() {
                        text.position = self.cursor.position();
                    }
                    match c {
                        '"' | '\'' => {
                            quote = Some((c, self.cursor.position()));
                            self.cursor.bump();
                            text.push_char(c);
                        }
                        '$' => self.dollar(&mut text, context)?,
                        '\\' => self.escaped(&mut text),
                        _ => {
                            self.cursor.bump();
                            text.push_char(c);
                        }
                    }
                }
            }
        }
    }

    /// A backslash and the character it escapes, kept verbatim for the shell.
    fn escaped(&mut self, text: &mut Text) {
        if let Some(c) = self.cursor.bump() {
            text.push_char(c);
        }
        if let Some(c) = self.cursor.bump() {
            text.push_char(c);
        }
    }

    /// `$` inside action or macro text.
    fn dollar(&mut self, text: &mut Text, context: TextContext) -> PResult<()> {
        let at = self.cursor.position();
        self.cursor.bump();

        match self.cursor.peek() {
            Some('(') => {
                let segment = self.macro_reference(at)?;
                text.push(segment);
            }
            Some('$') => {
                self.cursor.bump();
                text.push_char('$');
            }
            Some(c) => match AutoVar::from_sigil(c) {
                Some(var) if context == TextContext::Action => {
                    self.cursor.bump();
                    text.push(Segment::Auto(var));
                }
                Some(_) => {
                    return Err(self.error(at, ParseErrorKind::MisplacedAutoVariable { var: c }));
                }
                None => text.push_char('$'),
            },
            None => text.push_char('$'),
        }
        Ok(())
    }
}
