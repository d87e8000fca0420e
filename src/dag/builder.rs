// src/dag/builder.rs

//! Turns parsed declarations into a [`BuildGraph`].
//!
//! A rule whose name contains `%` is a pattern rule (`%.o <- %.c { ... }`).
//! It gets no node of its own. Instead, every dependency or requested name
//! that no rule declares is matched against the patterns in declaration
//! order; the first match is instantiated as a concrete target, with the
//! stem substituted into its dependencies and `$@`/`$^` into its actions.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::DiGraph;
use tracing::{debug, trace};

use crate::dag::graph::{BuildGraph, TargetId};
use crate::dag::target::{ActionLine, Target};
use crate::errors::{FabError, ParseError, ParseErrorKind, Result};
use crate::expand::{Expander, MacroTable, RuleContext};
use crate::parse::{AliasDecl, BuildFile, Decl, Position, RuleDecl, Text, is_identifier};

/// Expand macros and build the dependency graph for a parsed build file.
///
/// Checks, in order: duplicate or broken macros, macro cycles, invalid
/// expanded names, duplicate target/alias names, dependency cycles.
pub fn build_graph(file: &BuildFile) -> Result<BuildGraph> {
    build_graph_for(file, &[])
}

/// Like [`build_graph`], also instantiating pattern rules for `requests`
/// (names the caller is about to plan) that no rule declares.
pub fn build_graph_for(file: &BuildFile, requests: &[&str]) -> Result<BuildGraph> {
    let table = MacroTable::from_build_file(file)?;
    let mut expander = Expander::new(&table, &file.origin);
    expander.expand_all()?;

    let mut builder = GraphBuilder::new(&file.origin);
    for decl in &file.decls {
        match decl {
            Decl::Rule(rule) => builder.add_rule(rule, &mut expander)?,
            Decl::Alias(alias) => builder.add_alias(alias, &mut expander)?,
            Decl::Macro(_) => {}
        }
    }

    let graph = builder.finish(requests, &mut expander)?;
    debug!(
        origin = %file.origin,
        targets = graph.len(),
        macros = table.len(),
        default = %graph.target(graph.default_target()).name,
        "built dependency graph"
    );
    Ok(graph)
}

/// A `%` rule, macros expanded, waiting to be instantiated.
#[derive(Debug)]
struct PatternRule {
    pattern: String,
    deps: Vec<String>,
    actions: Vec<Text>,
    position: Position,
}

impl PatternRule {
    /// The non-empty text `%` stands for when `name` matches.
    fn stem<'n>(&self, name: &'n str) -> Option<&'n str> {
        let (prefix, suffix) = self.pattern.split_once('%')?;
        let stem = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
        (!stem.is_empty()).then_some(stem)
    }
}

struct GraphBuilder<'a> {
    origin: &'a str,
    graph: DiGraph<Target, ()>,
    index: HashMap<String, TargetId>,
    patterns: Vec<PatternRule>,
    /// Where each name was first declared, for duplicate reports.
    declared_at: HashMap<String, Position>,
}

impl<'a> GraphBuilder<'a> {
    fn new(origin: &'a str) -> Self {
        Self {
            origin,
            graph: DiGraph::new(),
            index: HashMap::new(),
            patterns: Vec::new(),
            declared_at: HashMap::new(),
        }
    }

    fn error(&self, position: Position, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.origin, position, kind)
    }

    fn add_rule(&mut self, rule: &RuleDecl, expander: &mut Expander<'_>) -> Result<()> {
        let name = self.expand_name(&rule.name, expander)?;
        self.claim(&name, rule.position)?;
        let is_pattern = name.contains('%');
        if is_pattern && name.matches('%').count() > 1 {
            return Err(self
                .error(rule.position, ParseErrorKind::InvalidPattern { text: name })
                .into());
        }

        let mut deps = Vec::new();
        for dep in &rule.deps {
            let expanded = expander.expand(dep, None)?;
            for word in expanded.split_whitespace() {
                let kind = if !is_identifier(word) {
                    Some(ParseErrorKind::InvalidIdentifier {
                        text: word.to_string(),
                    })
                } else if word.contains('%') && !is_pattern {
                    Some(ParseErrorKind::MisplacedPattern {
                        text: word.to_string(),
                    })
                } else if word.matches('%').count() > 1 {
                    Some(ParseErrorKind::InvalidPattern {
                        text: word.to_string(),
                    })
                } else {
                    None
                };
                if let Some(kind) = kind {
                    return Err(self.error(dep.position, kind).into());
                }
                deps.push(word.to_string());
            }
        }

        // Pattern actions are expanded per instance; expanding them once here
        // reports undefined macros before anything runs.
        let actions = expand_actions(expander, &rule.actions, &name, &deps)?;

        if is_pattern {
            trace!(pattern = %name, ?deps, actions = actions.len(), "registered pattern rule");
            self.patterns.push(PatternRule {
                pattern: name,
                deps,
                actions: rule.actions.clone(),
                position: rule.position,
            });
            return Ok(());
        }

        trace!(rule = %name, ?deps, actions = actions.len(), "registered rule");
        let id = self.graph.add_node(Target {
            name: name.clone(),
            aliases: Vec::new(),
            deps,
            actions,
            declared_at: rule.position,
            pattern: None,
        });
        self.index.insert(name, id);
        Ok(())
    }

    fn add_alias(&mut self, alias: &AliasDecl, expander: &mut Expander<'_>) -> Result<()> {
        let target = self.expand_name(&alias.target, expander)?;
        let name = self.expand_name(&alias.alias, expander)?;

        if target.contains('%') {
            return Err(self
                .error(alias.position, ParseErrorKind::PatternAlias { pattern: target })
                .into());
        }
        if name.contains('%') {
            return Err(self
                .error(alias.position, ParseErrorKind::MisplacedPattern { text: name })
                .into());
        }

        // The parser emits aliases right after their rule.
        let Some(&id) = self.index.get(&target) else {
            return Err(FabError::UnknownTarget { name: target });
        };

        self.claim(&name, alias.position)?;
        trace!(alias = %name, rule = %target, "registered alias");
        self.graph[id].aliases.push(name.clone());
        self.index.insert(name, id);
        Ok(())
    }

    /// Expand a target or alias name; it must yield exactly one identifier.
    fn expand_name(&self, text: &Text, expander: &mut Expander<'_>) -> Result<String> {
        let expanded = expander.expand(text, None)?;
        if !is_identifier(&expanded) {
            return Err(self
                .error(
                    text.position,
                    ParseErrorKind::InvalidIdentifier { text: expanded },
                )
                .into());
        }
        Ok(expanded)
    }

    /// Reserve `name` for a target or alias declared at `position`.
    fn claim(&mut self, name: &str, position: Position) -> Result<()> {
        if let Some(&previous) = self.declared_at.get(name) {
            return Err(self
                .error(
                    position,
                    ParseErrorKind::DuplicateTarget {
                        name: name.to_string(),
                        previous,
                    },
                )
                .into());
        }
        self.declared_at.insert(name.to_string(), position);
        Ok(())
    }

    /// Instantiate pattern rules for every undeclared dependency and
    /// request, breadth first.
    ///
    /// Each queued name carries the patterns already used on its chain; a
    /// pattern is never applied twice in one chain, so `% <- %.x` stops
    /// after one step instead of growing forever.
    fn instantiate(&mut self, requests: &[&str], expander: &mut Expander<'_>) -> Result<()> {
        if self.patterns.is_empty() {
            return Ok(());
        }

        let mut queue: VecDeque<(String, Vec<usize>)> = self
            .graph
            .node_weights()
            .flat_map(|target| target.deps.iter().cloned())
            .chain(requests.iter().map(|r| r.to_string()))
            .map(|name| (name, Vec::new()))
            .collect();

        while let Some((name, used)) = queue.pop_front() {
            if name.contains('%') || self.index.contains_key(&name) {
                continue;
            }
            let found = self
                .patterns
                .iter()
                .enumerate()
                .filter(|(i, _)| !used.contains(i))
                .find_map(|(i, rule)| rule.stem(&name).map(|stem| (i, stem.to_string())));
            let Some((p, stem)) = found else {
                continue;
            };

            let rule = &self.patterns[p];
            let deps: Vec<String> = rule
                .deps
                .iter()
                .map(|dep| dep.replacen('%', &stem, 1))
                .collect();
            let actions = expand_actions(expander, &rule.actions, &name, &deps)?;
            trace!(rule = %name, pattern = %rule.pattern, %stem, "instantiated pattern rule");

            let mut chain = used;
            chain.push(p);
            queue.extend(deps.iter().map(|dep| (dep.clone(), chain.clone())));

            let id = self.graph.add_node(Target {
                name: name.clone(),
                aliases: Vec::new(),
                deps,
                actions,
                declared_at: rule.position,
                pattern: Some(rule.pattern.clone()),
            });
            self.index.insert(name, id);
        }

        Ok(())
    }

    fn finish(mut self, requests: &[&str], expander: &mut Expander<'_>) -> Result<BuildGraph> {
        // The default target is the first concrete rule; instances come later.
        if self.graph.node_count() == 0 {
            return Err(FabError::NoTargets);
        }
        self.instantiate(requests, expander)?;
        BuildGraph::assemble(self.graph, self.index)
    }
}

/// Expand action lines for the rule `name`, dropping lines that end up empty.
fn expand_actions(
    expander: &mut Expander<'_>,
    lines: &[Text],
    name: &str,
    deps: &[String],
) -> Result<Vec<ActionLine>> {
    let mut actions = Vec::new();
    for line in lines {
        let context = RuleContext { target: name, deps };
        let command = expander.expand(line, Some(context))?;
        let command = command.trim();
        if command.is_empty() {
            continue;
        }
        actions.push(ActionLine {
            position: actions.len(),
            command: command.to_string(),
        });
    }
    Ok(actions)
}
