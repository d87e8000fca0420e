// tests/graph.rs

use std::error::Error;
use std::fmt::Write;

use fab::dag::Dependency;
use fab::errors::{FabError, ParseErrorKind};
use fab::parse::Position;
use fab_test_utils::builders::{chain_fabfile, diamond_fabfile};
use fab_test_utils::{graph_from_source, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

fn cycle_members(source: &str) -> Vec<String> {
    match graph_from_source(source) {
        Err(FabError::Cycle { members }) => members,
        other => panic!("expected a dependency cycle, got {other:?}"),
    }
}

fn duplicate(source: &str) -> (String, Position, Position) {
    match graph_from_source(source) {
        Err(FabError::Parse(e)) => match e.kind {
            ParseErrorKind::DuplicateTarget { name, previous } => (name, previous, e.position),
            other => panic!("expected DuplicateTarget, got {other:?}"),
        },
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn first_rule_is_the_default_target() -> TestResult {
    init_tracing();
    let graph = graph_from_source(&chain_fabfile())?;

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.target(graph.default_target()).name, "foo");
    let names: Vec<&str> = graph.targets().map(|(_, t)| t.name.as_str()).collect();
    assert_eq!(names, vec!["foo", "bar", "baz"]);
    Ok(())
}

#[test]
fn default_target_ignores_macros_declared_first() -> TestResult {
    let graph = graph_from_source("X := 1;\nsecond { echo $(X); }\nthird { }")?;
    assert_eq!(graph.target(graph.default_target()).name, "second");
    Ok(())
}

#[test]
fn aliases_resolve_to_the_same_target() -> TestResult {
    let graph = graph_from_source("foo, f, g <- bar { echo 3; }\nbar { echo 2; }")?;

    assert_eq!(graph.len(), 2);
    let foo = graph.resolve("foo").ok_or("foo missing")?;
    assert_eq!(graph.resolve("f"), Some(foo));
    assert_eq!(graph.resolve("g"), Some(foo));

    let target = graph.target(foo);
    assert_eq!(target.name, "foo");
    assert_eq!(target.aliases, vec!["f", "g"]);
    assert!(target.answers_to("g"));
    assert!(!target.answers_to("bar"));
    Ok(())
}

#[test]
fn dependency_on_an_alias_is_an_edge_to_its_target() -> TestResult {
    let graph = graph_from_source("top <- short { }\nlong, short { echo long; }")?;

    let top = graph.resolve("top").ok_or("top missing")?;
    let long = graph.resolve("long").ok_or("long missing")?;
    assert_eq!(
        graph.dependencies(top).collect::<Vec<_>>(),
        vec![Dependency::Target(long)]
    );
    assert_eq!(graph.leaves().count(), 0);
    Ok(())
}

#[test]
fn duplicate_target_name() {
    let (name, previous, at) = duplicate("a { x; }\na { y; }");
    assert_eq!(name, "a");
    assert_eq!(previous, Position::new(1, 1));
    assert_eq!(at, Position::new(2, 1));
}

#[test]
fn alias_clashing_with_a_target() {
    let (name, previous, at) = duplicate("a { x; }\nb, a { y; }");
    assert_eq!(name, "a");
    assert_eq!(previous, Position::new(1, 1));
    assert_eq!(at, Position::new(2, 4));
}

#[test]
fn alias_clashing_with_another_alias() {
    let (name, _, at) = duplicate("a, x { }\nb, x { }");
    assert_eq!(name, "x");
    assert_eq!(at, Position::new(2, 4));
}

#[test]
fn two_rule_cycle() {
    assert_eq!(
        cycle_members("a <- b { echo a; }\nb <- a { echo b; }"),
        vec!["a", "b", "a"]
    );
}

#[test]
fn self_dependency() {
    assert_eq!(cycle_members("a <- a { x; }"), vec!["a", "a"]);
}

#[test]
fn cycle_below_the_default_target() {
    let source = "top <- a { }\na <- b { }\nb <- c { }\nc <- a { }";
    assert_eq!(cycle_members(source), vec!["a", "b", "c", "a"]);

    let err = graph_from_source(source).unwrap_err();
    assert_eq!(err.to_string(), "dependency cycle detected: a -> b -> c -> a");
}

#[test]
fn cycle_through_an_alias_uses_canonical_names() {
    assert_eq!(
        cycle_members("a <- bb { }\nb, bb <- a { }"),
        vec!["a", "b", "a"]
    );
}

#[test]
fn undeclared_dependencies_are_leaves() -> TestResult {
    let graph = graph_from_source("app <- util.c main.c lib { cc; }\nlib { ar; }")?;

    assert_eq!(graph.leaves().collect::<Vec<_>>(), vec!["main.c", "util.c"]);
    assert!(graph.is_leaf("main.c"));
    assert!(!graph.is_leaf("lib"));
    assert!(graph.resolve("main.c").is_none());

    let app = graph.resolve("app").ok_or("app missing")?;
    let lib = graph.resolve("lib").ok_or("lib missing")?;
    assert_eq!(
        graph.dependencies(app).collect::<Vec<_>>(),
        vec![
            Dependency::Leaf("util.c"),
            Dependency::Leaf("main.c"),
            Dependency::Target(lib),
        ]
    );
    Ok(())
}

#[test]
fn file_without_rules_is_rejected() {
    assert!(matches!(graph_from_source(""), Err(FabError::NoTargets)));
    assert!(matches!(
        graph_from_source("A := 1;\n// only a macro"),
        Err(FabError::NoTargets)
    ));
}

#[test]
fn dependents_in_a_diamond() -> TestResult {
    let graph = graph_from_source(&diamond_fabfile())?;

    let top = graph.resolve("top").ok_or("top missing")?;
    let left = graph.resolve("left").ok_or("left missing")?;
    let right = graph.resolve("right").ok_or("right missing")?;
    let base = graph.resolve("base").ok_or("base missing")?;

    assert_eq!(
        graph.dependencies(top).collect::<Vec<_>>(),
        vec![Dependency::Target(left), Dependency::Target(right)]
    );

    let mut dependents: Vec<_> = graph.dependents_of(base).collect();
    dependents.sort();
    assert_eq!(dependents, vec![left, right]);
    assert_eq!(graph.dependents_of(top).count(), 0);
    Ok(())
}

#[test]
fn action_lines_keep_block_order() -> TestResult {
    let graph = graph_from_source("t { echo a; echo b; echo c }")?;

    let t = graph.get("t").ok_or("t missing")?;
    let lines: Vec<(usize, &str)> = t
        .actions
        .iter()
        .map(|a| (a.position, a.command.as_str()))
        .collect();
    assert_eq!(lines, vec![(0, "echo a"), (1, "echo b"), (2, "echo c")]);
    assert_eq!(t.declared_at, Position::START);
    Ok(())
}

#[test]
fn cycle_closing_a_very_deep_chain() -> TestResult {
    const DEPTH: usize = 100_000;
    let mut source = String::new();
    for i in 0..DEPTH {
        writeln!(source, "t{i} <- t{} {{ true; }}", (i + 1) % DEPTH)?;
    }

    let members = cycle_members(&source);

    assert_eq!(members.len(), DEPTH + 1);
    assert_eq!(members.first().map(String::as_str), Some("t0"));
    assert_eq!(members.get(1).map(String::as_str), Some("t1"));
    assert_eq!(members.last().map(String::as_str), Some("t0"));
    Ok(())
}
