// tests/patterns.rs

use std::error::Error;

use fab::dag::{BuildGraph, Scheduler};
use fab::errors::{FabError, ParseErrorKind};
use fab::parse::Position;
use fab_test_utils::recording_runner::RecordingRunner;
use fab_test_utils::{graph_for_request, graph_from_source, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const OBJECTS: &str = "\
app <- main.o util.o { cc -o $@ $^; }
%.o <- %.c { cc -c $^ -o $@; }
";

fn commands(graph: &BuildGraph, target: &str) -> Vec<String> {
    graph
        .get(target)
        .map(|t| t.actions.iter().map(|a| a.command.clone()).collect())
        .unwrap_or_default()
}

fn parse_error(source: &str) -> (ParseErrorKind, Position) {
    match graph_from_source(source) {
        Err(FabError::Parse(e)) => (e.kind, e.position),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn undeclared_dependencies_instantiate_a_pattern() -> TestResult {
    init_tracing();
    let graph = graph_from_source(OBJECTS)?;

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.target(graph.default_target()).name, "app");

    let main = graph.get("main.o").ok_or("main.o missing")?;
    assert_eq!(main.deps, vec!["main.c"]);
    assert_eq!(main.pattern.as_deref(), Some("%.o"));
    assert_eq!(main.declared_at, Position::new(2, 1));
    assert_eq!(commands(&graph, "main.o"), vec!["cc -c main.c -o main.o"]);
    assert_eq!(commands(&graph, "util.o"), vec!["cc -c util.c -o util.o"]);

    assert!(graph.get("app").is_some_and(|t| t.pattern.is_none()));
    assert!(graph.get("%.o").is_none());
    assert_eq!(graph.leaves().collect::<Vec<_>>(), vec!["main.c", "util.c"]);
    Ok(())
}

#[tokio::test]
async fn instances_build_before_their_dependents() -> TestResult {
    let graph = graph_from_source(OBJECTS)?;
    let scheduler = Scheduler::new(&graph);
    let mut runner = RecordingRunner::new();

    let report = with_timeout(scheduler.build(None, &mut runner)).await?;

    assert_eq!(
        runner.commands(),
        vec![
            "cc -c main.c -o main.o",
            "cc -c util.c -o util.o",
            "cc -o app main.o util.o",
        ]
    );
    assert_eq!(report.built, vec!["main.o", "util.o", "app"]);
    Ok(())
}

#[test]
fn declared_rules_win_over_patterns() -> TestResult {
    let source = format!("{OBJECTS}main.o {{ special; }}\n");
    let graph = graph_from_source(&source)?;

    assert_eq!(commands(&graph, "main.o"), vec!["special"]);
    assert!(graph.get("main.o").is_some_and(|t| t.pattern.is_none()));
    assert_eq!(graph.get("util.o").and_then(|t| t.pattern.clone()).as_deref(), Some("%.o"));
    Ok(())
}

#[test]
fn requested_names_instantiate_a_pattern() -> TestResult {
    let plain = graph_from_source(OBJECTS)?;
    assert!(matches!(
        Scheduler::new(&plain).plan(Some("lib.o")),
        Err(FabError::UnknownTarget { .. })
    ));

    let graph = graph_for_request(OBJECTS, "lib.o")?;
    let plan = Scheduler::new(&graph).plan(Some("lib.o"))?;

    assert_eq!(plan.target_names(&graph), vec!["lib.o"]);
    assert_eq!(commands(&graph, "lib.o"), vec!["cc -c lib.c -o lib.o"]);
    assert_eq!(graph.target(graph.default_target()).name, "app");
    Ok(())
}

#[test]
fn first_matching_pattern_in_declaration_order_wins() -> TestResult {
    let source = "\
all <- libm.o m.o { }
lib%.o <- lib%.c { first $^; }
%.o <- %.c { second $^; }
";
    let graph = graph_from_source(source)?;

    assert_eq!(commands(&graph, "libm.o"), vec!["first libm.c"]);
    assert_eq!(commands(&graph, "m.o"), vec!["second m.c"]);
    Ok(())
}

#[test]
fn patterns_chain_through_generated_dependencies() -> TestResult {
    let source = "\
all <- parse.o { }
%.o <- %.c { cc -c $^; }
%.c <- %.y { yacc $^ > $@; }
";
    let graph = graph_from_source(source)?;
    let plan = Scheduler::new(&graph).plan(None)?;

    assert_eq!(plan.target_names(&graph), vec!["parse.c", "parse.o", "all"]);
    assert_eq!(commands(&graph, "parse.c"), vec!["yacc parse.y > parse.c"]);
    assert_eq!(graph.leaves().collect::<Vec<_>>(), vec!["parse.y"]);
    Ok(())
}

#[test]
fn a_pattern_is_used_once_per_chain() -> TestResult {
    let graph = graph_from_source("all <- x { }\n% <- %.in { cp $^ $@; }")?;

    assert_eq!(commands(&graph, "x"), vec!["cp x.in x"]);
    assert!(graph.get("x.in").is_none());
    assert!(graph.is_leaf("x.in"));
    Ok(())
}

#[test]
fn the_stem_must_not_be_empty() -> TestResult {
    let graph = graph_from_source("all <- .o { }\n%.o <- %.c { cc; }")?;

    assert!(graph.get(".o").is_none());
    assert!(graph.is_leaf(".o"));
    Ok(())
}

#[test]
fn patterns_can_depend_on_fixed_names() -> TestResult {
    let graph = graph_from_source("all <- a.o { }\n%.o <- %.c config.h { cc -c $^; }")?;

    assert_eq!(commands(&graph, "a.o"), vec!["cc -c a.c config.h"]);
    Ok(())
}

#[test]
fn cycles_through_patterns_are_reported() {
    match graph_from_source("all <- a.o { }\n%.o <- all { x; }") {
        Err(FabError::Cycle { members }) => assert_eq!(members, vec!["all", "a.o", "all"]),
        other => panic!("expected a dependency cycle, got {other:?}"),
    }
}

#[test]
fn pattern_with_two_stems() {
    let (kind, at) = parse_error("all { }\n%.%.o <- x { }");
    assert_eq!(
        kind,
        ParseErrorKind::InvalidPattern {
            text: "%.%.o".to_string()
        }
    );
    assert_eq!(at, Position::new(2, 1));

    let (kind, _) = parse_error("all { }\n%.o <- %/%.c { }");
    assert_eq!(
        kind,
        ParseErrorKind::InvalidPattern {
            text: "%/%.c".to_string()
        }
    );
}

#[test]
fn percent_outside_a_pattern_rule() {
    let (kind, at) = parse_error("app <- %.o { }");
    assert_eq!(
        kind,
        ParseErrorKind::MisplacedPattern {
            text: "%.o".to_string()
        }
    );
    assert_eq!(at, Position::new(1, 8));

    assert_eq!(
        graph_from_source("app <- %.o { }").unwrap_err().to_string(),
        "Fabfile:1:8: `%.o': `%' is only valid in a pattern rule's name and dependencies"
    );
}

#[test]
fn pattern_rules_take_no_aliases() {
    let (kind, at) = parse_error("all { }\n%.o, objects <- %.c { }");
    assert_eq!(
        kind,
        ParseErrorKind::PatternAlias {
            pattern: "%.o".to_string()
        }
    );
    assert_eq!(at, Position::new(2, 6));
}

#[test]
fn duplicate_pattern() {
    let (kind, at) = parse_error("all { }\n%.o <- %.c { }\n%.o <- %.s { }");
    assert_eq!(
        kind,
        ParseErrorKind::DuplicateTarget {
            name: "%.o".to_string(),
            previous: Position::new(2, 1),
        }
    );
    assert_eq!(at, Position::new(3, 1));
}

#[test]
fn unused_pattern_actions_are_still_checked() {
    let (kind, at) = parse_error("all { }\n%.o <- %.c { $(CC) -c $^; }");
    assert_eq!(
        kind,
        ParseErrorKind::UnknownMacro {
            name: "CC".to_string()
        }
    );
    assert_eq!(at, Position::new(2, 14));
}

#[test]
fn patterns_alone_are_not_targets() {
    assert!(matches!(
        graph_from_source("%.o <- %.c { cc; }"),
        Err(FabError::NoTargets)
    ));
}
