// tests/config_loading.rs

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use fab::cli::{CliArgs, LogLevel};
use fab::config::{BuildConfig, default_build_file_path, load_from_path, load_graph};
use fab::errors::FabError;
use fab::logging::log_filter;
use fab_test_utils::builders::chain_fabfile;
use tempfile::NamedTempFile;
use tracing_subscriber::filter::LevelFilter;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn loads_a_build_file_from_disk() -> TestResult {
    let mut file = NamedTempFile::new()?;
    file.write_all(chain_fabfile().as_bytes())?;

    let graph = load_from_path(file.path())?;

    assert_eq!(graph.len(), 3);
    assert!(graph.is_leaf("qux"));
    Ok(())
}

#[test]
fn errors_name_the_file_they_came_from() -> TestResult {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"all { echo $(NOPE); }\n")?;

    let err = load_from_path(file.path()).unwrap_err();

    let expected = format!("{}:1:12: undefined macro `NOPE'", file.path().display());
    assert_eq!(err.to_string(), expected);
    Ok(())
}

#[test]
fn missing_file_is_a_read_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Fabfile");

    match load_from_path(&path) {
        Err(FabError::ReadBuildFile { path: reported, source }) => {
            assert_eq!(reported, path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected ReadBuildFile, got {other:?}"),
    }
    Ok(())
}

#[test]
fn load_graph_reads_the_configured_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let build_file = dir.path().join("build.fab");
    std::fs::write(&build_file, "only { echo only; }")?;

    let config = BuildConfig::new(&build_file, dir.path()).with_target("only");
    let graph = load_graph(&config)?;

    assert!(graph.get("only").is_some());
    assert_eq!(config.target.as_deref(), Some("only"));
    Ok(())
}

#[test]
fn cli_defaults() -> TestResult {
    let args = CliArgs::try_parse_from(["fab"])?;

    assert_eq!(args.file, default_build_file_path());
    assert_eq!(args.file, PathBuf::from("Fabfile"));
    assert!(args.target.is_none());
    assert!(!args.dry_run);
    assert!(!args.echo);
    assert!(args.log_level.is_none());
    Ok(())
}

#[test]
fn cli_flags_flow_into_the_build_config() -> TestResult {
    let args = CliArgs::try_parse_from(["fab", "-f", "other.fab", "-n", "--echo", "install"])?;

    let config = BuildConfig::from_args(&args)?;

    assert_eq!(config.build_file, PathBuf::from("other.fab"));
    assert_eq!(config.target.as_deref(), Some("install"));
    assert!(config.dry_run);
    assert!(config.echo);
    assert_eq!(config.working_dir, std::env::current_dir()?);
    Ok(())
}

#[test]
fn cli_rejects_unknown_log_level() {
    assert!(CliArgs::try_parse_from(["fab", "--log-level", "loud"]).is_err());
    assert!(CliArgs::try_parse_from(["fab", "--log-level", "debug"]).is_ok());
}

#[test]
fn log_filter_priority() {
    let hint = |cli, env| log_filter(cli, env).max_level_hint();

    assert_eq!(hint(None, None), Some(LevelFilter::WARN));
    assert_eq!(hint(None, Some("fab::dag=trace")), Some(LevelFilter::TRACE));
    assert_eq!(hint(Some(LogLevel::Debug), Some("trace")), Some(LevelFilter::DEBUG));
    assert_eq!(hint(None, Some("fab=loud")), Some(LevelFilter::WARN));
}
