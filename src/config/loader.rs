// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::BuildConfig;
use crate::dag::{BuildGraph, build_graph_for};
use crate::errors::{FabError, Result};
use crate::parse::parse_with_origin;

/// Name of the build file looked up when `-f` is not given.
pub const DEFAULT_BUILD_FILE: &str = "Fabfile";

/// Parse, expand and validate build-file text.
///
/// `origin` names the source in error messages.
pub fn load_from_str(source: &str, origin: &str) -> Result<BuildGraph> {
    load_requested(source, origin, &[])
}

/// [`load_from_str`], also instantiating pattern rules for `requests`.
pub fn load_requested(source: &str, origin: &str, requests: &[&str]) -> Result<BuildGraph> {
    let file = parse_with_origin(source, origin)?;
    debug!(origin = %origin, decls = file.decls.len(), "parsed build file");
    build_graph_for(&file, requests)
}

fn read_build_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| FabError::ReadBuildFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a build file from `path` and load it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<BuildGraph> {
    let path = path.as_ref();
    let contents = read_build_file(path)?;
    load_from_str(&contents, &path.display().to_string())
}

/// Load the build file named by `config`.
///
/// This is the entry point for the rest of the application. Everything that
/// can be wrong with the build file (syntax, undefined or circular macros,
/// duplicate names, dependency cycles) is reported here, before any action
/// runs. The requested target, if any, takes part in pattern matching.
pub fn load_graph(config: &BuildConfig) -> Result<BuildGraph> {
    let path = &config.build_file;
    let contents = read_build_file(path)?;
    let requests: Vec<&str> = config.target.as_deref().into_iter().collect();
    load_requested(&contents, &path.display().to_string(), &requests)
}

/// Build file used when none is given on the command line.
pub fn default_build_file_path() -> PathBuf {
    PathBuf::from(DEFAULT_BUILD_FILE)
}
