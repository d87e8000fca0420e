pub mod builders;
pub mod recording_runner;

use std::sync::Once;
use std::time::Duration;

use fab::config::{load_from_str, load_requested};
use fab::dag::BuildGraph;
use fab::errors::Result;
use fab::logging::LOG_ENV;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Route `fab`'s tracing output into the test harness.
///
/// Directives come from `FAB_LOG` (the same variable the binary reads),
/// defaulting to `fab=debug`. Output is captured per test and only shown
/// for failing tests unless run with `-- --nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("fab=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    });
}

/// Origin used for build files written inline in tests.
pub const TEST_ORIGIN: &str = "Fabfile";

/// Load a graph from build-file text.
pub fn graph_from_source(source: &str) -> Result<BuildGraph> {
    load_from_str(source, TEST_ORIGIN)
}

/// Load a graph the way `fab <request>` would, so pattern rules are
/// instantiated for `request`.
pub fn graph_for_request(source: &str, request: &str) -> Result<BuildGraph> {
    load_requested(source, TEST_ORIGIN, &[request])
}

/// Fail the test instead of hanging when a build never finishes.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    match tokio::time::timeout(Duration::from_secs(10), f).await {
        Ok(value) => value,
        Err(_) => panic!("build did not finish within 10 seconds"),
    }
}
