// src/logging.rs

//! Tracing setup for the `fab` binary.
//!
//! Filter directives, first match wins:
//! 1. `--log-level`, applied to every module
//! 2. `FAB_LOG`, in `EnvFilter` syntax (`info`, `fab::dag=trace`, ...)
//! 3. `warn`
//!
//! Output goes to stderr. Stdout belongs to the actions being run.

use anyhow::{Result, anyhow};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV: &str = "FAB_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// The filter for an optional CLI level and the raw `FAB_LOG` value.
///
/// A `FAB_LOG` that does not parse falls back to the default.
pub fn log_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::default().add_directive(level.as_filter().into());
    }
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Call once, before loading the build file.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();

    fmt()
        .with_env_filter(log_filter(cli_level, env.as_deref()))
        .with_writer(std::io::stderr)
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}
