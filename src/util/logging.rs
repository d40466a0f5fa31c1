//! `tracing` subscriber setup
//!
//! All log output goes to stderr; stdout is reserved for token output.
//! `RUST_LOG` directives are honoured on top of the configured level, and
//! `tokenscout` itself is always raised to at least that level.
//!
//! ```no_run
//! use tokenscout::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(path = "tailwind.config.js", "Evaluating config");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LEVEL_VAR: &str = "TOKENSCOUT_LOG_LEVEL";
const FORMAT_VAR: &str = "TOKENSCOUT_LOG_FORMAT";

static INIT: Once = Once::new();

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON, everything else is console output
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Console
        }
    }

    /// Reads `TOKENSCOUT_LOG_FORMAT`
    pub fn from_env() -> Self {
        env::var(FORMAT_VAR)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    /// Show `tokenscout::detection` style targets
    pub include_target: bool,
    /// Show file:line of the call site
    pub include_location: bool,
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Console,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// JSON lines with call-site and thread metadata, for CI log collectors
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Json,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    pub fn development() -> Self {
        Self::with_level(Level::DEBUG)
    }

    /// Level from `TOKENSCOUT_LOG_LEVEL` (default `info`), format from
    /// `TOKENSCOUT_LOG_FORMAT`
    pub fn from_env() -> Self {
        let level = env::var(LEVEL_VAR)
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);
        Self::with_level(level).with_format(LogFormat::from_env())
    }
}

/// Unknown names fall back to INFO
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn crate_directive(level: Level) -> Directive {
    // Infallible for a crate name plus a known level
    format!("{}={}", env!("CARGO_PKG_NAME"), level)
        .to_lowercase()
        .parse()
        .unwrap_or_else(|_| LevelFilter::from_level(level).into())
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
        .add_directive(crate_directive(level))
}

/// Installs the global subscriber. Later calls are no-ops, as is a call
/// made after some other subscriber was already set (e.g. by a test harness).
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let layer = match config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(config.include_target)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread_ids)
                .with_thread_names(config.include_thread_ids)
                .boxed(),
            LogFormat::Console => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.include_target)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread_ids)
                .with_thread_names(config.include_thread_ids)
                .boxed(),
        };

        let _ = tracing_subscriber::registry()
            .with(layer)
            .with(build_filter(config.level))
            .try_init();
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
