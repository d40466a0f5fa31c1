//! Limits that bound the work done on an untrusted project
//!
//! Every field can be set through a `TOKENSCOUT_*` environment variable;
//! unset or unparseable values keep their default.
//!
//! | Variable | Default |
//! |---|---|
//! | `TOKENSCOUT_EVAL_TIMEOUT_MS` | 5000 |
//! | `TOKENSCOUT_MAX_FILE_SIZE` | 1048576 |
//! | `TOKENSCOUT_MAX_DEPTH` | 6 |
//! | `TOKENSCOUT_MAX_FILES` | 2000 |
//! | `TOKENSCOUT_NODE_BIN` | `node` |
//! | `TOKENSCOUT_OUTPUT_DIR` | `.tokenscout` |
//! | `TOKENSCOUT_LOG_LEVEL` | `info` |
//!
//! ```no_run
//! use std::time::Duration;
//! use tokenscout::TokenscoutConfig;
//!
//! let config = TokenscoutConfig::from_env().with_eval_timeout(Duration::from_secs(2));
//! config.validate().expect("limits out of range");
//! ```

use crate::evaluator::EvaluatorConfig;
use crate::fs::WalkLimits;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_EVAL_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
const DEFAULT_MAX_DEPTH: usize = 6;
const DEFAULT_MAX_FILES: usize = 2_000;
const DEFAULT_NODE_BIN: &str = "node";
const DEFAULT_OUTPUT_DIR: &str = ".tokenscout";
const DEFAULT_LOG_LEVEL: &str = "info";

const EVAL_TIMEOUT_MS_RANGE: (u64, u64) = (100, 60_000);
const MAX_FILE_SIZE_RANGE: (u64, u64) = (1024, 50 * 1024 * 1024);
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("Unknown log level '{0}', expected one of: trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

#[derive(Debug, Clone)]
pub struct TokenscoutConfig {
    /// Wall-clock limit for evaluating one configuration module
    pub eval_timeout: Duration,
    /// Files above this size are never read or evaluated
    pub max_file_size: u64,
    pub max_depth: usize,
    pub max_files: usize,
    /// JavaScript runtime used for dynamic evaluation
    pub node_bin: String,
    /// Where the detection log goes; relative paths resolve against the
    /// project root
    pub output_dir: PathBuf,
    pub log_level: String,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn check_range(field: &'static str, value: u64, (min, max): (u64, u64)) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl TokenscoutConfig {
    /// Reads every `TOKENSCOUT_*` variable over the built-in defaults
    pub fn from_env() -> Self {
        Self {
            eval_timeout: Duration::from_millis(
                env_parse("TOKENSCOUT_EVAL_TIMEOUT_MS").unwrap_or(DEFAULT_EVAL_TIMEOUT_MS),
            ),
            max_file_size: env_parse("TOKENSCOUT_MAX_FILE_SIZE").unwrap_or(DEFAULT_MAX_FILE_SIZE),
            max_depth: env_parse("TOKENSCOUT_MAX_DEPTH").unwrap_or(DEFAULT_MAX_DEPTH),
            max_files: env_parse("TOKENSCOUT_MAX_FILES").unwrap_or(DEFAULT_MAX_FILES),
            node_bin: env_string("TOKENSCOUT_NODE_BIN")
                .unwrap_or_else(|| DEFAULT_NODE_BIN.to_string()),
            output_dir: env_string("TOKENSCOUT_OUTPUT_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from),
            log_level: env_string("TOKENSCOUT_LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
        }
    }

    pub fn with_eval_timeout(mut self, timeout: Duration) -> Self {
        self.eval_timeout = timeout;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_files(mut self, files: usize) -> Self {
        self.max_files = files;
        self
    }

    pub fn with_node_bin(mut self, node_bin: impl Into<String>) -> Self {
        self.node_bin = node_bin.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeout_ms = u64::try_from(self.eval_timeout.as_millis()).unwrap_or(u64::MAX);
        check_range("Evaluation timeout (ms)", timeout_ms, EVAL_TIMEOUT_MS_RANGE)?;
        check_range("Max file size", self.max_file_size, MAX_FILE_SIZE_RANGE)?;
        if self.max_depth == 0 {
            return Err(ConfigError::Zero("Max depth"));
        }
        if self.max_files == 0 {
            return Err(ConfigError::Zero("Max files"));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::UnknownLogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            timeout: self.eval_timeout,
            max_file_size: self.max_file_size,
            node_bin: self.node_bin.clone(),
        }
    }

    pub fn walk_limits(&self) -> WalkLimits {
        WalkLimits {
            max_depth: self.max_depth,
            max_files: self.max_files,
        }
    }

    pub fn output_dir_for(&self, project_root: &Path) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            project_root.join(&self.output_dir)
        }
    }
}

impl Default for TokenscoutConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Display for TokenscoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tokenscout limits:")?;
        writeln!(f, "  eval timeout   {}ms", self.eval_timeout.as_millis())?;
        writeln!(f, "  max file size  {} bytes", self.max_file_size)?;
        writeln!(f, "  walk           depth {}, {} files", self.max_depth, self.max_files)?;
        writeln!(f, "  node           {}", self.node_bin)?;
        writeln!(f, "  output dir     {}", self.output_dir.display())?;
        write!(f, "  log level      {}", self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use yare::parameterized;

    const VARS: &[&str] = &[
        "TOKENSCOUT_EVAL_TIMEOUT_MS",
        "TOKENSCOUT_MAX_FILE_SIZE",
        "TOKENSCOUT_MAX_DEPTH",
        "TOKENSCOUT_MAX_FILES",
        "TOKENSCOUT_NODE_BIN",
        "TOKENSCOUT_OUTPUT_DIR",
        "TOKENSCOUT_LOG_LEVEL",
    ];

    /// Clears every config variable, applies `overrides`, and restores the
    /// previous environment on drop
    struct ScopedEnv(Vec<(&'static str, Option<String>)>);

    impl ScopedEnv {
        fn with(overrides: &[(&str, &str)]) -> Self {
            let saved = VARS.iter().map(|k| (*k, env::var(k).ok())).collect();
            for key in VARS {
                env::remove_var(key);
            }
            for (key, value) in overrides {
                env::set_var(key, value);
            }
            ScopedEnv(saved)
        }
    }

    impl Drop for ScopedEnv {
        fn drop(&mut self) {
            for (key, value) in &self.0 {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let _env = ScopedEnv::with(&[]);
        let config = TokenscoutConfig::from_env();

        assert_eq!(config.eval_timeout, Duration::from_secs(5));
        assert_eq!(config.max_file_size, 1_048_576);
        assert_eq!(config.walk_limits().max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.walk_limits().max_files, DEFAULT_MAX_FILES);
        assert_eq!(config.node_bin, "node");
        assert_eq!(config.output_dir, PathBuf::from(".tokenscout"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let _env = ScopedEnv::with(&[
            ("TOKENSCOUT_EVAL_TIMEOUT_MS", "2500"),
            ("TOKENSCOUT_MAX_FILE_SIZE", "4096"),
            ("TOKENSCOUT_MAX_DEPTH", " 3 "),
            ("TOKENSCOUT_MAX_FILES", "50"),
            ("TOKENSCOUT_NODE_BIN", "/usr/local/bin/node"),
            ("TOKENSCOUT_OUTPUT_DIR", "/tmp/out"),
            ("TOKENSCOUT_LOG_LEVEL", "DEBUG"),
        ]);
        let config = TokenscoutConfig::default();

        assert_eq!(config.eval_timeout, Duration::from_millis(2500));
        assert_eq!(config.max_file_size, 4096);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_files, 50);
        assert_eq!(config.node_bin, "/usr/local/bin/node");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparseable_and_blank_values_keep_defaults() {
        let _env = ScopedEnv::with(&[
            ("TOKENSCOUT_EVAL_TIMEOUT_MS", "soon"),
            ("TOKENSCOUT_MAX_DEPTH", "-1"),
            ("TOKENSCOUT_NODE_BIN", "  "),
        ]);
        let config = TokenscoutConfig::from_env();

        assert_eq!(config.eval_timeout, Duration::from_millis(DEFAULT_EVAL_TIMEOUT_MS));
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.node_bin, DEFAULT_NODE_BIN);
    }

    fn valid() -> TokenscoutConfig {
        TokenscoutConfig {
            eval_timeout: Duration::from_secs(5),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            max_files: DEFAULT_MAX_FILES,
            node_bin: DEFAULT_NODE_BIN.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    #[parameterized(
        timeout_too_short = { valid().with_eval_timeout(Duration::from_millis(10)) },
        timeout_too_long = { valid().with_eval_timeout(Duration::from_secs(120)) },
        tiny_file_limit = { valid().with_max_file_size(10) },
        huge_file_limit = { valid().with_max_file_size(u64::MAX) },
        zero_depth = { valid().with_max_depth(0) },
        zero_files = { valid().with_max_files(0) },
        bad_level = { TokenscoutConfig { log_level: "verbose".into(), ..valid() } },
    )]
    fn rejects_out_of_range(config: TokenscoutConfig) {
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_messages() {
        let err = valid().with_max_file_size(10).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Max file size must be between 1024 and 52428800, got 10"
        );
        assert_eq!(
            valid().with_max_files(0).validate(),
            Err(ConfigError::Zero("Max files"))
        );
    }

    #[test]
    fn test_projections() {
        let config = valid()
            .with_eval_timeout(Duration::from_secs(2))
            .with_max_file_size(2048)
            .with_node_bin("bun");

        let eval = config.evaluator_config();
        assert_eq!(eval.timeout, Duration::from_secs(2));
        assert_eq!(eval.max_file_size, 2048);
        assert_eq!(eval.node_bin, "bun");

        let relative = valid().with_output_dir("out");
        assert_eq!(relative.output_dir_for(Path::new("/repo")), PathBuf::from("/repo/out"));
        let absolute = valid().with_output_dir("/var/log/tokens");
        assert_eq!(
            absolute.output_dir_for(Path::new("/repo")),
            PathBuf::from("/var/log/tokens")
        );
    }

    #[test]
    fn test_display_lists_limits() {
        let display = valid().to_string();
        assert!(display.starts_with("tokenscout limits:"));
        assert!(display.contains("depth 6, 2000 files"));
    }
}
