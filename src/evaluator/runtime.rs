//! Out-of-process module execution
//!
//! Each evaluation starts a fresh runtime process, so nothing is cached
//! between calls and a runaway module can be killed by dropping the child.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// What a module evaluated to
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleOutput {
    /// The exported value (after invoking a factory export)
    Value(Value),
    /// The export was a function and calling it threw
    FactoryFailed { error: String, source: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    #[error("Runtime '{0}' is not available")]
    Unavailable(String),

    #[error("Module evaluation failed: {0}")]
    Failed(String),

    #[error("Runtime produced unreadable output: {0}")]
    InvalidOutput(String),
}

#[async_trait]
pub trait ModuleRuntime: Send + Sync {
    fn name(&self) -> &str;

    /// Loads the module at `path` and returns its default export.
    ///
    /// Callers bound this with a timeout; implementations must release any
    /// external resources when the returned future is dropped.
    async fn evaluate(&self, path: &Path) -> Result<ModuleOutput, RuntimeError>;
}

/// Loader run with `node -e`; the module path is argv[1].
///
/// Functions and symbols are dropped by JSON serialization, bigints become
/// strings, and circular structures fail the load.
const NODE_LOADER: &str = r#"
const { pathToFileURL } = require('url');
const target = process.argv[1];
const emit = (payload) => process.stdout.write(JSON.stringify(payload, (_k, v) => typeof v === 'bigint' ? v.toString() : v));
const message = (err) => String((err && err.message) || err);
(async () => {
  let mod;
  try {
    mod = require(target);
  } catch (err) {
    if (err && (err.code === 'ERR_REQUIRE_ESM' || (err instanceof SyntaxError && /import|export/.test(message(err))))) {
      mod = await import(pathToFileURL(target).href);
    } else {
      throw err;
    }
  }
  let exported = mod;
  if (mod && typeof mod === 'object' && 'default' in mod && (mod.__esModule || Object.keys(mod).length === 1 || Symbol.toStringTag in mod)) {
    exported = mod.default;
  }
  if (typeof exported === 'function') {
    const factory = exported;
    try {
      exported = await factory();
    } catch (err) {
      emit({ ok: false, kind: 'factory', error: message(err), source: factory.toString() });
      return;
    }
  }
  emit({ ok: true, value: exported === undefined ? null : exported });
})().catch((err) => emit({ ok: false, kind: 'load', error: message(err) }));
"#;

#[derive(Debug, Deserialize)]
struct LoaderReport {
    ok: bool,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// Evaluates modules with a Node.js-compatible executable
pub struct NodeRuntime {
    node_bin: String,
}

impl NodeRuntime {
    pub fn new(node_bin: impl Into<String>) -> Self {
        Self {
            node_bin: node_bin.into(),
        }
    }

    fn parse_report(stdout: &[u8]) -> Result<ModuleOutput, RuntimeError> {
        let text = String::from_utf8_lossy(stdout);
        let report: LoaderReport = serde_json::from_str(text.trim())
            .map_err(|e| RuntimeError::InvalidOutput(e.to_string()))?;

        if report.ok {
            return Ok(ModuleOutput::Value(report.value));
        }

        let error = report.error.unwrap_or_else(|| "unknown error".to_string());
        match (report.kind.as_deref(), report.source) {
            (Some("factory"), Some(source)) => Ok(ModuleOutput::FactoryFailed { error, source }),
            _ => Err(RuntimeError::Failed(error)),
        }
    }
}

#[async_trait]
impl ModuleRuntime for NodeRuntime {
    fn name(&self) -> &str {
        &self.node_bin
    }

    async fn evaluate(&self, path: &Path) -> Result<ModuleOutput, RuntimeError> {
        let mut command = Command::new(&self.node_bin);
        command
            .arg("-e")
            .arg(NODE_LOADER)
            .arg(path)
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            command.current_dir(parent);
        }
        // Keep PATH so `#!/usr/bin/env node` style wrappers resolve
        if let Some(path_var) = std::env::var_os("PATH") {
            command.env("PATH", path_var);
        }
        command.env("NODE_ENV", "production");

        let output = command.output().await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                RuntimeError::Unavailable(self.node_bin.clone())
            } else {
                RuntimeError::Failed(format!("failed to spawn {}: {}", self.node_bin, e))
            }
        })?;

        debug!(
            path = %path.display(),
            status = ?output.status.code(),
            stdout_bytes = output.stdout.len(),
            "Runtime process finished"
        );

        if output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first_line = stderr
                .lines()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("no output");
            return Err(RuntimeError::Failed(first_line.trim().to_string()));
        }

        Self::parse_report(&output.stdout)
    }
}

/// Canned runtime for tests, answering from a queue
pub struct MockRuntime {
    responses: Mutex<VecDeque<Result<ModuleOutput, RuntimeError>>>,
    delay: Option<Duration>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            delay: None,
        }
    }

    /// Every evaluation sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn add_response(&self, response: Result<ModuleOutput, RuntimeError>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModuleRuntime for MockRuntime {
    fn name(&self) -> &str {
        "mock"
    }

    async fn evaluate(&self, _path: &Path) -> Result<ModuleOutput, RuntimeError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| Err(RuntimeError::Unavailable("mock".to_string())))
    }
}

/// Whether `node_bin` can be spawned at all
pub async fn runtime_available(node_bin: &str) -> bool {
    Command::new(node_bin)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
