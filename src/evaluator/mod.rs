//! Safe evaluation of token configuration files
//!
//! [`ConfigEvaluator`] turns one configuration file into a plain JSON value.
//! Declarative formats are parsed directly. Executable modules run in a fresh
//! runtime process bounded by a timeout, and TypeScript is transpiled first.
//! Whenever execution is impossible or fails, a static pattern-based extractor
//! recovers what it can from the source text, so a broken module degrades to
//! a smaller result instead of an error.

pub mod literal;
pub mod runtime;
pub mod static_extract;
pub mod transpile;

pub use literal::{LiteralParser, ObjectLiteralParser};
pub use runtime::{ModuleOutput, ModuleRuntime, MockRuntime, NodeRuntime, RuntimeError};
pub use static_extract::StaticExtractor;
pub use transpile::{ScratchFile, Transpiler, TranspilerKind};

use crate::tokens::Ecosystem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
    pub timeout: Duration,
    pub max_file_size: u64,
    pub node_bin: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_file_size: 1_048_576,
            node_bin: "node".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File {} is {size} bytes, over the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl EvalError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            EvalError::NotFound(path.to_path_buf())
        } else {
            EvalError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    fn parse(path: &Path, message: impl fmt::Display) -> Self {
        EvalError::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// How the value of an [`Evaluation`] was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalMethod {
    Dynamic,
    Transpiled,
    Declarative,
    Static,
}

impl fmt::Display for EvalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvalMethod::Dynamic => "dynamic",
            EvalMethod::Transpiled => "transpiled",
            EvalMethod::Declarative => "declarative",
            EvalMethod::Static => "static",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub method: EvalMethod,
    /// Degradations encountered on the way (timeouts, runtime errors, ...)
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFormat {
    Json,
    Yaml,
    Toml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Executable,
    Typed,
    Declarative(DataFormat),
    Text,
}

impl FileKind {
    fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "js" | "cjs" | "mjs" => FileKind::Executable,
            "ts" | "mts" | "cts" | "tsx" | "jsx" => FileKind::Typed,
            "json" => FileKind::Declarative(DataFormat::Json),
            "yaml" | "yml" => FileKind::Declarative(DataFormat::Yaml),
            "toml" => FileKind::Declarative(DataFormat::Toml),
            _ => FileKind::Text,
        }
    }
}

pub struct ConfigEvaluator {
    config: EvaluatorConfig,
    runtime: Arc<dyn ModuleRuntime>,
    transpiler: Option<Transpiler>,
    static_extractor: StaticExtractor,
}

impl ConfigEvaluator {
    /// Creates an evaluator using the configured node binary; the transpiler
    /// is looked up relative to `project_root`.
    pub fn new(config: EvaluatorConfig, project_root: &Path) -> Self {
        let runtime = Arc::new(NodeRuntime::new(config.node_bin.clone()));
        let transpiler = Transpiler::discover(project_root);
        debug!(
            runtime = %config.node_bin,
            transpiler = ?transpiler.as_ref().map(|t| t.kind),
            "Config evaluator ready"
        );

        Self {
            config,
            runtime,
            transpiler,
            static_extractor: StaticExtractor::new(Arc::new(ObjectLiteralParser::new())),
        }
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn ModuleRuntime>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_transpiler(mut self, transpiler: Option<Transpiler>) -> Self {
        self.transpiler = transpiler;
        self
    }

    pub fn with_literal_parser(mut self, parser: Arc<dyn LiteralParser>) -> Self {
        self.static_extractor = StaticExtractor::new(parser);
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluates one configuration file.
    ///
    /// # Errors
    ///
    /// Only for a missing or unreadable file, a file over the size limit, or
    /// malformed declarative data. Execution failures of modules fall back to
    /// static extraction and are reported in [`Evaluation::issues`].
    pub async fn evaluate(&self, path: &Path, ecosystem: Ecosystem) -> Result<Evaluation, EvalError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| EvalError::io(path, e))?;
        if !meta.is_file() {
            return Err(EvalError::io(
                path,
                io::Error::new(io::ErrorKind::Other, "not a regular file"),
            ));
        }
        if meta.len() > self.config.max_file_size {
            return Err(EvalError::TooLarge {
                path: path.to_path_buf(),
                size: meta.len(),
                limit: self.config.max_file_size,
            });
        }

        let evaluation = match FileKind::of(path) {
            FileKind::Declarative(format) => self.evaluate_declarative(path, format).await?,
            FileKind::Executable => {
                self.evaluate_module(path, path, ecosystem, Vec::new(), EvalMethod::Dynamic)
                    .await?
            }
            FileKind::Typed => self.evaluate_typed(path, ecosystem).await?,
            FileKind::Text => self.static_fallback(path, ecosystem, Vec::new()).await?,
        };

        info!(
            path = %path.display(),
            ecosystem = %ecosystem,
            method = %evaluation.method,
            issues = evaluation.issues.len(),
            "Evaluated configuration"
        );
        Ok(evaluation)
    }

    async fn evaluate_declarative(
        &self,
        path: &Path,
        format: DataFormat,
    ) -> Result<Evaluation, EvalError> {
        let text = read_source(path).await?;
        let value = match format {
            DataFormat::Json => {
                serde_json::from_str::<Value>(&text).map_err(|e| EvalError::parse(path, e))?
            }
            DataFormat::Yaml => {
                serde_yaml::from_str::<Value>(&text).map_err(|e| EvalError::parse(path, e))?
            }
            DataFormat::Toml => {
                let parsed = toml::from_str::<toml::Value>(&text)
                    .map_err(|e| EvalError::parse(path, e))?;
                serde_json::to_value(parsed).map_err(|e| EvalError::parse(path, e))?
            }
        };

        Ok(Evaluation {
            value,
            method: EvalMethod::Declarative,
            issues: Vec::new(),
        })
    }

    async fn evaluate_typed(&self, path: &Path, ecosystem: Ecosystem) -> Result<Evaluation, EvalError> {
        let Some(transpiler) = &self.transpiler else {
            let issues = vec!["No TypeScript transpiler available".to_string()];
            return self.static_fallback(path, ecosystem, issues).await;
        };

        let js = match timeout(self.config.timeout, transpiler.transpile(path)).await {
            Ok(Ok(js)) => js,
            Ok(Err(e)) => {
                let issues = vec![format!("Transpilation failed: {}", e)];
                return self.static_fallback(path, ecosystem, issues).await;
            }
            Err(_) => {
                let issues = vec![format!(
                    "Transpilation timed out after {}ms",
                    self.config.timeout.as_millis()
                )];
                return self.static_fallback(path, ecosystem, issues).await;
            }
        };

        let scratch = match ScratchFile::create(path, &js) {
            Ok(scratch) => scratch,
            Err(e) => {
                let issues = vec![format!("Could not write transpiled module: {}", e)];
                return self.static_fallback(path, ecosystem, issues).await;
            }
        };

        self.evaluate_module(
            scratch.path(),
            path,
            ecosystem,
            Vec::new(),
            EvalMethod::Transpiled,
        )
        .await
    }

    /// Runs `exec_path` in the runtime; fallbacks read `original`
    async fn evaluate_module(
        &self,
        exec_path: &Path,
        original: &Path,
        ecosystem: Ecosystem,
        mut issues: Vec<String>,
        method: EvalMethod,
    ) -> Result<Evaluation, EvalError> {
        let outcome = timeout(self.config.timeout, self.runtime.evaluate(exec_path)).await;

        let issue = match outcome {
            Ok(Ok(ModuleOutput::Value(value))) if value.is_object() => {
                return Ok(Evaluation {
                    value,
                    method,
                    issues,
                });
            }
            Ok(Ok(ModuleOutput::Value(other))) => {
                format!("Module export is not an object (got {})", json_kind(&other))
            }
            Ok(Ok(ModuleOutput::FactoryFailed { error, source })) => {
                issues.push(format!("Factory export threw: {}", error));
                if let Some(value) = self.static_extractor.extract_return_block(&source) {
                    return Ok(Evaluation {
                        value,
                        method: EvalMethod::Static,
                        issues,
                    });
                }
                "Factory return value could not be recovered statically".to_string()
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "Evaluation timed out after {}ms",
                self.config.timeout.as_millis()
            ),
        };

        debug!(
            path = %original.display(),
            runtime = self.runtime.name(),
            issue = %issue,
            "Dynamic evaluation failed, using static extraction"
        );
        issues.push(issue);
        self.static_fallback(original, ecosystem, issues).await
    }

    async fn static_fallback(
        &self,
        path: &Path,
        ecosystem: Ecosystem,
        issues: Vec<String>,
    ) -> Result<Evaluation, EvalError> {
        let source = read_source(path).await?;
        Ok(Evaluation {
            value: self.static_extractor.extract(&source, ecosystem),
            method: EvalMethod::Static,
            issues,
        })
    }
}

async fn read_source(path: &Path) -> Result<String, EvalError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| EvalError::io(path, e))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
