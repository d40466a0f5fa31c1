use super::{css_variables, custom_js, tailwind, theme, token_tree};
use crate::audit::{DetectionLogger, ExtractionEntry, IssueLevel, PHASE_EXTRACTION};
use crate::config::TokenscoutConfig;
use crate::evaluator::{ConfigEvaluator, EvalMethod};
use crate::fs::{relative_path, FileSystem, WalkLimits};
use crate::overrides::PathPattern;
use crate::tokens::{Ecosystem, PartialTokens, SourceSummary, TokenSource, TokenTree};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tokens pulled from one source, before merging
#[derive(Debug, Default)]
struct Extracted {
    tokens: PartialTokens,
    method: Option<EvalMethod>,
    issues: Vec<String>,
}

/// Everything one extraction task needs, owned so it can be spawned
#[derive(Clone)]
struct SourceJob {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    evaluator: Arc<ConfigEvaluator>,
    walk_limits: WalkLimits,
    max_file_size: u64,
}

/// Extracts and merges tokens from every accepted source.
///
/// Sources are processed in list order, each inside its own task. A source
/// that errors or panics contributes nothing; the failure is logged and
/// recorded in `meta.sources`.
pub struct UniversalTokenExtractor {
    job: SourceJob,
    logger: DetectionLogger,
}

impl UniversalTokenExtractor {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        config: &TokenscoutConfig,
        logger: DetectionLogger,
    ) -> Self {
        let root = root.into();
        let evaluator = ConfigEvaluator::new(config.evaluator_config(), &root);
        Self {
            job: SourceJob {
                root,
                fs,
                evaluator: Arc::new(evaluator),
                walk_limits: config.walk_limits(),
                max_file_size: config.max_file_size,
            },
            logger,
        }
    }

    pub fn with_evaluator(mut self, evaluator: ConfigEvaluator) -> Self {
        self.job.evaluator = Arc::new(evaluator);
        self
    }

    pub async fn extract_all(&self, sources: &[TokenSource]) -> TokenTree {
        let start = Instant::now();
        let mut tree = TokenTree::new();

        for source in sources {
            let summary = self.extract_into(&mut tree, source).await;
            tree.meta.sources.push(summary);
        }

        tree.meta.extracted_at = Utc::now();
        tree.meta.total_tokens = tree.total_tokens();

        let elapsed = start.elapsed();
        self.logger.log_performance(PHASE_EXTRACTION, elapsed);
        info!(
            sources = sources.len(),
            tokens = tree.meta.total_tokens,
            elapsed_ms = elapsed.as_millis() as u64,
            "Token extraction complete"
        );
        tree
    }

    async fn extract_into(&self, tree: &mut TokenTree, source: &TokenSource) -> SourceSummary {
        let started = Instant::now();
        let job = self.job.clone();
        let task_source = source.clone();
        let outcome = tokio::spawn(async move { job.run(&task_source).await }).await;

        let mut summary = SourceSummary {
            ecosystem: source.ecosystem,
            path: source.path.clone(),
            confidence: source.confidence,
            token_count: 0,
            error: None,
        };

        let extracted = match outcome {
            Ok(Ok(extracted)) => extracted,
            Ok(Err(e)) => {
                let message = format!("{:#}", e);
                self.record_failure(source, &message, started);
                summary.error = Some(message);
                return summary;
            }
            Err(e) => {
                let message = if e.is_panic() {
                    "extraction panicked".to_string()
                } else {
                    format!("extraction task failed: {}", e)
                };
                self.record_failure(source, &message, started);
                summary.error = Some(message);
                return summary;
            }
        };

        for issue in &extracted.issues {
            self.logger
                .log_issue(IssueLevel::Warning, issue.clone(), Some(source.path.as_path()));
        }

        let stats = tree.merge(source, extracted.tokens);
        debug!(
            ecosystem = %source.ecosystem,
            path = %source.path.display(),
            added = stats.added,
            collisions = stats.collisions,
            "Merged source tokens"
        );

        summary.token_count = stats.added;
        self.logger.log_extraction_result(ExtractionEntry::success(
            source,
            stats.added,
            extracted.method.map(|m| m.to_string()),
            started.elapsed(),
        ));
        summary
    }

    fn record_failure(&self, source: &TokenSource, message: &str, started: Instant) {
        warn!(
            ecosystem = %source.ecosystem,
            path = %source.path.display(),
            error = %message,
            "Token extraction failed"
        );
        self.logger
            .log_issue(IssueLevel::Error, message, Some(source.path.as_path()));
        self.logger.log_extraction_result(ExtractionEntry::failure(
            source,
            message,
            started.elapsed(),
        ));
    }
}

impl SourceJob {
    async fn run(&self, source: &TokenSource) -> Result<Extracted> {
        match source.ecosystem {
            Ecosystem::Tailwind => self.evaluated(source, tailwind::extract).await,
            Ecosystem::Mui => self.evaluated(source, theme::extract_mui).await,
            Ecosystem::Chakra => self.evaluated(source, theme::extract_chakra).await,
            Ecosystem::CustomJs => self.evaluated(source, custom_js::extract).await,
            Ecosystem::FigmaTokens => self.evaluated(source, token_tree::extract).await,
            Ecosystem::CssVariables => {
                let text = self.read_bounded(&source.path)?;
                Ok(Extracted {
                    tokens: css_variables::extract(&text),
                    ..Extracted::default()
                })
            }
            Ecosystem::StyleDictionary => self.style_dictionary(source).await,
        }
    }

    async fn evaluated(
        &self,
        source: &TokenSource,
        extract: fn(&Value) -> PartialTokens,
    ) -> Result<Extracted> {
        let evaluation = self
            .evaluator
            .evaluate(&source.path, source.ecosystem)
            .await?;
        Ok(Extracted {
            tokens: extract(&evaluation.value),
            method: Some(evaluation.method),
            issues: evaluation.issues,
        })
    }

    /// Token directories are read file by file; a config file naming
    /// `source` globs is resolved against its directory
    async fn style_dictionary(&self, source: &TokenSource) -> Result<Extracted> {
        if self.fs.is_dir(&source.path) {
            let files = self.json_files_in(&source.path)?;
            return Ok(self.read_token_files(&files));
        }

        let evaluation = self
            .evaluator
            .evaluate(&source.path, source.ecosystem)
            .await?;

        match source_globs(&evaluation.value) {
            Some(globs) if !token_tree::has_token_leaves(&evaluation.value) => {
                let base = source.path.parent().unwrap_or(&self.root);
                let files = self.resolve_globs(base, &globs)?;
                if files.is_empty() {
                    bail!("No token files match {}", globs.join(", "));
                }
                let mut extracted = self.read_token_files(&files);
                extracted.issues.extend(evaluation.issues);
                Ok(extracted)
            }
            _ => Ok(Extracted {
                tokens: token_tree::extract(&evaluation.value),
                method: Some(evaluation.method),
                issues: evaluation.issues,
            }),
        }
    }

    fn json_files_in(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let files = self
            .fs
            .walk_files(dir, &self.walk_limits)
            .with_context(|| format!("Failed to list {}", dir.display()))?;
        Ok(files
            .into_iter()
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect())
    }

    fn resolve_globs(&self, base: &Path, globs: &[String]) -> Result<Vec<PathBuf>> {
        let patterns: Vec<PathPattern> = globs.iter().map(|g| PathPattern::new(g)).collect();
        let files = self.json_files_in(base)?;
        Ok(files
            .into_iter()
            .filter(|file| {
                let rel = relative_path(base, file);
                patterns.iter().any(|p| p.matches(&rel))
            })
            .collect())
    }

    /// Unreadable or malformed files are reported as issues and skipped
    fn read_token_files(&self, files: &[PathBuf]) -> Extracted {
        let mut extracted = Extracted {
            method: Some(EvalMethod::Declarative),
            ..Extracted::default()
        };

        for file in files {
            let parsed = self.read_bounded(file).and_then(|text| {
                serde_json::from_str::<Value>(&text)
                    .with_context(|| format!("Invalid JSON in {}", file.display()))
            });
            match parsed {
                Ok(doc) => extracted.tokens.extend(token_tree::extract(&doc)),
                Err(e) => extracted.issues.push(format!("Skipped token file: {:#}", e)),
            }
        }
        extracted
    }

    fn read_bounded(&self, path: &Path) -> Result<String> {
        let meta = self.fs.metadata(path)?;
        if meta.len() > self.max_file_size {
            bail!(
                "{} is {} bytes, over the {} byte limit",
                path.display(),
                meta.len(),
                self.max_file_size
            );
        }
        self.fs.read_to_string(path)
    }
}

/// The `source` entry of a token-dictionary config, as a list of globs
fn source_globs(config: &Value) -> Option<Vec<String>> {
    match config.get("source")? {
        Value::String(glob) => Some(vec![glob.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}
