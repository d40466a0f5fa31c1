use crate::audit::{DetectionLogger, LogSummary};
use crate::config::TokenscoutConfig;
use crate::detection::TokenDetector;
use crate::evaluator::ConfigEvaluator;
use crate::extractors::UniversalTokenExtractor;
use crate::fs::{FileSystem, RealFileSystem};
use crate::tokens::{TokenSource, TokenTree};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Result of one full detection and extraction run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub sources: Vec<TokenSource>,
    pub tokens: TokenTree,
    pub summary: LogSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

/// Runs detection, overrides and extraction once for a project
pub struct TokenPipeline {
    root: PathBuf,
    config: TokenscoutConfig,
    fs: Arc<dyn FileSystem>,
    logger: DetectionLogger,
    override_file: Option<PathBuf>,
    evaluator: Option<ConfigEvaluator>,
    write_log: bool,
}

impl TokenPipeline {
    pub fn new(root: impl Into<PathBuf>, config: TokenscoutConfig) -> Self {
        let root = root.into();
        let logger = DetectionLogger::new(&root, config.output_dir_for(&root));
        Self {
            root,
            config,
            fs: Arc::new(RealFileSystem),
            logger,
            override_file: None,
            evaluator: None,
            write_log: true,
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_override_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_file = Some(path.into());
        self
    }

    pub fn with_evaluator(mut self, evaluator: ConfigEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Keeps the audit trail in memory only
    pub fn without_log_file(mut self) -> Self {
        self.write_log = false;
        self.logger = DetectionLogger::disabled(&self.root);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logger(&self) -> &DetectionLogger {
        &self.logger
    }

    fn detector(&self) -> TokenDetector {
        let detector = TokenDetector::new(
            self.fs.clone(),
            self.root.clone(),
            &self.config,
            self.logger.clone(),
        );
        match &self.override_file {
            Some(path) => detector.with_override_file(path.clone()),
            None => detector,
        }
    }

    /// Detection and overrides only
    pub async fn detect(&self) -> Vec<TokenSource> {
        self.detector().detect_all().await
    }

    pub async fn run(self) -> PipelineOutput {
        let start = Instant::now();
        info!(root = %self.root.display(), "Starting token pipeline");

        let sources = self.detector().detect_all().await;

        let mut extractor = UniversalTokenExtractor::new(
            self.fs.clone(),
            self.root.clone(),
            &self.config,
            self.logger.clone(),
        );
        if let Some(evaluator) = self.evaluator {
            extractor = extractor.with_evaluator(evaluator);
        }
        let tokens = extractor.extract_all(&sources).await;

        let log_path = if self.write_log {
            self.logger.write_log()
        } else {
            None
        };
        let summary = self.logger.summary();

        info!(
            sources = sources.len(),
            tokens = tokens.meta.total_tokens,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Token pipeline complete"
        );

        PipelineOutput {
            sources,
            tokens,
            summary,
            log_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{EvaluatorConfig, MockRuntime};
    use std::fs;
    use tempfile::TempDir;

    fn offline_evaluator(root: &Path) -> ConfigEvaluator {
        ConfigEvaluator::new(EvaluatorConfig::default(), root)
            .with_runtime(Arc::new(MockRuntime::new()))
            .with_transpiler(None)
    }

    #[tokio::test]
    async fn test_run_writes_log() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("vars.css"),
            ":root { --color-a: #000; --color-b: #111; --space-1: 4px; --space-2: 8px; \
             --font-body: serif; --radius: 2px; }",
        )
        .unwrap();
        let config = TokenscoutConfig::default().with_output_dir(temp.path().join("out"));

        let output = TokenPipeline::new(temp.path(), config)
            .with_evaluator(offline_evaluator(temp.path()))
            .run()
            .await;

        assert_eq!(output.sources.len(), 1);
        assert_eq!(output.tokens.meta.total_tokens, 6);
        assert_eq!(output.summary.total_tokens, 6);
        let log_path = output.log_path.unwrap();
        assert!(log_path.starts_with(temp.path().join("out")));
        assert!(log_path.exists());
    }

    #[tokio::test]
    async fn test_without_log_file() {
        let temp = TempDir::new().unwrap();
        let output = TokenPipeline::new(temp.path(), TokenscoutConfig::default())
            .without_log_file()
            .run()
            .await;

        assert!(output.sources.is_empty());
        assert!(output.tokens.is_empty());
        assert!(output.log_path.is_none());
        assert!(!temp.path().join(".tokenscout").exists());
        assert_eq!(output.summary.recommendations.len(), 1);
    }
}
