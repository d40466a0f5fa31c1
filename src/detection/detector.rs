use super::context::DetectionContext;
use super::heuristics::{HeuristicRegistry, SourceHeuristic};
use crate::audit::{DetectionLogger, IssueLevel, PHASE_DETECTION};
use crate::config::TokenscoutConfig;
use crate::fs::{FileSystem, WalkLimits};
use crate::overrides::{OverrideConfig, OverrideManager};
use crate::tokens::{rank_sources, TokenSource};
use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Finds candidate token sources in a project.
///
/// One project walk feeds every registered heuristic. Heuristics run
/// concurrently on the blocking pool; a failing or panicking heuristic is
/// recorded as an issue and contributes nothing. The ranked result then goes
/// through the operator overrides.
pub struct TokenDetector {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    registry: Arc<HeuristicRegistry>,
    override_file: Option<PathBuf>,
    overrides: Option<OverrideManager>,
    logger: DetectionLogger,
    walk_limits: WalkLimits,
    max_file_size: u64,
}

impl TokenDetector {
    /// Builds a detector with the default heuristics. Overrides come from
    /// the discovered config file unless one is set explicitly.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        config: &TokenscoutConfig,
        logger: DetectionLogger,
    ) -> Self {
        Self {
            root: root.into(),
            fs,
            registry: Arc::new(HeuristicRegistry::with_defaults()),
            override_file: None,
            overrides: None,
            logger,
            walk_limits: config.walk_limits(),
            max_file_size: config.max_file_size,
        }
    }

    /// Reads overrides from `path` instead of the discovered config file
    pub fn with_override_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_file = Some(path.into());
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideManager) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_registry(mut self, registry: HeuristicRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logger(&self) -> &DetectionLogger {
        &self.logger
    }

    /// Runs every heuristic, ranks the candidates and applies overrides
    pub async fn detect_all(&self) -> Vec<TokenSource> {
        let start = Instant::now();

        let files = self.walk().await;
        debug!(root = %self.root.display(), files = files.len(), "Project walk complete");

        let ctx = Arc::new(DetectionContext::new(
            self.root.clone(),
            self.fs.clone(),
            files,
            self.max_file_size,
        ));

        let mut candidates = self.run_heuristics(ctx).await;
        rank_sources(&mut candidates);
        let detected = candidates.len();

        let loaded;
        let overrides = match &self.overrides {
            Some(manager) => {
                self.logger
                    .set_config_file(manager.config_path().map(Path::to_path_buf));
                manager
            }
            None => {
                loaded = self.load_overrides();
                &loaded
            }
        };
        let sources = overrides.apply_overrides(candidates);
        let applied = overrides.applied_overrides();

        for source in &sources {
            self.logger.log_detected_source(source);
        }
        self.logger.log_overrides(&applied);
        self.logger.log_detection_counts(detected, sources.len());

        let elapsed = start.elapsed();
        self.logger.log_performance(PHASE_DETECTION, elapsed);

        info!(
            root = %self.root.display(),
            detected,
            accepted = sources.len(),
            overrides = applied.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Token source detection complete"
        );

        sources
    }

    /// An unreadable config degrades to no overrides plus a logged issue
    fn load_overrides(&self) -> OverrideManager {
        let explicit = self.override_file.as_deref();
        match OverrideManager::load(self.fs.clone(), &self.root, explicit) {
            Ok(manager) => {
                self.logger
                    .set_config_file(manager.config_path().map(Path::to_path_buf));
                manager.with_walk_limits(self.walk_limits.clone())
            }
            Err(e) => {
                warn!(error = %e, "Ignoring override config");
                self.logger.log_issue(
                    IssueLevel::Error,
                    format!("Override config ignored: {}", e),
                    explicit,
                );
                OverrideManager::new(self.fs.clone(), &self.root, OverrideConfig::default())
            }
        }
    }

    async fn walk(&self) -> Vec<PathBuf> {
        let fs = self.fs.clone();
        let root = self.root.clone();
        let limits = self.walk_limits.clone();

        let result = tokio::task::spawn_blocking(move || fs.walk_files(&root, &limits)).await;
        match result {
            Ok(Ok(files)) => files,
            Ok(Err(e)) => {
                self.logger.log_issue(
                    IssueLevel::Error,
                    format!("Project walk failed: {:#}", e),
                    Some(self.root.as_path()),
                );
                Vec::new()
            }
            Err(e) => {
                self.logger.log_issue(
                    IssueLevel::Error,
                    format!("Project walk aborted: {}", e),
                    Some(self.root.as_path()),
                );
                Vec::new()
            }
        }
    }

    async fn run_heuristics(&self, ctx: Arc<DetectionContext>) -> Vec<TokenSource> {
        let tasks = self.registry.heuristics().iter().map(|heuristic| {
            let heuristic: Arc<dyn SourceHeuristic> = heuristic.clone();
            let ctx = ctx.clone();
            let ecosystem = heuristic.ecosystem();
            let handle = tokio::task::spawn_blocking(move || heuristic.detect(&ctx));
            async move { (ecosystem, handle.await) }
        });

        let mut sources = Vec::new();
        for (ecosystem, outcome) in join_all(tasks).await {
            match outcome {
                Ok(Ok(found)) => {
                    debug!(ecosystem = %ecosystem, count = found.len(), "Heuristic finished");
                    sources.extend(found);
                }
                Ok(Err(e)) => {
                    warn!(ecosystem = %ecosystem, error = %e, "Heuristic failed");
                    self.logger.log_issue(
                        IssueLevel::Warning,
                        format!("{} heuristic failed: {:#}", ecosystem, e),
                        None,
                    );
                }
                Err(e) => {
                    warn!(ecosystem = %ecosystem, error = %e, "Heuristic panicked");
                    self.logger.log_issue(
                        IssueLevel::Error,
                        format!("{} heuristic panicked: {}", ecosystem, e),
                        None,
                    );
                }
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::tokens::Ecosystem;
    use anyhow::anyhow;

    fn detector(fs: MockFileSystem) -> TokenDetector {
        let logger = DetectionLogger::disabled("/repo");
        TokenDetector::new(Arc::new(fs), "/repo", &TokenscoutConfig::default(), logger)
    }

    fn fixture() -> MockFileSystem {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        fs.add_file("package.json", r#"{"dependencies": {"@mui/material": "^5"}}"#);
        fs.add_file("tailwind.config.js", "module.exports = { theme: {} }");
        fs.add_file("src/theme.ts", "export default createTheme({})");
        fs.add_file(
            "src/styles/vars.css",
            ":root { --a: 1; --b: 2; --c: 3; --d: 4; --e: 5; --f: 6; }",
        );
        fs
    }

    struct Failing;

    impl SourceHeuristic for Failing {
        fn ecosystem(&self) -> Ecosystem {
            Ecosystem::CustomJs
        }

        fn detect(&self, _ctx: &DetectionContext) -> anyhow::Result<Vec<TokenSource>> {
            Err(anyhow!("boom"))
        }
    }

    struct Panicking;

    impl SourceHeuristic for Panicking {
        fn ecosystem(&self) -> Ecosystem {
            Ecosystem::FigmaTokens
        }

        fn detect(&self, _ctx: &DetectionContext) -> anyhow::Result<Vec<TokenSource>> {
            panic!("heuristic bug")
        }
    }

    #[tokio::test]
    async fn test_detect_all_ranks_sources() {
        let detector = detector(fixture());
        let sources = detector.detect_all().await;

        let tags: Vec<_> = sources.iter().map(|s| s.ecosystem).collect();
        assert_eq!(
            tags,
            vec![Ecosystem::Tailwind, Ecosystem::Mui, Ecosystem::CssVariables]
        );
        assert!(sources.iter().all(|s| (0.0..=1.0).contains(&s.confidence)));

        let log = detector.logger().snapshot();
        assert_eq!(log.detected_sources.len(), 3);
        assert_eq!(log.performance[0].phase, PHASE_DETECTION);
    }

    #[tokio::test]
    async fn test_failing_heuristics_are_isolated() {
        let fs = fixture();
        let mut registry = HeuristicRegistry::new();
        registry.register(Arc::new(Failing));
        registry.register(Arc::new(Panicking));
        registry.register(Arc::new(crate::detection::heuristics::TailwindHeuristic));

        let detector = detector(fs).with_registry(registry);
        let sources = detector.detect_all().await;

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].ecosystem, Ecosystem::Tailwind);
        assert_eq!(detector.logger().snapshot().issues.len(), 2);
    }

    #[tokio::test]
    async fn test_discovered_overrides_are_applied() {
        let fs = fixture();
        fs.add_file(
            "tokenscout.config.json",
            r#"{"tokens": {"exclude": [{"type": "css-variables"}]}}"#,
        );
        let detector = detector(fs);
        let sources = detector.detect_all().await;

        assert!(sources.iter().all(|s| s.ecosystem != Ecosystem::CssVariables));
        let log = detector.logger().snapshot();
        assert_eq!(log.overrides.len(), 1);
        let counts = log.detection_counts.unwrap();
        assert_eq!(counts.after_overrides, sources.len());
        assert_eq!(counts.before_overrides, sources.len() + 1);
        assert_eq!(
            log.config_file,
            Some(PathBuf::from("/repo/tokenscout.config.json"))
        );
    }

    #[tokio::test]
    async fn test_broken_override_config_degrades_to_noop() {
        let fs = fixture();
        fs.add_file("tokenscout.config.json", "{ not json");
        let detector = detector(fs);
        let sources = detector.detect_all().await;

        assert_eq!(sources.len(), 3);
        let log = detector.logger().snapshot();
        assert_eq!(log.issues.len(), 1);
        assert!(log.issues[0].message.starts_with("Override config ignored"));
    }

    #[tokio::test]
    async fn test_empty_project() {
        let detector = detector(MockFileSystem::with_root(PathBuf::from("/repo")));
        assert!(detector.detect_all().await.is_empty());
    }
}
