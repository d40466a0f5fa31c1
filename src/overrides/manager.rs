use super::config::{IncludeRule, IncludeTarget, OverrideConfig, OverrideError};
use crate::fs::{relative_path, FileSystem, WalkLimits};
use crate::tokens::{
    clamp_confidence, rank_sources, TokenSource, MANUAL_SOURCE, METADATA_ORIGINAL_TYPE,
    METADATA_SOURCE,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverrideKind {
    Exclude,
    Include,
    ForceType,
    BoostConfidence,
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverrideKind::Exclude => "exclude",
            OverrideKind::Include => "include",
            OverrideKind::ForceType => "forceType",
            OverrideKind::BoostConfidence => "boostConfidence",
        };
        f.write_str(s)
    }
}

/// One rule application, for the audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedOverride {
    pub kind: OverrideKind,
    pub path: PathBuf,
    pub reason: String,
}

/// Applies operator overrides to detected sources.
///
/// The order is fixed: exclude, include, forceType, boostConfidence. Manual
/// includes are added after exclusion and are never removed by it.
pub struct OverrideManager {
    fs: Arc<dyn FileSystem>,
    project_root: PathBuf,
    config: OverrideConfig,
    config_path: Option<PathBuf>,
    walk_limits: WalkLimits,
    applied: Mutex<Vec<AppliedOverride>>,
}

impl OverrideManager {
    pub fn new(fs: Arc<dyn FileSystem>, project_root: impl Into<PathBuf>, config: OverrideConfig) -> Self {
        Self {
            fs,
            project_root: project_root.into(),
            config,
            config_path: None,
            walk_limits: WalkLimits::default(),
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Loads the operator config for `project_root` (see [`OverrideConfig::load`])
    pub fn load(
        fs: Arc<dyn FileSystem>,
        project_root: impl Into<PathBuf>,
        explicit: Option<&Path>,
    ) -> Result<Self, OverrideError> {
        let project_root = project_root.into();
        let (config, config_path) = OverrideConfig::load(fs.as_ref(), &project_root, explicit)?;
        let mut manager = Self::new(fs, project_root, config);
        manager.config_path = config_path;
        Ok(manager)
    }

    pub fn with_walk_limits(mut self, limits: WalkLimits) -> Self {
        self.walk_limits = limits;
        self
    }

    pub fn config(&self) -> &OverrideConfig {
        &self.config
    }

    /// The config file the rules came from, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Rules applied by the most recent [`apply_overrides`](Self::apply_overrides) call
    pub fn applied_overrides(&self) -> Vec<AppliedOverride> {
        self.applied.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn apply_overrides(&self, sources: Vec<TokenSource>) -> Vec<TokenSource> {
        let (sources, applied) = self.apply(sources);
        if let Ok(mut slot) = self.applied.lock() {
            *slot = applied;
        }
        sources
    }

    /// Pure form of [`apply_overrides`](Self::apply_overrides), returning the
    /// applied rules alongside the result.
    pub fn apply(&self, sources: Vec<TokenSource>) -> (Vec<TokenSource>, Vec<AppliedOverride>) {
        let mut applied = Vec::new();
        if self.config.is_empty() {
            return (sources, applied);
        }

        let before = sources.len();
        let mut sources = self.exclude(sources, &mut applied);
        self.include(&mut sources, &mut applied);
        self.force_type(&mut sources, &mut applied);
        self.boost(&mut sources, &mut applied);
        rank_sources(&mut sources);

        info!(
            before,
            after = sources.len(),
            rules_applied = applied.len(),
            "Applied overrides"
        );
        (sources, applied)
    }

    fn relative(&self, path: &Path) -> String {
        relative_path(&self.project_root, path)
    }

    fn exclude(&self, sources: Vec<TokenSource>, applied: &mut Vec<AppliedOverride>) -> Vec<TokenSource> {
        sources
            .into_iter()
            .filter(|source| {
                let rel = self.relative(&source.path);
                let rule = self
                    .config
                    .exclude
                    .iter()
                    .find(|rule| rule.matches(source.ecosystem, &rel, source.confidence));

                match rule {
                    Some(rule) => {
                        debug!(path = %rel, ecosystem = %source.ecosystem, "Excluded by override");
                        applied.push(AppliedOverride {
                            kind: OverrideKind::Exclude,
                            path: source.path.clone(),
                            reason: format!("Matched exclude rule ({})", rule.describe()),
                        });
                        false
                    }
                    None => true,
                }
            })
            .collect()
    }

    fn include(&self, sources: &mut Vec<TokenSource>, applied: &mut Vec<AppliedOverride>) {
        let mut walked: Option<Vec<PathBuf>> = None;
        let mut included: HashSet<PathBuf> = HashSet::new();

        for rule in &self.config.include {
            for path in self.resolve_include(rule, &mut walked) {
                if !included.insert(path.clone()) {
                    continue;
                }
                // A manual include replaces any detection of the same file
                sources.retain(|s| s.path != path);

                let description = rule
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Manually included {} source", rule.ecosystem));
                let source = TokenSource::new(rule.ecosystem, path.clone(), rule.confidence, description)
                    .with_metadata(METADATA_SOURCE, MANUAL_SOURCE);

                applied.push(AppliedOverride {
                    kind: OverrideKind::Include,
                    path: path.clone(),
                    reason: format!("Manual include as {}", rule.ecosystem),
                });
                sources.push(source);
            }
        }
    }

    fn resolve_include(&self, rule: &IncludeRule, walked: &mut Option<Vec<PathBuf>>) -> Vec<PathBuf> {
        match &rule.target {
            IncludeTarget::Path(raw) => {
                let candidate = Path::new(raw);
                let path = if candidate.is_absolute() {
                    candidate.to_path_buf()
                } else {
                    self.project_root.join(candidate)
                };
                if self.fs.exists(&path) {
                    vec![path]
                } else {
                    debug!(path = %path.display(), "Include path does not exist, skipping");
                    Vec::new()
                }
            }
            IncludeTarget::Glob(pattern) => {
                if walked.is_none() {
                    let files = match self.fs.walk_files(&self.project_root, &self.walk_limits) {
                        Ok(files) => files,
                        Err(e) => {
                            warn!(error = %e, "Failed to walk project for include globs");
                            Vec::new()
                        }
                    };
                    *walked = Some(files);
                }
                walked
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .filter(|p| pattern.matches(&self.relative(p)))
                    .cloned()
                    .collect()
            }
        }
    }

    fn force_type(&self, sources: &mut [TokenSource], applied: &mut Vec<AppliedOverride>) {
        for source in sources.iter_mut() {
            let rel = self.relative(&source.path);
            let Some(rule) = self.config.force_type.iter().find(|r| r.pattern.matches(&rel)) else {
                continue;
            };
            if rule.ecosystem == source.ecosystem {
                continue;
            }

            let original = source.ecosystem;
            if !source.metadata.contains_key(METADATA_ORIGINAL_TYPE) {
                source
                    .metadata
                    .insert(METADATA_ORIGINAL_TYPE.to_string(), original.tag().into());
            }
            source.ecosystem = rule.ecosystem;
            applied.push(AppliedOverride {
                kind: OverrideKind::ForceType,
                path: source.path.clone(),
                reason: format!("Type forced from {} to {}", original, rule.ecosystem),
            });
        }
    }

    fn boost(&self, sources: &mut [TokenSource], applied: &mut Vec<AppliedOverride>) {
        for source in sources.iter_mut() {
            let rel = self.relative(&source.path);
            for rule in self.config.boost_confidence.iter().filter(|r| r.pattern.matches(&rel)) {
                let before = source.confidence;
                source.confidence = clamp_confidence(before + rule.delta);
                applied.push(AppliedOverride {
                    kind: OverrideKind::BoostConfidence,
                    path: source.path.clone(),
                    reason: format!(
                        "Confidence {:.2} -> {:.2} ({:+})",
                        before, source.confidence, rule.delta
                    ),
                });
            }
        }
    }
}
