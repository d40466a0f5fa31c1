// Audit trail of detection and extraction decisions
use super::summary::{summarize, LogSummary};
use crate::overrides::AppliedOverride;
use crate::tokens::{Ecosystem, TokenSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const LOG_FILE_NAME: &str = "token-detection-log.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Warning,
    Error,
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueLevel::Warning => write!(f, "warning"),
            IssueLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSourceEntry {
    #[serde(rename = "type")]
    pub ecosystem: Ecosystem,
    pub path: PathBuf,
    pub confidence: f64,
    pub description: String,
    pub manual: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_type: Option<Ecosystem>,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of extracting one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionEntry {
    #[serde(rename = "type")]
    pub ecosystem: Ecosystem,
    pub path: PathBuf,
    pub success: bool,
    pub token_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl ExtractionEntry {
    pub fn success(source: &TokenSource, token_count: usize, method: Option<String>, elapsed: Duration) -> Self {
        Self {
            ecosystem: source.ecosystem,
            path: source.path.clone(),
            success: true,
            token_count,
            method,
            error: None,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn failure(source: &TokenSource, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            ecosystem: source.ecosystem,
            path: source.path.clone(),
            success: false,
            token_count: 0,
            method: None,
            error: Some(error.into()),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTiming {
    pub phase: String,
    pub elapsed_ms: u64,
}

/// Candidate counts around override application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionCounts {
    pub before_overrides: usize,
    pub after_overrides: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub level: IssueLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
}

/// Everything recorded during one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionLog {
    pub run_id: String,
    pub project_root: PathBuf,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub detected_sources: Vec<DetectedSourceEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_counts: Option<DetectionCounts>,
    pub extraction_results: Vec<ExtractionEntry>,
    pub overrides: Vec<AppliedOverride>,
    pub performance: Vec<PhaseTiming>,
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<LogSummary>,
}

impl DetectionLog {
    fn new(project_root: PathBuf) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            project_root,
            started_at: Utc::now(),
            config_file: None,
            detected_sources: Vec::new(),
            detection_counts: None,
            extraction_results: Vec::new(),
            overrides: Vec::new(),
            performance: Vec::new(),
            issues: Vec::new(),
            summary: None,
        }
    }
}

/// Cheaply cloneable handle; all clones append to the same log
#[derive(Clone)]
pub struct DetectionLogger {
    log: Arc<Mutex<DetectionLog>>,
    output_dir: Option<PathBuf>,
}

impl DetectionLogger {
    pub fn new(project_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            log: Arc::new(Mutex::new(DetectionLog::new(project_root.into()))),
            output_dir: Some(output_dir.into()),
        }
    }

    /// Records everything but never writes a file
    pub fn disabled(project_root: impl Into<PathBuf>) -> Self {
        Self {
            log: Arc::new(Mutex::new(DetectionLog::new(project_root.into()))),
            output_dir: None,
        }
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.output_dir.as_ref().map(|d| d.join(LOG_FILE_NAME))
    }

    fn lock(&self) -> MutexGuard<'_, DetectionLog> {
        // A panic while holding the lock leaves the log usable
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_config_file(&self, path: Option<PathBuf>) {
        self.lock().config_file = path;
    }

    pub fn log_detected_source(&self, source: &TokenSource) {
        debug!(
            ecosystem = %source.ecosystem,
            path = %source.path.display(),
            confidence = source.confidence,
            "Detected token source"
        );
        self.lock().detected_sources.push(DetectedSourceEntry {
            ecosystem: source.ecosystem,
            path: source.path.clone(),
            confidence: source.confidence,
            description: source.description.clone(),
            manual: source.is_manual(),
            original_type: source.original_type(),
            timestamp: Utc::now(),
        });
    }

    pub fn log_extraction_result(&self, entry: ExtractionEntry) {
        debug!(
            ecosystem = %entry.ecosystem,
            path = %entry.path.display(),
            success = entry.success,
            tokens = entry.token_count,
            elapsed_ms = entry.elapsed_ms,
            "Extraction result"
        );
        self.lock().extraction_results.push(entry);
    }

    pub fn log_overrides(&self, applied: &[AppliedOverride]) {
        if applied.is_empty() {
            return;
        }
        self.lock().overrides.extend_from_slice(applied);
    }

    pub fn log_detection_counts(&self, before_overrides: usize, after_overrides: usize) {
        self.lock().detection_counts = Some(DetectionCounts {
            before_overrides,
            after_overrides,
        });
    }

    pub fn log_performance(&self, phase: &str, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        debug!(phase, elapsed_ms, "Phase timing");
        self.lock().performance.push(PhaseTiming {
            phase: phase.to_string(),
            elapsed_ms,
        });
    }

    pub fn log_issue(&self, level: IssueLevel, message: impl Into<String>, path: Option<&Path>) {
        let message = message.into();
        match level {
            IssueLevel::Warning => debug!(path = ?path, message = %message, "Detection issue"),
            IssueLevel::Error => warn!(path = ?path, message = %message, "Detection error"),
        }
        self.lock().issues.push(Issue {
            level,
            message,
            path: path.map(Path::to_path_buf),
            timestamp: Utc::now(),
        });
    }

    pub fn summary(&self) -> LogSummary {
        summarize(&self.lock())
    }

    /// Copy of the log with the summary filled in
    pub fn snapshot(&self) -> DetectionLog {
        let mut log = self.lock().clone();
        log.summary = Some(summarize(&log));
        log
    }

    /// Writes `<output_dir>/token-detection-log.json`.
    ///
    /// Failures are recorded as an issue and reported with `warn!`; the
    /// caller only learns that nothing was written.
    pub fn write_log(&self) -> Option<PathBuf> {
        let path = self.log_path()?;

        match self.try_write(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Wrote detection log");
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write detection log");
                self.log_issue(
                    IssueLevel::Error,
                    format!("Failed to write detection log: {}", e),
                    Some(path.as_path()),
                );
                None
            }
        }
    }

    fn try_write(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    pub fn print_summary(&self) {
        print!("{}", self.render_summary());
    }

    pub fn render_summary(&self) -> String {
        let log = self.snapshot();
        let summary = log.summary.unwrap_or_default();
        let mut out = String::new();

        out.push_str("Token detection summary\n");
        out.push_str(&format!("  Project: {}\n", log.project_root.display()));
        if let Some(config) = &log.config_file {
            out.push_str(&format!("  Override config: {}\n", config.display()));
        }
        out.push_str(&format!(
            "  Sources: {} ({} high confidence)\n",
            summary.total_sources, summary.high_confidence_count
        ));
        for (tag, count) in &summary.sources_by_type {
            out.push_str(&format!("    {:<18} {}\n", tag, count));
        }
        if !log.overrides.is_empty() {
            out.push_str(&format!("  Overrides applied: {}\n", log.overrides.len()));
        }
        out.push_str(&format!(
            "  Extraction success: {:.0}%\n",
            summary.extraction_success_rate * 100.0
        ));
        out.push_str(&format!("  Tokens: {}\n", summary.total_tokens));
        out.push_str(&format!(
            "  Time: {:.1}s\n",
            summary.total_time_ms as f64 / 1000.0
        ));
        if !log.issues.is_empty() {
            out.push_str(&format!("  Issues: {}\n", log.issues.len()));
        }
        if !summary.recommendations.is_empty() {
            out.push_str("  Recommendations:\n");
            for recommendation in &summary.recommendations {
                out.push_str(&format!("    - {}\n", recommendation));
            }
        }
        out
    }
}
