use super::logger::DetectionLog;
use crate::tokens::{HIGH_CONFIDENCE, LOW_CONFIDENCE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Combined detection and extraction time above which a run is called slow
pub const SLOW_RUN: Duration = Duration::from_secs(10);
/// More distinct ecosystems than this suggests conflicting definitions
pub const MAX_ECOSYSTEMS: usize = 2;

pub const PHASE_DETECTION: &str = "detection";
pub const PHASE_EXTRACTION: &str = "extraction";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub total_sources: usize,
    pub sources_by_type: BTreeMap<String, usize>,
    pub high_confidence_count: usize,
    pub extraction_success_rate: f64,
    pub total_tokens: usize,
    pub total_time_ms: u64,
    pub recommendations: Vec<String>,
}

pub fn summarize(log: &DetectionLog) -> LogSummary {
    let mut sources_by_type: BTreeMap<String, usize> = BTreeMap::new();
    for source in &log.detected_sources {
        *sources_by_type.entry(source.ecosystem.tag().to_string()).or_default() += 1;
    }

    let high_confidence_count = log
        .detected_sources
        .iter()
        .filter(|s| s.confidence >= HIGH_CONFIDENCE)
        .count();

    let attempted = log.extraction_results.len();
    let succeeded = log.extraction_results.iter().filter(|r| r.success).count();
    let extraction_success_rate = if attempted == 0 {
        0.0
    } else {
        succeeded as f64 / attempted as f64
    };

    let total_tokens = log.extraction_results.iter().map(|r| r.token_count).sum();

    let total_time_ms = log
        .performance
        .iter()
        .filter(|p| p.phase == PHASE_DETECTION || p.phase == PHASE_EXTRACTION)
        .map(|p| p.elapsed_ms)
        .sum();

    let mut summary = LogSummary {
        total_sources: log.detected_sources.len(),
        sources_by_type,
        high_confidence_count,
        extraction_success_rate,
        total_tokens,
        total_time_ms,
        recommendations: Vec::new(),
    };
    summary.recommendations = recommendations(log, &summary);
    summary
}

fn recommendations(log: &DetectionLog, summary: &LogSummary) -> Vec<String> {
    let mut out = Vec::new();

    if summary.total_sources == 0 {
        out.push(
            "No token sources detected. Add a tokenscout.config.json with `include` rules \
             pointing at your token files, or check that they are not ignored by .gitignore."
                .to_string(),
        );
    }

    let low = log
        .detected_sources
        .iter()
        .filter(|s| s.confidence < LOW_CONFIDENCE)
        .count();
    if low > 0 {
        out.push(format!(
            "{} source(s) detected with confidence below {}. Review them and use \
             `exclude` or `boostConfidence` overrides to improve accuracy.",
            low, LOW_CONFIDENCE
        ));
    }

    if summary.sources_by_type.len() > MAX_ECOSYSTEMS {
        let tags: Vec<&str> = summary.sources_by_type.keys().map(String::as_str).collect();
        out.push(format!(
            "Tokens come from {} different ecosystems ({}). Check for conflicting \
             definitions and exclude sources you do not use.",
            tags.len(),
            tags.join(", ")
        ));
    }

    let total = Duration::from_millis(summary.total_time_ms);
    if total > SLOW_RUN {
        out.push(format!(
            "Detection and extraction took {:.1}s. Exclude large directories or lower \
             TOKENSCOUT_MAX_FILES to speed up runs.",
            total.as_secs_f64()
        ));
    }

    out
}
