//! Audit trail for a detection run, persisted as `token-detection-log.json`

pub mod logger;
pub mod summary;

pub use logger::{
    DetectedSourceEntry, DetectionCounts, DetectionLog, DetectionLogger, ExtractionEntry, Issue,
    IssueLevel, PhaseTiming, LOG_FILE_NAME,
};
pub use summary::{summarize, LogSummary, PHASE_DETECTION, PHASE_EXTRACTION};
