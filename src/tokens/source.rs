use super::Ecosystem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Metadata key marking a source added by an operator include rule
pub const METADATA_SOURCE: &str = "source";
pub const MANUAL_SOURCE: &str = "manual";
/// Metadata key retaining the detected tag after a forceType override
pub const METADATA_ORIGINAL_TYPE: &str = "originalType";

/// A file or directory identified as likely containing design tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenSource {
    #[serde(rename = "type")]
    pub ecosystem: Ecosystem,
    /// Absolute path of the file or directory
    pub path: PathBuf,
    pub confidence: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl TokenSource {
    pub fn new(
        ecosystem: Ecosystem,
        path: impl Into<PathBuf>,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            ecosystem,
            path: path.into(),
            confidence: clamp_confidence(confidence),
            description: description.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn is_manual(&self) -> bool {
        self.metadata
            .get(METADATA_SOURCE)
            .and_then(Value::as_str)
            .map(|s| s == MANUAL_SOURCE)
            .unwrap_or(false)
    }

    pub fn original_type(&self) -> Option<Ecosystem> {
        self.metadata
            .get(METADATA_ORIGINAL_TYPE)
            .and_then(Value::as_str)
            .and_then(Ecosystem::from_tag)
    }
}

pub const HIGH_CONFIDENCE: f64 = 0.8;
pub const LOW_CONFIDENCE: f64 = 0.5;

/// Clamps into [0, 1]; NaN collapses to 0
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Orders by descending confidence, then tag, then path
pub fn rank_sources(sources: &mut [TokenSource]) {
    sources.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.ecosystem.tag().cmp(b.ecosystem.tag()))
            .then_with(|| a.path.cmp(&b.path))
    });
}
