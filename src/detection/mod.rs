//! Token source detection
//!
//! [`TokenDetector`] walks the project once, fans the file list out to the
//! per-ecosystem heuristics in [`heuristics`], ranks what they propose and
//! hands the result to the operator overrides.

pub mod context;
pub mod detector;
pub mod heuristics;

pub use context::DetectionContext;
pub use detector::TokenDetector;
pub use heuristics::{HeuristicRegistry, SourceHeuristic};
