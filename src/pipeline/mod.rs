//! End-to-end run: detect, apply overrides, extract, write the audit log

pub mod orchestrator;

pub use orchestrator::{PipelineOutput, TokenPipeline};
