//! Core token data model: ecosystems, detected sources and the canonical tree

pub mod ecosystem;
pub mod source;
pub mod tag_enum_macro;
pub mod tree;

pub use ecosystem::Ecosystem;
pub use source::{
    clamp_confidence, rank_sources, TokenSource, HIGH_CONFIDENCE, LOW_CONFIDENCE, MANUAL_SOURCE,
    METADATA_ORIGINAL_TYPE, METADATA_SOURCE,
};
pub use tree::{
    prefixed_key, CanonicalToken, ExtractionMeta, MergeStats, PartialTokens, SourceSummary,
    TokenBucket, TokenCategory, TokenEntry, TokenTree, TokenValue,
};
