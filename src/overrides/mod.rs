//! Operator overrides for token source detection
//!
//! An optional project config file (`tokenscout.config.json` and friends)
//! lets an operator exclude, add, retype and re-weight sources. Rules are read
//! leniently: a malformed rule is skipped with a warning and never fails the
//! run.

pub mod config;
pub mod manager;
pub mod pattern;

pub use config::{
    BoostRule, ExcludeRule, ForceTypeRule, IncludeRule, IncludeTarget, OverrideConfig,
    OverrideError, CONFIG_FILE_NAMES,
};
pub use manager::{AppliedOverride, OverrideKind, OverrideManager};
pub use pattern::PathPattern;
