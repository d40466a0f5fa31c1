//! tokenscout - design-token discovery and extraction for front-end projects
//!
//! This library finds where a project keeps its design tokens, evaluates those
//! sources and normalizes every token into a single tree. Operators can correct
//! any detection decision with an override file, and every run leaves an audit
//! log explaining what was found and why.
//!
//! # Core Concepts
//!
//! - **Token source**: a file or directory holding tokens for one ecosystem
//!   (utility-CSS config, component-library theme, CSS custom properties,
//!   token dictionary, design-tool export or a plain JS module)
//! - **Detection**: heuristics score candidate files; overrides then exclude,
//!   include, retype or boost them
//! - **Extraction**: each source is evaluated (statically where possible) and
//!   flattened into categories keyed by `<ecosystem>-<name>`
//!
//! # Example Usage
//!
//! ```no_run
//! use tokenscout::{TokenPipeline, TokenscoutConfig};
//!
//! # async fn run() {
//! let output = TokenPipeline::new("./my-app", TokenscoutConfig::default())
//!     .run()
//!     .await;
//!
//! for source in &output.sources {
//!     println!("{} {:.2}", source.path.display(), source.confidence);
//! }
//! println!("{} tokens", output.tokens.meta.total_tokens);
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`detection`]: candidate discovery and scoring
//! - [`overrides`]: operator corrections to detection
//! - [`evaluator`]: safe loading of configuration modules
//! - [`extractors`]: per-ecosystem normalization and merging
//! - [`audit`]: run log and summary
//! - [`pipeline`]: the end-to-end run

pub mod audit;
pub mod cli;
pub mod config;
pub mod detection;
pub mod evaluator;
pub mod extractors;
pub mod fs;
pub mod overrides;
pub mod pipeline;
pub mod tokens;
pub mod util;

pub use audit::{DetectionLogger, LogSummary};
pub use config::{ConfigError, TokenscoutConfig};
pub use detection::TokenDetector;
pub use evaluator::{ConfigEvaluator, EvalError, EvalMethod, Evaluation};
pub use extractors::UniversalTokenExtractor;
pub use overrides::{OverrideError, OverrideManager};
pub use pipeline::{PipelineOutput, TokenPipeline};
pub use tokens::{Ecosystem, TokenCategory, TokenSource, TokenTree};
pub use util::{init_default, init_from_env, init_logging, LogFormat, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
