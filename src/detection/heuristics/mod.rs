//! Per-ecosystem source heuristics
//!
//! Each heuristic is independent and side-effect free: it inspects the shared
//! [`DetectionContext`] and proposes zero or more [`TokenSource`]s with a
//! confidence score.

pub mod component_theme;
pub mod css_variables;
pub mod custom_js;
pub mod figma;
pub mod style_dictionary;
pub mod tailwind;

pub use component_theme::ComponentThemeHeuristic;
pub use css_variables::CssVariablesHeuristic;
pub use custom_js::CustomJsHeuristic;
pub use figma::FigmaTokensHeuristic;
pub use style_dictionary::StyleDictionaryHeuristic;
pub use tailwind::TailwindHeuristic;

use super::context::DetectionContext;
use crate::tokens::{Ecosystem, TokenSource};
use anyhow::Result;
use std::sync::Arc;

pub trait SourceHeuristic: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;

    fn detect(&self, ctx: &DetectionContext) -> Result<Vec<TokenSource>>;
}

pub struct HeuristicRegistry {
    heuristics: Vec<Arc<dyn SourceHeuristic>>,
}

impl HeuristicRegistry {
    pub fn new() -> Self {
        Self {
            heuristics: Vec::new(),
        }
    }

    /// One heuristic per ecosystem
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for ecosystem in Ecosystem::all_variants() {
            let heuristic: Arc<dyn SourceHeuristic> = match ecosystem {
                Ecosystem::Tailwind => Arc::new(TailwindHeuristic),
                Ecosystem::Mui => Arc::new(ComponentThemeHeuristic::mui()),
                Ecosystem::Chakra => Arc::new(ComponentThemeHeuristic::chakra()),
                Ecosystem::CssVariables => Arc::new(CssVariablesHeuristic),
                Ecosystem::StyleDictionary => Arc::new(StyleDictionaryHeuristic),
                Ecosystem::CustomJs => Arc::new(CustomJsHeuristic),
                Ecosystem::FigmaTokens => Arc::new(FigmaTokensHeuristic),
            };
            registry.register(heuristic);
        }
        registry
    }

    pub fn register(&mut self, heuristic: Arc<dyn SourceHeuristic>) {
        self.heuristics.push(heuristic);
    }

    pub fn heuristics(&self) -> &[Arc<dyn SourceHeuristic>] {
        &self.heuristics
    }

    pub fn get(&self, ecosystem: Ecosystem) -> Option<&dyn SourceHeuristic> {
        self.heuristics
            .iter()
            .find(|h| h.ecosystem() == ecosystem)
            .map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.heuristics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heuristics.is_empty()
    }
}

impl Default for HeuristicRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
