use super::SourceHeuristic;
use crate::detection::context::DetectionContext;
use crate::tokens::{Ecosystem, TokenSource};
use anyhow::Result;

const CANDIDATES: &[&str] = &[
    "tokens.js",
    "tokens.ts",
    "tokens.cjs",
    "tokens.mjs",
    "design-tokens.js",
    "design-tokens.ts",
    "src/tokens.js",
    "src/tokens.ts",
    "src/theme/tokens.js",
    "src/theme/tokens.ts",
    "src/styles/tokens.js",
    "src/styles/tokens.ts",
];

const CONFIDENCE: f64 = 0.7;

/// Hand-written token modules at conventional locations; first match only
pub struct CustomJsHeuristic;

impl SourceHeuristic for CustomJsHeuristic {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::CustomJs
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<Vec<TokenSource>> {
        Ok(ctx
            .first_existing(&ctx.root, CANDIDATES)
            .map(|path| {
                let description = format!("Token module {}", ctx.relative(&path));
                TokenSource::new(Ecosystem::CustomJs, path, CONFIDENCE, description)
            })
            .into_iter()
            .collect())
    }
}
