use super::SourceHeuristic;
use crate::detection::context::DetectionContext;
use crate::tokens::{Ecosystem, TokenSource};
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::warn;

pub const STYLESHEET_EXTENSIONS: &[&str] = &["css", "scss", "less"];

/// A stylesheet must declare more than this many properties to count
const MIN_PROPERTIES: usize = 5;
const MAX_CONFIDENCE: f64 = 0.9;

fn custom_property_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(--[A-Za-z0-9_-]+)\s*:").expect("valid custom property regex"))
}

/// Distinct custom property names declared in `text`
pub fn custom_properties(text: &str) -> BTreeSet<&str> {
    custom_property_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

pub struct CssVariablesHeuristic;

impl SourceHeuristic for CssVariablesHeuristic {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::CssVariables
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<Vec<TokenSource>> {
        let mut sources = Vec::new();

        for file in ctx.files_with_extension(STYLESHEET_EXTENSIONS) {
            let text = match ctx.read_bounded(file) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Failed to read stylesheet");
                    continue;
                }
            };

            let count = custom_properties(&text).len();
            if count <= MIN_PROPERTIES {
                continue;
            }

            let confidence = (count as f64 / 20.0).min(MAX_CONFIDENCE);
            sources.push(
                TokenSource::new(
                    Ecosystem::CssVariables,
                    file.clone(),
                    confidence,
                    format!("{} CSS custom properties", count),
                )
                .with_metadata("propertyCount", count),
            );
        }

        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::heuristics::test_support::context;

    fn stylesheet(count: usize) -> String {
        let body: String = (0..count)
            .map(|i| format!("  --color-{}: #00000{};\n", i, i % 10))
            .collect();
        format!(":root {{\n{}}}\n.btn {{ color: var(--color-0); }}\n", body)
    }

    #[test]
    fn test_six_properties_scores_point_three() {
        let six = stylesheet(6);
        let ctx = context(&[("styles/vars.css", six.as_str())]);

        let sources = CssVariablesHeuristic.detect(&ctx).unwrap();
        assert_eq!(sources.len(), 1);
        assert!((sources[0].confidence - 0.3).abs() < f64::EPSILON);
        assert_eq!(sources[0].metadata["propertyCount"], 6);
    }

    #[test]
    fn test_few_properties_are_ignored() {
        let one = stylesheet(1);
        let five = stylesheet(5);
        let ctx = context(&[("a.css", one.as_str()), ("b.scss", five.as_str())]);
        assert!(CssVariablesHeuristic.detect(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_confidence_is_capped() {
        let many = stylesheet(40);
        let ctx = context(&[("theme.less", many.as_str())]);
        let sources = CssVariablesHeuristic.detect(&ctx).unwrap();
        assert_eq!(sources[0].confidence, MAX_CONFIDENCE);
    }

    #[test]
    fn test_duplicates_and_var_references_not_counted() {
        let text = ":root { --a: 1; --a: 2; }\n.x { width: var(--b); }";
        assert_eq!(custom_properties(text).len(), 1);
    }
}
