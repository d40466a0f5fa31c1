use super::SourceHeuristic;
use crate::detection::context::{DetectionContext, MAX_PACKAGE_DEPTH};
use crate::tokens::{Ecosystem, TokenSource};
use anyhow::Result;

const CONFIG_NAMES: &[&str] = &[
    "tailwind.config.js",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
    "tailwind.config.ts",
];

const ROOT_CONFIDENCE: f64 = 0.95;
const NESTED_CONFIDENCE: f64 = 0.85;

pub struct TailwindHeuristic;

impl SourceHeuristic for TailwindHeuristic {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Tailwind
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<Vec<TokenSource>> {
        let mut sources = Vec::new();

        for file in &ctx.files {
            let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !CONFIG_NAMES.contains(&name) {
                continue;
            }

            let depth = ctx.depth(file);
            let (confidence, description) = match depth {
                0 => (ROOT_CONFIDENCE, "Tailwind CSS configuration".to_string()),
                d if d <= MAX_PACKAGE_DEPTH => (
                    NESTED_CONFIDENCE,
                    format!("Tailwind CSS configuration in {}", ctx.relative(file.parent().unwrap_or(file))),
                ),
                _ => continue,
            };

            sources.push(
                TokenSource::new(Ecosystem::Tailwind, file.clone(), confidence, description)
                    .with_metadata("configFile", name),
            );
        }

        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::heuristics::test_support::context;

    #[test]
    fn test_root_and_nested_configs() {
        let ctx = context(&[
            ("tailwind.config.js", "module.exports = {}"),
            ("apps/web/tailwind.config.ts", "export default {}"),
            ("a/b/c/d/tailwind.config.js", "module.exports = {}"),
            ("src/tailwind.js", "nope"),
        ]);

        let sources = TailwindHeuristic.detect(&ctx).unwrap();
        assert_eq!(sources.len(), 2);

        let root = sources.iter().find(|s| s.path.ends_with("repo/tailwind.config.js")).unwrap();
        assert_eq!(root.confidence, ROOT_CONFIDENCE);

        let nested = sources.iter().find(|s| s.path.ends_with("apps/web/tailwind.config.ts")).unwrap();
        assert_eq!(nested.confidence, NESTED_CONFIDENCE);
        assert!(nested.description.contains("apps/web"));
    }

    #[test]
    fn test_no_config() {
        let ctx = context(&[("package.json", "{}")]);
        assert!(TailwindHeuristic.detect(&ctx).unwrap().is_empty());
    }
}
