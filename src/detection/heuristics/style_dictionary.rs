use super::SourceHeuristic;
use crate::detection::context::DetectionContext;
use crate::tokens::{Ecosystem, TokenSource};
use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const TOKEN_DIR_NAMES: &[&str] = &["tokens", "design-tokens"];
pub const CONFIG_NAMES: &[&str] = &["config.json", "style-dictionary.config.json"];

const CONFIG_CONFIDENCE: f64 = 0.9;

pub struct StyleDictionaryHeuristic;

impl StyleDictionaryHeuristic {
    /// Token directories mapped to the number of JSON files beneath them
    fn token_dirs(ctx: &DetectionContext) -> BTreeMap<PathBuf, usize> {
        let mut dirs: BTreeMap<PathBuf, usize> = BTreeMap::new();

        for file in ctx.files_with_extension(&["json"]) {
            let Ok(rel) = file.strip_prefix(&ctx.root) else {
                continue;
            };
            // Outermost token directory wins for nested layouts
            let mut prefix = ctx.root.clone();
            for component in rel.parent().into_iter().flat_map(|p| p.components()) {
                prefix.push(component);
                let name = component.as_os_str().to_str().unwrap_or_default();
                if TOKEN_DIR_NAMES.contains(&name) {
                    *dirs.entry(prefix.clone()).or_default() += 1;
                    break;
                }
            }
        }

        dirs
    }
}

impl SourceHeuristic for StyleDictionaryHeuristic {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::StyleDictionary
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<Vec<TokenSource>> {
        let mut sources = Vec::new();

        for (dir, count) in Self::token_dirs(ctx) {
            let confidence = (0.7 + 0.05 * count as f64).min(0.95);
            sources.push(
                TokenSource::new(
                    Ecosystem::StyleDictionary,
                    dir.clone(),
                    confidence,
                    format!("Design token directory with {} JSON files", count),
                )
                .with_metadata("fileCount", count)
                .with_metadata("directory", true),
            );
        }

        for name in CONFIG_NAMES {
            let path = ctx.root.join(name);
            if !ctx.fs.is_file(&path) {
                continue;
            }
            let text = match ctx.read_bounded(&path) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read Style Dictionary config"
                    );
                    continue;
                }
            };
            let names_source = serde_json::from_str::<Value>(&text)
                .ok()
                .map(|json| json.get("source").is_some())
                .unwrap_or(false);
            if !names_source {
                debug!(path = %path.display(), "JSON config without 'source', not Style Dictionary");
                continue;
            }

            sources.push(TokenSource::new(
                Ecosystem::StyleDictionary,
                path,
                CONFIG_CONFIDENCE,
                "Style Dictionary configuration",
            ));
        }

        Ok(sources)
    }
}
