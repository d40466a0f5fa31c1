use super::SourceHeuristic;
use crate::detection::context::DetectionContext;
use crate::tokens::{Ecosystem, TokenSource};
use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

const CONFIDENCE: f64 = 0.85;
const EXPORT_MARKERS: &[&str] = &["$metadata", "$themes"];
const THEME_GROUPS: &[&str] = &["global", "light", "dark", "core"];

/// Whether a parsed JSON document looks like a design-tool token export
pub fn is_export_shape(json: &Value) -> bool {
    let Some(root) = json.as_object() else {
        return false;
    };
    EXPORT_MARKERS.iter().any(|k| root.contains_key(*k))
        || THEME_GROUPS
            .iter()
            .any(|k| root.get(*k).map(Value::is_object).unwrap_or(false))
}

pub struct FigmaTokensHeuristic;

impl SourceHeuristic for FigmaTokensHeuristic {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::FigmaTokens
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<Vec<TokenSource>> {
        let mut sources = Vec::new();

        for file in ctx.files_with_extension(&["json"]) {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !(name.contains("token") || name.contains("figma")) {
                continue;
            }

            let text = match ctx.read_bounded(file) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Failed to read token export");
                    continue;
                }
            };
            let Ok(json) = serde_json::from_str::<Value>(&text) else {
                debug!(path = %file.display(), "Token-named JSON is not valid JSON");
                continue;
            };
            if !is_export_shape(&json) {
                continue;
            }

            sources.push(TokenSource::new(
                Ecosystem::FigmaTokens,
                file.clone(),
                CONFIDENCE,
                "Figma token export",
            ));
        }

        Ok(sources)
    }
}
