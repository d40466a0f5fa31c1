//! Output formatting for detected sources and token trees

use crate::tokens::{TokenCategory, TokenSource, TokenTree};
use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty JSON (machine-readable)
    Json,
    /// Aligned text for terminals
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_sources(&self, sources: &[TokenSource]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(sources)
                .context("Failed to serialize token sources to JSON"),
            OutputFormat::Human => Ok(self.format_sources_human(sources)),
        }
    }

    pub fn format_tree(&self, tree: &TokenTree) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(tree).context("Failed to serialize token tree to JSON")
            }
            OutputFormat::Human => Ok(self.format_tree_human(tree)),
        }
    }

    fn format_sources_human(&self, sources: &[TokenSource]) -> String {
        if sources.is_empty() {
            return "No token sources found.\n".to_string();
        }

        let mut out = format!("Found {} token source(s):\n\n", sources.len());
        for source in sources {
            let marker = if source.is_manual() { " (manual)" } else { "" };
            out.push_str(&format!(
                "  {:>5.1}%  {:<16} {}{}\n",
                source.confidence * 100.0,
                source.ecosystem.tag(),
                source.path.display(),
                marker
            ));
            out.push_str(&format!("          {}\n", source.description));
            if let Some(original) = source.original_type() {
                out.push_str(&format!("          retyped from {}\n", original));
            }
        }
        out
    }

    fn format_tree_human(&self, tree: &TokenTree) -> String {
        let mut out = format!("{} token(s)\n", tree.total_tokens());
        for category in TokenCategory::all_variants() {
            let bucket = tree.bucket(*category);
            if bucket.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{} ({})\n", category.name(), bucket.len()));
            for (key, token) in bucket {
                out.push_str(&format!("  {:<40} {}\n", key, token.value));
            }
        }
        out
    }
}
