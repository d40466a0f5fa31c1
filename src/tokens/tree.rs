use super::{Ecosystem, TokenSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

crate::define_tag_enum! {
    /// Canonical bucket a token is normalized into
    TokenCategory {
        Colors => "colors" : "Colors" | "color",
        Spacing => "spacing" : "Spacing" | "space",
        Typography => "typography" : "Typography" | "font",
        Borders => "borders" : "Borders" | "border" | "radius",
        Shadows => "shadows" : "Shadows" | "shadow",
        Animations => "animations" : "Animations" | "animation" | "motion",
        Breakpoints => "breakpoints" : "Breakpoints" | "breakpoint" | "screens",
        ZIndex => "zIndex" : "Z-index" | "zindex" | "z-index",
    }
}

/// Scalar token value, either text or a JSON number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Number(serde_json::Number),
    Text(String),
}

impl TokenValue {
    /// Converts scalar JSON into a token value; objects, arrays, booleans and
    /// null are not token values.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(TokenValue::Text(trimmed.to_string()))
                }
            }
            Value::Number(n) => Some(TokenValue::Number(n.clone())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Text(s) => Some(s),
            TokenValue::Number(_) => None,
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(n) => write!(f, "{}", n),
            TokenValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        TokenValue::Text(value.to_string())
    }
}

impl From<String> for TokenValue {
    fn from(value: String) -> Self {
        TokenValue::Text(value)
    }
}

/// A token as produced by one extraction function, before provenance is attached
#[derive(Debug, Clone, PartialEq)]
pub struct TokenEntry {
    pub value: TokenValue,
    pub token_type: Option<String>,
    pub description: Option<String>,
}

impl TokenEntry {
    pub fn new(value: TokenValue) -> Self {
        Self {
            value,
            token_type: None,
            description: None,
        }
    }
}

/// Normalized token stored in the merged tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalToken {
    pub value: TokenValue,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: Ecosystem,
    pub path: PathBuf,
}

/// Tokens extracted from a single source, keyed by unprefixed name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialTokens {
    buckets: BTreeMap<TokenCategory, BTreeMap<String, TokenEntry>>,
}

impl PartialTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a scalar JSON value; returns false when the value is not a token
    pub fn insert_json(&mut self, category: TokenCategory, name: &str, value: &Value) -> bool {
        match TokenValue::from_json(value) {
            Some(v) => {
                self.insert(category, name, TokenEntry::new(v));
                true
            }
            None => false,
        }
    }

    pub fn insert(&mut self, category: TokenCategory, name: &str, entry: TokenEntry) {
        let name = name.trim_matches('-');
        if name.is_empty() {
            return;
        }
        self.buckets
            .entry(category)
            .or_default()
            .insert(name.to_string(), entry);
    }

    pub fn get(&self, category: TokenCategory, name: &str) -> Option<&TokenEntry> {
        self.buckets.get(&category).and_then(|b| b.get(name))
    }

    pub fn category(&self, category: TokenCategory) -> impl Iterator<Item = (&String, &TokenEntry)> {
        self.buckets.get(&category).into_iter().flat_map(|b| b.iter())
    }

    pub fn extend(&mut self, other: PartialTokens) {
        for (category, bucket) in other.buckets {
            self.buckets.entry(category).or_default().extend(bucket);
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_entries(self) -> impl Iterator<Item = (TokenCategory, String, TokenEntry)> {
        self.buckets.into_iter().flat_map(|(category, bucket)| {
            bucket
                .into_iter()
                .map(move |(name, entry)| (category, name, entry))
        })
    }
}

/// Per-source provenance recorded in the merged tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    #[serde(rename = "type")]
    pub ecosystem: Ecosystem,
    pub path: PathBuf,
    pub confidence: f64,
    pub token_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMeta {
    pub sources: Vec<SourceSummary>,
    pub extracted_at: DateTime<Utc>,
    pub total_tokens: usize,
}

impl Default for ExtractionMeta {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            extracted_at: Utc::now(),
            total_tokens: 0,
        }
    }
}

pub type TokenBucket = BTreeMap<String, CanonicalToken>;

/// Canonical token tree merged across all sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenTree {
    pub colors: TokenBucket,
    pub spacing: TokenBucket,
    pub typography: TokenBucket,
    pub borders: TokenBucket,
    pub shadows: TokenBucket,
    pub animations: TokenBucket,
    pub breakpoints: TokenBucket,
    #[serde(rename = "zIndex")]
    pub z_index: TokenBucket,
    pub meta: ExtractionMeta,
}

/// Outcome of folding one source into the tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub collisions: usize,
}

impl TokenTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, category: TokenCategory) -> &TokenBucket {
        match category {
            TokenCategory::Colors => &self.colors,
            TokenCategory::Spacing => &self.spacing,
            TokenCategory::Typography => &self.typography,
            TokenCategory::Borders => &self.borders,
            TokenCategory::Shadows => &self.shadows,
            TokenCategory::Animations => &self.animations,
            TokenCategory::Breakpoints => &self.breakpoints,
            TokenCategory::ZIndex => &self.z_index,
        }
    }

    fn bucket_mut(&mut self, category: TokenCategory) -> &mut TokenBucket {
        match category {
            TokenCategory::Colors => &mut self.colors,
            TokenCategory::Spacing => &mut self.spacing,
            TokenCategory::Typography => &mut self.typography,
            TokenCategory::Borders => &mut self.borders,
            TokenCategory::Shadows => &mut self.shadows,
            TokenCategory::Animations => &mut self.animations,
            TokenCategory::Breakpoints => &mut self.breakpoints,
            TokenCategory::ZIndex => &mut self.z_index,
        }
    }

    /// Folds one source's tokens in under `<tag>-<name>` keys.
    ///
    /// Keys from different ecosystems are disjoint by construction. When two
    /// sources of the same ecosystem produce the same key, the token already
    /// in the tree is kept.
    pub fn merge(&mut self, source: &TokenSource, partial: PartialTokens) -> MergeStats {
        let mut stats = MergeStats::default();
        let tag = source.ecosystem.tag();

        for (category, name, entry) in partial.into_entries() {
            let key = prefixed_key(source.ecosystem, &name);
            let bucket = self.bucket_mut(category);
            if bucket.contains_key(&key) {
                debug!(
                    key = %key,
                    category = %category,
                    ecosystem = tag,
                    path = %source.path.display(),
                    "Token key already present, keeping first value"
                );
                stats.collisions += 1;
                continue;
            }
            bucket.insert(
                key,
                CanonicalToken {
                    value: entry.value,
                    token_type: entry.token_type,
                    description: entry.description,
                    source: source.ecosystem,
                    path: source.path.clone(),
                },
            );
            stats.added += 1;
        }

        self.meta.total_tokens = self.total_tokens();
        stats
    }

    pub fn total_tokens(&self) -> usize {
        TokenCategory::all_variants()
            .iter()
            .map(|c| self.bucket(*c).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_tokens() == 0
    }
}

pub fn prefixed_key(ecosystem: Ecosystem, name: &str) -> String {
    format!("{}-{}", ecosystem.tag(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(ecosystem: Ecosystem, path: &str) -> TokenSource {
        TokenSource::new(ecosystem, path, 0.9, "test")
    }

    #[test]
    fn test_token_value_from_json() {
        assert_eq!(
            TokenValue::from_json(&json!("#fff")),
            Some(TokenValue::Text("#fff".to_string()))
        );
        assert!(matches!(
            TokenValue::from_json(&json!(4)),
            Some(TokenValue::Number(_))
        ));
        assert_eq!(TokenValue::from_json(&json!("  ")), None);
        assert_eq!(TokenValue::from_json(&json!(true)), None);
        assert_eq!(TokenValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_merge_prefixes_keys() {
        let mut tree = TokenTree::new();
        let mut partial = PartialTokens::new();
        partial.insert_json(TokenCategory::Colors, "primary", &json!("#3b82f6"));

        let stats = tree.merge(&source(Ecosystem::Tailwind, "/p/tailwind.config.js"), partial);

        assert_eq!(stats.added, 1);
        let token = tree.colors.get("tailwind-primary").unwrap();
        assert_eq!(token.value, TokenValue::from("#3b82f6"));
        assert_eq!(token.source, Ecosystem::Tailwind);
    }

    #[test]
    fn test_merge_different_ecosystems_never_collide() {
        let mut tree = TokenTree::new();
        for eco in [Ecosystem::Tailwind, Ecosystem::CssVariables] {
            let mut partial = PartialTokens::new();
            partial.insert_json(TokenCategory::Colors, "primary", &json!("#000"));
            let stats = tree.merge(&source(eco, "/p/x"), partial);
            assert_eq!(stats.collisions, 0);
        }
        assert_eq!(tree.colors.len(), 2);
        assert!(tree.colors.contains_key("tailwind-primary"));
        assert!(tree.colors.contains_key("css-variables-primary"));
    }

    #[test]
    fn test_merge_same_ecosystem_keeps_first() {
        let mut tree = TokenTree::new();
        let mut first = PartialTokens::new();
        first.insert_json(TokenCategory::Colors, "primary", &json!("#111"));
        let mut second = PartialTokens::new();
        second.insert_json(TokenCategory::Colors, "primary", &json!("#222"));

        tree.merge(&source(Ecosystem::CssVariables, "/p/a.css"), first);
        let stats = tree.merge(&source(Ecosystem::CssVariables, "/p/b.css"), second);

        assert_eq!(stats.collisions, 1);
        assert_eq!(
            tree.colors["css-variables-primary"].value,
            TokenValue::from("#111")
        );
    }

    #[test]
    fn test_tree_serializes_z_index_camel_case() {
        let tree = TokenTree::new();
        let json = serde_json::to_value(&tree).unwrap();
        assert!(json.get("zIndex").is_some());
        assert!(json["meta"].get("totalTokens").is_some());
    }

    #[test]
    fn test_partial_insert_ignores_empty_names() {
        let mut partial = PartialTokens::new();
        partial.insert_json(TokenCategory::Spacing, "-", &json!("4px"));
        assert!(partial.is_empty());
    }
}
