//! Shared helpers for turning evaluated config values into flat token names

use crate::tokens::{PartialTokens, TokenCategory, TokenEntry, TokenValue};
use serde_json::Value;
use std::sync::OnceLock;

/// Key that stands for the parent name in nested color scales
pub const DEFAULT_KEY: &str = "DEFAULT";

const NAMED_COLORS: &[&str] = &[
    "black", "white", "transparent", "currentcolor", "inherit", "red", "green", "blue",
    "yellow", "orange", "purple", "pink", "gray", "grey", "silver", "navy", "teal", "maroon",
    "olive", "lime", "aqua", "cyan", "magenta", "fuchsia", "indigo", "violet", "brown",
];

const COLOR_FUNCTIONS: &[&str] = &[
    "rgb(", "rgba(", "hsl(", "hsla(", "hwb(", "lab(", "lch(", "oklab(", "oklch(", "color(",
    "color-mix(",
];

fn hex_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^#(?:[0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
            .expect("hex color regex")
    })
}

/// Whether a CSS value is a color literal
pub fn is_color_value(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    hex_regex().is_match(&lowered)
        || COLOR_FUNCTIONS.iter().any(|f| lowered.starts_with(f))
        || NAMED_COLORS.contains(&lowered.as_str())
}

pub fn join_name(prefix: &str, key: &str) -> String {
    match (prefix.is_empty(), key == DEFAULT_KEY) {
        (true, _) => key.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}-{}", prefix, key),
    }
}

/// Inserts every scalar leaf under `value`, joining nested keys with `-`.
///
/// `DEFAULT` collapses into its parent name. Arrays and other non-scalar
/// leaves are skipped. Returns the number of tokens inserted.
pub fn flatten_into(
    partial: &mut PartialTokens,
    category: TokenCategory,
    prefix: &str,
    value: &Value,
) -> usize {
    flatten_filtered(partial, category, prefix, value, &|_| true)
}

/// Like [`flatten_into`] but only keeps string leaves that are colors
pub fn flatten_colors(
    partial: &mut PartialTokens,
    prefix: &str,
    value: &Value,
) -> usize {
    flatten_filtered(partial, TokenCategory::Colors, prefix, value, &|v| {
        v.as_str().map(is_color_value).unwrap_or(false)
    })
}

fn flatten_filtered(
    partial: &mut PartialTokens,
    category: TokenCategory,
    prefix: &str,
    value: &Value,
    keep: &dyn Fn(&Value) -> bool,
) -> usize {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| {
                flatten_filtered(partial, category, &join_name(prefix, key), child, keep)
            })
            .sum(),
        scalar if !prefix.is_empty() && keep(scalar) => {
            usize::from(partial.insert_json(category, prefix, scalar))
        }
        _ => 0,
    }
}

/// Inserts the direct scalar children of `value` as `<key><suffix>`.
///
/// Arrays are keyed by index, so `[0, 4, 8]` becomes `0`, `1`, `2`.
pub fn scalar_children(
    partial: &mut PartialTokens,
    category: TokenCategory,
    value: &Value,
    suffix: &str,
) -> usize {
    let mut added = 0;
    let mut put = |name: String, child: &Value| {
        if partial.insert_json(category, &format!("{}{}", name, suffix), child) {
            added += 1;
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                put(key.clone(), child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                put(index.to_string(), child);
            }
        }
        _ => {}
    }
    added
}

/// Font stacks given as arrays become one comma-separated value
pub fn font_family_value(value: &Value) -> Option<TokenValue> {
    match value {
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                // Tailwind allows `[stack, { fontFeatureSettings }]`
                .take_while(|v| !v.is_object())
                .flat_map(|v| match v {
                    Value::String(s) => vec![s.as_str()],
                    Value::Array(inner) => inner.iter().filter_map(Value::as_str).collect(),
                    _ => Vec::new(),
                })
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(TokenValue::Text(parts.join(", ")))
            }
        }
        other => TokenValue::from_json(other),
    }
}

pub fn insert_value(
    partial: &mut PartialTokens,
    category: TokenCategory,
    name: &str,
    value: Option<TokenValue>,
) -> bool {
    match value {
        Some(value) => {
            partial.insert(category, name, TokenEntry::new(value));
            true
        }
        None => false,
    }
}

/// Looks up `key` in an object and returns it only when it is an object
pub fn object_at<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}
