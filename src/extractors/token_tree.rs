//! Walker for design-token JSON trees (`value`/`$value` leaves)
//!
//! Covers token-dictionary style files and design-tool exports. A leaf's
//! name is its path joined with `-`. Its category comes from the token
//! type when that is conclusive, otherwise from the nearest recognizable
//! group name on the path.

use super::normalize::font_family_value;
use crate::tokens::{PartialTokens, TokenCategory, TokenEntry, TokenValue};
use serde_json::{Map, Value};

/// Extracts every token leaf under `doc`
pub fn extract(doc: &Value) -> PartialTokens {
    let mut partial = PartialTokens::new();
    if let Value::Object(root) = doc {
        let mut path = Vec::new();
        walk(root, &mut path, None, &mut partial);
    }
    partial
}

/// Whether `doc` contains at least one `value`/`$value` token leaf
pub fn has_token_leaves(doc: &Value) -> bool {
    match doc {
        Value::Object(map) => is_leaf(map).is_some() || map.values().any(has_token_leaves),
        _ => false,
    }
}

fn walk(
    node: &Map<String, Value>,
    path: &mut Vec<String>,
    inherited_type: Option<&str>,
    partial: &mut PartialTokens,
) {
    // DTCG lets a group declare `$type` for all of its descendants
    let group_type = node
        .get("$type")
        .and_then(Value::as_str)
        .or(inherited_type);

    for (key, child) in node {
        // `$type`, `$description` and export metadata such as `$themes`
        if key.starts_with('$') {
            continue;
        }
        let Value::Object(child) = child else { continue };

        path.push(key.clone());
        match is_leaf(child) {
            Some(value) => insert_leaf(child, value, path, group_type, partial),
            None => walk(child, path, group_type, partial),
        }
        path.pop();
    }
}

/// Returns the token value when `node` is a leaf
fn is_leaf(node: &Map<String, Value>) -> Option<&Value> {
    if let Some(value) = node.get("$value") {
        return Some(value);
    }
    match node.get("value") {
        Some(Value::Object(_)) if !node.contains_key("type") => None,
        other => other,
    }
}

fn insert_leaf(
    node: &Map<String, Value>,
    value: &Value,
    path: &[String],
    group_type: Option<&str>,
    partial: &mut PartialTokens,
) {
    let token_type = node
        .get("$type")
        .or_else(|| node.get("type"))
        .and_then(Value::as_str)
        .or(group_type);

    let Some(category) = token_type
        .and_then(category_for_type)
        .or_else(|| category_for_path(path))
    else {
        return;
    };

    let value = if category == TokenCategory::Typography {
        font_family_value(value)
    } else {
        TokenValue::from_json(value)
    };
    let Some(value) = value else { return };

    let description = node
        .get("$description")
        .or_else(|| node.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string);

    partial.insert(
        category,
        &path.join("-"),
        TokenEntry {
            value,
            token_type: token_type.map(str::to_string),
            description,
        },
    );
}

/// Maps a token type to a category; generic types like `dimension` defer to
/// the path
pub fn category_for_type(token_type: &str) -> Option<TokenCategory> {
    let t = token_type.to_ascii_lowercase();
    let category = match t.as_str() {
        "color" => TokenCategory::Colors,
        "spacing" | "space" | "sizing" => TokenCategory::Spacing,
        "borderradius" | "borderwidth" | "border" => TokenCategory::Borders,
        "boxshadow" | "shadow" => TokenCategory::Shadows,
        "duration" | "cubicbezier" | "transition" => TokenCategory::Animations,
        "typography" | "lineheight" | "lineheights" | "letterspacing" | "paragraphspacing"
        | "textcase" | "textdecoration" => TokenCategory::Typography,
        _ if t.starts_with("font") => TokenCategory::Typography,
        _ => return None,
    };
    Some(category)
}

/// First path segment that names a known group decides the category
pub fn category_for_path(path: &[String]) -> Option<TokenCategory> {
    path.iter().find_map(|segment| category_for_group(segment))
}

fn category_for_group(segment: &str) -> Option<TokenCategory> {
    let s = segment.to_ascii_lowercase().replace(['-', '_'], "");
    let category = match s.as_str() {
        "color" | "colors" | "colour" | "colours" | "palette" => TokenCategory::Colors,
        "spacing" | "space" | "size" | "sizes" | "sizing" => TokenCategory::Spacing,
        "typography" | "text" | "lineheight" | "lineheights" | "letterspacing" => {
            TokenCategory::Typography
        }
        "radius" | "radii" => TokenCategory::Borders,
        "breakpoint" | "breakpoints" | "screens" => TokenCategory::Breakpoints,
        "zindex" | "zindices" | "layer" | "layers" => TokenCategory::ZIndex,
        "animation" | "animations" | "motion" | "duration" | "easing" | "transition" => {
            TokenCategory::Animations
        }
        _ if s.starts_with("font") => TokenCategory::Typography,
        _ if s.starts_with("border") => TokenCategory::Borders,
        _ if s.starts_with("shadow") || s.starts_with("elevation") => TokenCategory::Shadows,
        _ => return None,
    };
    Some(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_style_dictionary_tree() {
        let doc = json!({
            "color": {
                "base": {
                    "red": {"value": "#ff0000", "comment": "ignored"},
                    "blue": {"value": "#0000ff", "description": "Brand blue"}
                }
            },
            "size": {"padding": {"small": {"value": "4px"}}},
            "misc": {"opacity": {"value": 0.5}}
        });
        let partial = extract(&doc);

        assert_eq!(partial.len(), 3);
        let blue = partial.get(TokenCategory::Colors, "color-base-blue").unwrap();
        assert_eq!(blue.value, TokenValue::from("#0000ff"));
        assert_eq!(blue.description.as_deref(), Some("Brand blue"));
        assert!(partial.get(TokenCategory::Spacing, "size-padding-small").is_some());
    }

    #[test]
    fn test_dtcg_types_and_group_type() {
        let doc = json!({
            "brand": {
                "$type": "color",
                "primary": {"$value": "#3b82f6"},
                "secondary": {"$value": "#64748b", "$description": "Muted"}
            },
            "motion": {"fast": {"$value": "150ms", "$type": "duration"}},
            "heading": {"$value": ["Inter", "sans-serif"], "$type": "fontFamily"}
        });
        let partial = extract(&doc);

        let primary = partial.get(TokenCategory::Colors, "brand-primary").unwrap();
        assert_eq!(primary.token_type.as_deref(), Some("color"));
        assert!(partial.get(TokenCategory::Animations, "motion-fast").is_some());
        assert_eq!(
            partial.get(TokenCategory::Typography, "heading").map(|e| e.value.clone()),
            Some(TokenValue::from("Inter, sans-serif"))
        );
    }

    #[test]
    fn test_figma_export_skips_metadata() {
        let doc = json!({
            "global": {
                "colors": {"white": {"value": "#ffffff", "type": "color"}},
                "borderRadius": {"sm": {"value": "4", "type": "borderRadius"}},
                "shadow": {"value": {"x": 0, "y": 1, "blur": 2}, "type": "boxShadow"}
            },
            "$themes": [],
            "$metadata": {"tokenSetOrder": ["global"]}
        });
        let partial = extract(&doc);

        assert!(partial.get(TokenCategory::Colors, "global-colors-white").is_some());
        assert!(partial.get(TokenCategory::Borders, "global-borderRadius-sm").is_some());
        // Composite shadow objects are not scalar tokens
        assert_eq!(partial.len(), 2);
    }

    #[test]
    fn test_has_token_leaves() {
        assert!(has_token_leaves(&json!({"a": {"b": {"value": 1}}})));
        assert!(has_token_leaves(&json!({"a": {"$value": "x"}})));
        assert!(!has_token_leaves(&json!({"colors": {"primary": "#fff"}})));
    }
}
