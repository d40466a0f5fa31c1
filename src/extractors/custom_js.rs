use super::normalize::{flatten_into, font_family_value, insert_value, join_name, scalar_children};
use super::token_tree;
use crate::tokens::{PartialTokens, TokenCategory};
use serde_json::Value;

/// Top-level group names recognised in hand-written token modules
const GROUPS: &[(&[&str], TokenCategory)] = &[
    (&["colors", "color", "palette"], TokenCategory::Colors),
    (&["spacing", "space"], TokenCategory::Spacing),
    (&["typography"], TokenCategory::Typography),
    (&["borders", "radii", "radius", "borderRadius"], TokenCategory::Borders),
    (&["shadows", "shadow", "boxShadow"], TokenCategory::Shadows),
    (&["animations", "animation", "motion", "transitions"], TokenCategory::Animations),
    (&["breakpoints", "screens"], TokenCategory::Breakpoints),
    (&["zIndex", "zIndices"], TokenCategory::ZIndex),
];

/// Typography scales that get a property suffix on every name
const TYPE_SCALES: &[(&str, &str)] = &[
    ("fontSizes", "-fontSize"),
    ("fontWeights", "-fontWeight"),
    ("lineHeights", "-lineHeight"),
    ("letterSpacings", "-letterSpacing"),
];

/// Single-key wrappers a module may put its tokens under
const WRAPPERS: &[&str] = &["tokens", "theme", "default"];

/// Extracts tokens from an evaluated token module.
///
/// Modules shaped as design-token trees go through the tree walker;
/// everything else is read by top-level group name.
pub fn extract(module: &Value) -> PartialTokens {
    if token_tree::has_token_leaves(module) {
        return token_tree::extract(module);
    }

    let partial = extract_groups(module);
    if !partial.is_empty() {
        return partial;
    }

    WRAPPERS
        .iter()
        .filter_map(|key| module.get(*key).filter(|v| v.is_object()))
        .map(|inner| {
            if token_tree::has_token_leaves(inner) {
                token_tree::extract(inner)
            } else {
                extract_groups(inner)
            }
        })
        .find(|p| !p.is_empty())
        .unwrap_or_default()
}

fn extract_groups(module: &Value) -> PartialTokens {
    let mut partial = PartialTokens::new();
    let Some(root) = module.as_object() else {
        return partial;
    };

    for (key, value) in root {
        let Some(category) = GROUPS
            .iter()
            .find(|(names, _)| names.contains(&key.as_str()))
            .map(|(_, category)| *category)
        else {
            continue;
        };

        match (category, value) {
            (TokenCategory::Typography, _) => flatten_typography(&mut partial, "", value),
            (_, Value::Array(_)) => {
                scalar_children(&mut partial, category, value, "");
            }
            _ => {
                flatten_into(&mut partial, category, "", value);
            }
        }
    }

    if let Some(Value::Object(fonts)) = root.get("fonts") {
        for (name, stack) in fonts {
            insert_value(
                &mut partial,
                TokenCategory::Typography,
                &format!("{}-fontFamily", name),
                font_family_value(stack),
            );
        }
    }
    for (key, suffix) in TYPE_SCALES {
        if let Some(scale) = root.get(*key) {
            scalar_children(&mut partial, TokenCategory::Typography, scale, suffix);
        }
    }

    partial
}

/// Nested typography objects; font stacks given as arrays are joined
fn flatten_typography(partial: &mut PartialTokens, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_typography(partial, &join_name(prefix, key), child);
            }
        }
        leaf if !prefix.is_empty() => {
            insert_value(partial, TokenCategory::Typography, prefix, font_family_value(leaf));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_groups() {
        let module = json!({
            "colors": {"brand": {"primary": "#ff6600"}},
            "space": [0, 4, 8],
            "typography": {"body": {"fontFamily": ["Inter", "sans-serif"], "fontSize": "16px"}},
            "fontSizes": {"sm": "14px"},
            "fonts": {"mono": ["Fira Code", "monospace"]},
            "radii": {"sm": "2px"},
            "zIndex": {"toast": 9000},
            "helpers": {"ignored": "yes"}
        });
        let partial = extract(&module);

        assert!(partial.get(TokenCategory::Colors, "brand-primary").is_some());
        assert_eq!(partial.category(TokenCategory::Spacing).count(), 3);
        assert_eq!(
            partial
                .get(TokenCategory::Typography, "body-fontFamily")
                .map(|e| e.value.to_string()),
            Some("Inter, sans-serif".to_string())
        );
        assert!(partial.get(TokenCategory::Typography, "body-fontSize").is_some());
        assert!(partial.get(TokenCategory::Typography, "sm-fontSize").is_some());
        assert!(partial.get(TokenCategory::Typography, "mono-fontFamily").is_some());
        assert!(partial.get(TokenCategory::Borders, "sm").is_some());
        assert!(partial.get(TokenCategory::ZIndex, "toast").is_some());
        assert_eq!(partial.len(), 10);
    }

    #[test]
    fn test_token_tree_is_delegated() {
        let module = json!({"color": {"primary": {"value": "#000"}}});
        let partial = extract(&module);
        assert!(partial.get(TokenCategory::Colors, "color-primary").is_some());
    }

    #[test]
    fn test_wrapped_module() {
        let module = json!({"tokens": {"colors": {"primary": "#000"}}});
        let partial = extract(&module);
        assert!(partial.get(TokenCategory::Colors, "primary").is_some());
    }

    #[test]
    fn test_unrecognised_module() {
        assert!(extract(&json!({"foo": {"bar": 1}})).is_empty());
        assert!(extract(&json!("text")).is_empty());
    }
}
