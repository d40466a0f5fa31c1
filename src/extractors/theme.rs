//! Component-library theme objects (createTheme / extendTheme shapes)

use super::normalize::{
    flatten_colors, flatten_into, font_family_value, insert_value, object_at, scalar_children,
};
use crate::tokens::{PartialTokens, TokenCategory};
use serde_json::Value;

const MUI_TYPOGRAPHY_PROPS: &[&str] = &[
    "fontFamily",
    "fontSize",
    "fontWeight",
    "lineHeight",
    "letterSpacing",
];

/// Material-style theme: `palette`, `spacing`, `typography`, `shape`,
/// `shadows`, `breakpoints`, `zIndex`
pub fn extract_mui(theme: &Value) -> PartialTokens {
    let mut partial = PartialTokens::new();

    if let Some(palette) = object_at(theme, "palette") {
        flatten_colors(&mut partial, "", palette);
    }

    match theme.get("spacing") {
        Some(base @ Value::Number(_)) | Some(base @ Value::String(_)) => {
            partial.insert_json(TokenCategory::Spacing, "base", base);
        }
        Some(scale @ Value::Array(_)) | Some(scale @ Value::Object(_)) => {
            scalar_children(&mut partial, TokenCategory::Spacing, scale, "");
        }
        _ => {}
    }

    if let Some(Value::Object(typography)) = theme.get("typography") {
        for (key, entry) in typography {
            match entry {
                Value::Object(variant) => {
                    for prop in MUI_TYPOGRAPHY_PROPS {
                        let Some(value) = variant.get(*prop) else { continue };
                        let name = format!("{}-{}", key, prop);
                        if *prop == "fontFamily" {
                            insert_value(&mut partial, TokenCategory::Typography, &name, font_family_value(value));
                        } else {
                            partial.insert_json(TokenCategory::Typography, &name, value);
                        }
                    }
                }
                scalar if MUI_TYPOGRAPHY_PROPS.contains(&key.as_str())
                    || key.starts_with("fontWeight") =>
                {
                    partial.insert_json(TokenCategory::Typography, key, scalar);
                }
                _ => {}
            }
        }
    }

    if let Some(radius) = theme.pointer("/shape/borderRadius") {
        partial.insert_json(TokenCategory::Borders, "borderRadius", radius);
    }

    // MUI ships 25 elevation levels; "none" at index 0 carries no information
    if let Some(Value::Array(shadows)) = theme.get("shadows") {
        for (level, shadow) in shadows.iter().enumerate() {
            if shadow.as_str() == Some("none") {
                continue;
            }
            partial.insert_json(TokenCategory::Shadows, &level.to_string(), shadow);
        }
    }

    if let Some(values) = theme.pointer("/breakpoints/values") {
        scalar_children(&mut partial, TokenCategory::Breakpoints, values, "");
    }

    if let Some(layers) = object_at(theme, "zIndex") {
        scalar_children(&mut partial, TokenCategory::ZIndex, layers, "");
    }

    if let Some(duration) = theme.pointer("/transitions/duration") {
        scalar_children(&mut partial, TokenCategory::Animations, duration, "-duration");
    }
    if let Some(easing) = theme.pointer("/transitions/easing") {
        scalar_children(&mut partial, TokenCategory::Animations, easing, "-easing");
    }

    partial
}

/// Chakra-style theme: `colors`, `space`, `fontSizes`, `fonts`,
/// `fontWeights`, `radii`, `shadows`, `breakpoints`, `zIndices`
pub fn extract_chakra(theme: &Value) -> PartialTokens {
    let mut partial = PartialTokens::new();

    if let Some(colors) = object_at(theme, "colors") {
        flatten_into(&mut partial, TokenCategory::Colors, "", colors);
    }
    if let Some(space) = theme.get("space") {
        scalar_children(&mut partial, TokenCategory::Spacing, space, "");
    }
    if let Some(sizes) = theme.get("fontSizes") {
        scalar_children(&mut partial, TokenCategory::Typography, sizes, "-fontSize");
    }
    if let Some(Value::Object(fonts)) = theme.get("fonts") {
        for (name, stack) in fonts {
            insert_value(
                &mut partial,
                TokenCategory::Typography,
                &format!("{}-fontFamily", name),
                font_family_value(stack),
            );
        }
    }
    if let Some(weights) = theme.get("fontWeights") {
        scalar_children(&mut partial, TokenCategory::Typography, weights, "-fontWeight");
    }
    if let Some(heights) = theme.get("lineHeights") {
        scalar_children(&mut partial, TokenCategory::Typography, heights, "-lineHeight");
    }
    if let Some(spacing) = theme.get("letterSpacings") {
        scalar_children(&mut partial, TokenCategory::Typography, spacing, "-letterSpacing");
    }
    if let Some(radii) = theme.get("radii") {
        scalar_children(&mut partial, TokenCategory::Borders, radii, "");
    }
    if let Some(shadows) = theme.get("shadows") {
        scalar_children(&mut partial, TokenCategory::Shadows, shadows, "");
    }
    if let Some(breakpoints) = theme.get("breakpoints") {
        scalar_children(&mut partial, TokenCategory::Breakpoints, breakpoints, "");
    }
    if let Some(layers) = theme.get("zIndices") {
        scalar_children(&mut partial, TokenCategory::ZIndex, layers, "");
    }
    if let Some(durations) = theme.pointer("/transition/duration") {
        scalar_children(&mut partial, TokenCategory::Animations, durations, "-duration");
    }

    partial
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(partial: &PartialTokens, category: TokenCategory, name: &str) -> Option<String> {
        partial.get(category, name).map(|e| e.value.to_string())
    }

    #[test]
    fn test_mui_palette_and_spacing() {
        let theme = json!({
            "palette": {
                "mode": "dark",
                "primary": {"main": "#1976d2", "contrastText": "#fff"},
                "action": {"hoverOpacity": 0.04},
                "divider": "rgba(0, 0, 0, 0.12)"
            },
            "spacing": 8
        });
        let partial = extract_mui(&theme);

        assert_eq!(value(&partial, TokenCategory::Colors, "primary-main").as_deref(), Some("#1976d2"));
        assert!(partial.get(TokenCategory::Colors, "primary-contrastText").is_some());
        assert!(partial.get(TokenCategory::Colors, "divider").is_some());
        assert!(partial.get(TokenCategory::Colors, "mode").is_none());
        assert!(partial.get(TokenCategory::Colors, "action-hoverOpacity").is_none());
        assert_eq!(value(&partial, TokenCategory::Spacing, "base").as_deref(), Some("8"));
    }

    #[test]
    fn test_mui_typography_variants() {
        let theme = json!({
            "typography": {
                "fontFamily": "Roboto, sans-serif",
                "fontSize": 14,
                "fontWeightBold": 700,
                "h1": {"fontSize": "2.5rem", "fontWeight": 300, "color": "red"},
                "htmlFontSize": 16
            }
        });
        let partial = extract_mui(&theme);
        let typo = TokenCategory::Typography;

        assert_eq!(value(&partial, typo, "fontFamily").as_deref(), Some("Roboto, sans-serif"));
        assert_eq!(value(&partial, typo, "fontSize").as_deref(), Some("14"));
        assert_eq!(value(&partial, typo, "fontWeightBold").as_deref(), Some("700"));
        assert_eq!(value(&partial, typo, "h1-fontSize").as_deref(), Some("2.5rem"));
        assert_eq!(value(&partial, typo, "h1-fontWeight").as_deref(), Some("300"));
        assert!(partial.get(typo, "h1-color").is_none());
        assert!(partial.get(typo, "htmlFontSize").is_none());
    }

    #[test]
    fn test_mui_reserved_categories() {
        let theme = json!({
            "spacing": [0, 4, 8],
            "shape": {"borderRadius": 4},
            "shadows": ["none", "0px 1px 3px rgba(0,0,0,0.2)"],
            "breakpoints": {"values": {"xs": 0, "md": 900}},
            "zIndex": {"modal": 1300}
        });
        let partial = extract_mui(&theme);

        assert_eq!(partial.category(TokenCategory::Spacing).count(), 3);
        assert!(partial.get(TokenCategory::Borders, "borderRadius").is_some());
        assert_eq!(partial.category(TokenCategory::Shadows).count(), 1);
        assert!(partial.get(TokenCategory::Shadows, "1").is_some());
        assert_eq!(value(&partial, TokenCategory::Breakpoints, "md").as_deref(), Some("900"));
        assert!(partial.get(TokenCategory::ZIndex, "modal").is_some());
    }

    #[test]
    fn test_chakra_theme() {
        let theme = json!({
            "colors": {"brand": {"50": "#f7fafc", "900": "#1a202c"}},
            "space": {"1": "0.25rem"},
            "fonts": {"heading": "Georgia, serif"},
            "fontSizes": {"md": "1rem"},
            "fontWeights": {"bold": 700},
            "radii": {"md": "0.375rem"},
            "shadows": {"outline": "0 0 0 3px rgba(66, 153, 225, 0.6)"},
            "breakpoints": {"md": "48em"},
            "zIndices": {"modal": 1400}
        });
        let partial = extract_chakra(&theme);

        assert!(partial.get(TokenCategory::Colors, "brand-50").is_some());
        assert!(partial.get(TokenCategory::Colors, "brand-900").is_some());
        assert!(partial.get(TokenCategory::Spacing, "1").is_some());
        assert!(partial.get(TokenCategory::Typography, "heading-fontFamily").is_some());
        assert!(partial.get(TokenCategory::Typography, "md-fontSize").is_some());
        assert!(partial.get(TokenCategory::Typography, "bold-fontWeight").is_some());
        assert!(partial.get(TokenCategory::Borders, "md").is_some());
        assert!(partial.get(TokenCategory::Shadows, "outline").is_some());
        assert!(partial.get(TokenCategory::Breakpoints, "md").is_some());
        assert!(partial.get(TokenCategory::ZIndex, "modal").is_some());
        assert_eq!(partial.len(), 10);
    }
}
