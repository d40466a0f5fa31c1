use super::normalize::{
    flatten_into, font_family_value, insert_value, object_at, scalar_children,
};
use crate::tokens::{PartialTokens, TokenCategory};
use serde_json::Value;

/// Extracts theme sections from an evaluated utility-CSS config.
///
/// `theme` and `theme.extend` are both read; extended values are applied
/// second so they win on equal names.
pub fn extract(config: &Value) -> PartialTokens {
    let mut partial = PartialTokens::new();
    let Some(theme) = object_at(config, "theme") else {
        return partial;
    };

    extract_sections(&mut partial, theme);
    if let Some(extend) = object_at(theme, "extend") {
        extract_sections(&mut partial, extend);
    }
    partial
}

fn extract_sections(partial: &mut PartialTokens, theme: &Value) {
    if let Some(colors) = object_at(theme, "colors") {
        flatten_into(partial, TokenCategory::Colors, "", colors);
    }
    if let Some(spacing) = object_at(theme, "spacing") {
        flatten_into(partial, TokenCategory::Spacing, "", spacing);
    }
    if let Some(sizes) = object_at(theme, "fontSize") {
        font_sizes(partial, sizes);
    }
    if let Some(Value::Object(families)) = theme.get("fontFamily") {
        for (name, stack) in families {
            insert_value(
                partial,
                TokenCategory::Typography,
                &format!("{}-fontFamily", name),
                font_family_value(stack),
            );
        }
    }
    if let Some(weights) = object_at(theme, "fontWeight") {
        scalar_children(partial, TokenCategory::Typography, weights, "-fontWeight");
    }
    if let Some(heights) = object_at(theme, "lineHeight") {
        scalar_children(partial, TokenCategory::Typography, heights, "-lineHeight");
    }
    if let Some(radius) = object_at(theme, "borderRadius") {
        flatten_into(partial, TokenCategory::Borders, "radius", radius);
    }
    if let Some(widths) = object_at(theme, "borderWidth") {
        flatten_into(partial, TokenCategory::Borders, "width", widths);
    }
    if let Some(shadows) = object_at(theme, "boxShadow") {
        flatten_into(partial, TokenCategory::Shadows, "", shadows);
    }
    if let Some(screens) = object_at(theme, "screens") {
        scalar_children(partial, TokenCategory::Breakpoints, screens, "");
    }
    if let Some(layers) = object_at(theme, "zIndex") {
        scalar_children(partial, TokenCategory::ZIndex, layers, "");
    }
    if let Some(durations) = object_at(theme, "transitionDuration") {
        scalar_children(partial, TokenCategory::Animations, durations, "-duration");
    }
    if let Some(timing) = object_at(theme, "transitionTimingFunction") {
        scalar_children(partial, TokenCategory::Animations, timing, "-easing");
    }
}

/// `sm: '0.875rem'` or `sm: ['0.875rem', { lineHeight: '1.25rem' }]`
fn font_sizes(partial: &mut PartialTokens, sizes: &Value) {
    let Some(sizes) = sizes.as_object() else {
        return;
    };

    for (name, entry) in sizes {
        let key = format!("{}-fontSize", name);
        match entry {
            Value::Array(tuple) => {
                if let Some(size) = tuple.first() {
                    partial.insert_json(TokenCategory::Typography, &key, size);
                }
                match tuple.get(1) {
                    Some(Value::Object(extra)) => {
                        for (prop, value) in extra {
                            partial.insert_json(
                                TokenCategory::Typography,
                                &format!("{}-{}", name, prop),
                                value,
                            );
                        }
                    }
                    // Legacy `['1rem', '1.5rem']` form
                    Some(line_height) => {
                        partial.insert_json(
                            TokenCategory::Typography,
                            &format!("{}-lineHeight", name),
                            line_height,
                        );
                    }
                    None => {}
                }
            }
            other => {
                partial.insert_json(TokenCategory::Typography, &key, other);
            }
        }
    }
}
