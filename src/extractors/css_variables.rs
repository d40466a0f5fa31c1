use super::normalize::is_color_value;
use crate::tokens::{PartialTokens, TokenCategory, TokenEntry, TokenValue};
use regex::Regex;
use std::sync::OnceLock;

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"--([A-Za-z0-9_-]+)\s*:\s*([^;{}]+)").expect("custom property regex")
    })
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("comment regex"))
}

/// Name fragments checked in order; the first hit decides the category
const NAME_RULES: &[(&[&str], TokenCategory)] = &[
    (&["radius"], TokenCategory::Borders),
    (&["shadow"], TokenCategory::Shadows),
    (&["z-index", "zindex"], TokenCategory::ZIndex),
    (&["breakpoint", "screen"], TokenCategory::Breakpoints),
    (&["duration", "ease", "transition"], TokenCategory::Animations),
    (&["font", "text", "line-height", "letter"], TokenCategory::Typography),
    (&["space", "spacing", "gap", "size-"], TokenCategory::Spacing),
];

/// Picks the bucket for one custom property, or `None` to ignore it
pub fn classify(name: &str, value: &str) -> Option<TokenCategory> {
    let name = name.trim_start_matches('-').to_ascii_lowercase();

    if name.contains("color") || name.contains("colour") || is_color_value(value) {
        return Some(TokenCategory::Colors);
    }
    if name.starts_with("z-") {
        return Some(TokenCategory::ZIndex);
    }

    NAME_RULES
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|f| name.contains(f)))
        .map(|(_, category)| *category)
}

/// Extracts custom property declarations from a stylesheet.
///
/// The first declaration of a name wins, so theme-variant blocks later in
/// the file (`.dark { --bg: ... }`) do not replace the base value.
pub fn extract(stylesheet: &str) -> PartialTokens {
    let mut partial = PartialTokens::new();
    let text = comment_regex().replace_all(stylesheet, "");

    for caps in declaration_regex().captures_iter(&text) {
        let name = &caps[1];
        let value = caps[2].trim().trim_end_matches("!important").trim();
        if value.is_empty() {
            continue;
        }
        let Some(category) = classify(name, value) else {
            continue;
        };
        if partial.get(category, name).is_some() {
            continue;
        }
        partial.insert(category, name, TokenEntry::new(TokenValue::from(value)));
    }

    partial
}
