use super::literal::LiteralParser;
use crate::tokens::Ecosystem;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

const TAILWIND_KEYS: &[&str] = &[
    "colors",
    "spacing",
    "fontSize",
    "fontFamily",
    "fontWeight",
    "borderRadius",
    "boxShadow",
    "screens",
    "zIndex",
];

const MUI_KEYS: &[&str] = &[
    "palette",
    "spacing",
    "typography",
    "shape",
    "shadows",
    "breakpoints",
    "zIndex",
];

const CHAKRA_KEYS: &[&str] = &[
    "colors",
    "space",
    "fontSizes",
    "fonts",
    "fontWeights",
    "radii",
    "shadows",
    "breakpoints",
    "zIndices",
];

const GENERIC_KEYS: &[&str] = &["colors", "spacing", "typography"];

/// Top-level keys worth looking for in a source of the given ecosystem
pub fn profile_keys(ecosystem: Ecosystem) -> &'static [&'static str] {
    match ecosystem {
        Ecosystem::Tailwind => TAILWIND_KEYS,
        Ecosystem::Mui => MUI_KEYS,
        Ecosystem::Chakra => CHAKRA_KEYS,
        _ => GENERIC_KEYS,
    }
}

fn key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:^|[^\w$.])["']?([A-Za-z_$][\w$]*)["']?\s*:"#).expect("valid key regex")
    })
}

fn return_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\breturn\s*\(?|=>\s*\()\s*\{").expect("valid return regex")
    })
}

/// Pattern-based extraction used when a module cannot be executed.
///
/// Never fails: the worst case is an empty object.
pub struct StaticExtractor {
    parser: Arc<dyn LiteralParser>,
}

impl StaticExtractor {
    pub fn new(parser: Arc<dyn LiteralParser>) -> Self {
        Self { parser }
    }

    pub fn extract(&self, source: &str, ecosystem: Ecosystem) -> Value {
        let found = self.extract_keys(source, profile_keys(ecosystem));

        match ecosystem {
            Ecosystem::Tailwind => {
                let mut theme = Map::new();
                theme.insert("extend".to_string(), Value::Object(found));
                let mut root = Map::new();
                root.insert("theme".to_string(), Value::Object(theme));
                Value::Object(root)
            }
            _ => Value::Object(found),
        }
    }

    /// Recovers the object literal returned by a factory function body
    pub fn extract_return_block(&self, function_source: &str) -> Option<Value> {
        let m = return_regex().find(function_source)?;
        let open = m.end() - 1;
        self.parser
            .parse_object(&function_source[open..])
            .map(Value::Object)
    }

    fn extract_keys(&self, source: &str, keys: &[&str]) -> Map<String, Value> {
        let mut found = Map::new();
        // Spans already parsed as part of an earlier match
        let mut consumed: Vec<(usize, usize)> = Vec::new();

        for caps in key_regex().captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !keys.contains(&name.as_str()) {
                continue;
            }
            let value_start = whole.end();
            if consumed
                .iter()
                .any(|(start, end)| value_start > *start && value_start < *end)
            {
                continue;
            }

            if let Some((value, len)) = self.parser.parse_literal(&source[value_start..]) {
                consumed.push((value_start, value_start + len));
                merge_value(&mut found, name.as_str(), value);
            }
        }

        found
    }
}

/// Later object occurrences extend earlier ones; scalars keep the first value
fn merge_value(target: &mut Map<String, Value>, key: &str, value: Value) {
    match (target.get_mut(key), value) {
        (Some(Value::Object(existing)), Value::Object(incoming)) => {
            for (k, v) in incoming {
                merge_value(existing, &k, v);
            }
        }
        (Some(_), _) => {}
        (None, value) => {
            target.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::literal::ObjectLiteralParser;
    use serde_json::json;

    fn extractor() -> StaticExtractor {
        StaticExtractor::new(Arc::new(ObjectLiteralParser::new()))
    }

    #[test]
    fn test_tailwind_wraps_under_theme_extend() {
        let source = r#"
            const plugin = require('tailwindcss/plugin');
            module.exports = {
              content: ['./src/**/*.tsx'],
              theme: {
                colors: { white: '#fff' },
                extend: {
                  colors: { primary: '#3b82f6', brand: { 500: '#123456' } },
                  spacing: { 18: '4.5rem' },
                },
              },
              plugins: [plugin(function () {})],
            };
        "#;

        let value = extractor().extract(source, Ecosystem::Tailwind);
        let extend = &value["theme"]["extend"];
        assert_eq!(extend["colors"]["white"], "#fff");
        assert_eq!(extend["colors"]["primary"], "#3b82f6");
        assert_eq!(extend["colors"]["brand"]["500"], "#123456");
        assert_eq!(extend["spacing"]["18"], "4.5rem");
    }

    #[test]
    fn test_mui_profile() {
        let source = r#"
            export const theme = createTheme({
              palette: { primary: { main: '#1976d2' }, mode: 'light' },
              spacing: 8,
              typography: { fontFamily: 'Roboto', h1: { fontSize: '2rem' } },
              components: { MuiButton: { styleOverrides: {} } },
            });
        "#;

        let value = extractor().extract(source, Ecosystem::Mui);
        assert_eq!(value["palette"]["primary"]["main"], "#1976d2");
        assert_eq!(value["spacing"], 8);
        assert_eq!(value["typography"]["h1"]["fontSize"], "2rem");
        assert!(value.get("components").is_none());
    }

    #[test]
    fn test_nested_profile_keys_are_not_hoisted() {
        let source = "const t = { colors: { spacing: { a: '1px' } } }";
        let value = extractor().extract(source, Ecosystem::CustomJs);
        assert_eq!(value["colors"]["spacing"]["a"], "1px");
        assert!(value.get("spacing").is_none());
    }

    #[test]
    fn test_garbage_yields_empty_object() {
        let value = extractor().extract("this is {{{ not javascript", Ecosystem::Chakra);
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_return_block() {
        let function = r#"function (ctx) {
            const unused = ctx.theme('colors');
            return { colors: { primary: '#000' }, spacing: { sm: '4px' } };
        }"#;
        let value = extractor().extract_return_block(function).unwrap();
        assert_eq!(value, json!({"colors": {"primary": "#000"}, "spacing": {"sm": "4px"}}));

        let arrow = "() => ({ colors: { a: '#111' } })";
        assert_eq!(
            extractor().extract_return_block(arrow).unwrap()["colors"]["a"],
            "#111"
        );

        assert!(extractor().extract_return_block("() => 1").is_none());
    }
}
