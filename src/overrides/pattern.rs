use glob::Pattern;
use std::fmt;
use tracing::warn;

/// Operator-supplied path matcher.
///
/// Matches a project-relative `/`-separated path when the raw text equals the
/// path or its file name, or when it parses as a glob that matches the path.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    glob: Option<Pattern>,
}

impl PathPattern {
    pub fn new(raw: &str) -> Self {
        let raw = normalize(raw);
        let glob = match Pattern::new(&raw) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(pattern = %raw, error = %e, "Invalid glob, matching literally");
                None
            }
        };
        Self { raw, glob }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, relative_path: &str) -> bool {
        let relative_path = normalize(relative_path);
        if relative_path == self.raw {
            return true;
        }
        let file_name = relative_path.rsplit('/').next().unwrap_or(&relative_path);
        if file_name == self.raw {
            return true;
        }
        self.glob
            .as_ref()
            .map(|g| g.matches(&relative_path))
            .unwrap_or(false)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

fn normalize(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        exact = { "src/theme.ts", "src/theme.ts", true },
        dot_slash = { "./src/theme.ts", "src/theme.ts", true },
        file_name = { "tokens.json", "design/tokens.json", true },
        star = { "*.css", "styles/vars.css", true },
        double_star = { "legacy/**", "legacy/old/vars.css", true },
        miss = { "legacy/**", "src/vars.css", false },
        partial_name = { "tokens", "design/tokens.json", false },
    )]
    fn test_matches(pattern: &str, path: &str, expected: bool) {
        assert_eq!(PathPattern::new(pattern).matches(path), expected);
    }

    #[test]
    fn test_invalid_glob_matches_literally() {
        let pattern = PathPattern::new("[unclosed");
        assert!(pattern.matches("[unclosed"));
        assert!(!pattern.matches("other"));
    }
}
