use super::pattern::PathPattern;
use crate::fs::FileSystem;
use crate::tokens::{clamp_confidence, Ecosystem};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Operator config files, first existing wins
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "tokenscout.config.json",
    ".tokenscoutrc.json",
    ".tokenscoutrc",
    "tokenscout.config.yaml",
    "tokenscout.config.yml",
    "tokenscout.toml",
];

#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("Failed to read override config {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse override config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Drops sources matching every criterion it specifies
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludeRule {
    pub ecosystem: Option<Ecosystem>,
    pub path: Option<PathPattern>,
    pub min_confidence: Option<f64>,
}

impl ExcludeRule {
    pub fn matches(&self, ecosystem: Ecosystem, relative_path: &str, confidence: f64) -> bool {
        self.ecosystem.map_or(true, |e| e == ecosystem)
            && self
                .path
                .as_ref()
                .map_or(true, |p| p.matches(relative_path))
            && self.min_confidence.map_or(true, |min| confidence < min)
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(e) = self.ecosystem {
            parts.push(format!("type={}", e));
        }
        if let Some(p) = &self.path {
            parts.push(format!("path={}", p));
        }
        if let Some(min) = self.min_confidence {
            parts.push(format!("minConfidence={}", min));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncludeTarget {
    /// Project-relative or absolute path to one file or directory
    Path(String),
    Glob(PathPattern),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncludeRule {
    pub target: IncludeTarget,
    pub ecosystem: Ecosystem,
    pub confidence: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForceTypeRule {
    pub pattern: PathPattern,
    pub ecosystem: Ecosystem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoostRule {
    pub pattern: PathPattern,
    pub delta: f64,
}

/// Operator decisions applied on top of automatic detection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideConfig {
    pub exclude: Vec<ExcludeRule>,
    pub include: Vec<IncludeRule>,
    pub force_type: Vec<ForceTypeRule>,
    pub boost_confidence: Vec<BoostRule>,
}

impl OverrideConfig {
    pub fn is_empty(&self) -> bool {
        self.exclude.is_empty()
            && self.include.is_empty()
            && self.force_type.is_empty()
            && self.boost_confidence.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.exclude.len() + self.include.len() + self.force_type.len() + self.boost_confidence.len()
    }

    /// Reads rules leniently from a parsed config document.
    ///
    /// Rules live under the `tokens` key; a document without one is read from
    /// its root. Malformed rules are skipped with a warning.
    pub fn from_value(document: &Value) -> Self {
        let section = match document.get("tokens") {
            Some(tokens) => tokens,
            None => document,
        };
        let Some(section) = section.as_object() else {
            warn!("Override config section is not an object, ignoring");
            return Self::default();
        };

        let config = Self {
            exclude: list(section, "exclude")
                .into_iter()
                .filter_map(parse_exclude)
                .collect(),
            include: list(section, "include")
                .into_iter()
                .filter_map(parse_include)
                .collect(),
            force_type: entries(section, "forceType")
                .filter_map(|(pattern, value)| parse_force_type(pattern, value))
                .collect(),
            boost_confidence: entries(section, "boostConfidence")
                .filter_map(|(pattern, value)| parse_boost(pattern, value))
                .collect(),
        };

        debug!(
            exclude = config.exclude.len(),
            include = config.include.len(),
            force_type = config.force_type.len(),
            boost = config.boost_confidence.len(),
            "Parsed override rules"
        );
        config
    }

    /// Parses a config file's text, picking the format from its name
    pub fn parse(path: &Path, text: &str) -> Result<Self, OverrideError> {
        let parse_err = |message: String| OverrideError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let document: Value = if name.ends_with(".yaml") || name.ends_with(".yml") {
            serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?
        } else if name.ends_with(".toml") {
            let parsed: toml::Value = toml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
            serde_json::to_value(parsed).map_err(|e| parse_err(e.to_string()))?
        } else {
            serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?
        };

        Ok(Self::from_value(&document))
    }

    /// First config file present in `root`
    pub fn discover(fs: &dyn FileSystem, root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|candidate| fs.is_file(candidate))
    }

    /// Loads from `explicit` when given, otherwise from the discovered file.
    ///
    /// Returns the no-op config when nothing exists, along with the path that
    /// was read.
    pub fn load(
        fs: &dyn FileSystem,
        root: &Path,
        explicit: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>), OverrideError> {
        let path = match explicit {
            Some(p) if p.is_absolute() => Some(p.to_path_buf()),
            Some(p) => Some(root.join(p)),
            None => Self::discover(fs, root),
        };

        let Some(path) = path else {
            debug!(root = %root.display(), "No override config found");
            return Ok((Self::default(), None));
        };

        if !fs.is_file(&path) {
            if explicit.is_some() {
                warn!(path = %path.display(), "Override config not found, using defaults");
            }
            return Ok((Self::default(), None));
        }

        let text = fs.read_to_string(&path).map_err(|e| OverrideError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&path, &text)?;
        debug!(path = %path.display(), rules = config.rule_count(), "Loaded override config");
        Ok((config, Some(path)))
    }
}

fn list<'a>(section: &'a Map<String, Value>, key: &str) -> Vec<&'a Value> {
    match section.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(_) => {
            warn!(key, "Override rule list is not an array, ignoring");
            Vec::new()
        }
    }
}

fn entries<'a>(
    section: &'a Map<String, Value>,
    key: &'static str,
) -> impl Iterator<Item = (&'a String, &'a Value)> {
    let map = match section.get(key) {
        Some(Value::Object(map)) => Some(map),
        None | Some(Value::Null) => None,
        Some(_) => {
            warn!(key, "Override rule map is not an object, ignoring");
            None
        }
    };
    map.into_iter().flat_map(|m| m.iter())
}

fn ecosystem_field(rule: &Value, field: &str) -> Result<Option<Ecosystem>, String> {
    match rule.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(tag)) => Ecosystem::from_tag(tag)
            .map(Some)
            .ok_or_else(|| format!("unknown type '{}'", tag)),
        Some(other) => Err(format!("type must be a string, got {}", other)),
    }
}

fn string_field<'a>(rule: &'a Value, field: &str) -> Option<&'a str> {
    rule.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_exclude(rule: &Value) -> Option<ExcludeRule> {
    if !rule.is_object() {
        warn!(rule = %rule, "Skipping exclude rule: not an object");
        return None;
    }
    let ecosystem = match ecosystem_field(rule, "type") {
        Ok(e) => e,
        Err(reason) => {
            warn!(rule = %rule, reason = %reason, "Skipping exclude rule");
            return None;
        }
    };
    let min_confidence = match rule.get("minConfidence") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64() {
            Some(min) => Some(min),
            None => {
                warn!(rule = %rule, "Skipping exclude rule: minConfidence is not a number");
                return None;
            }
        },
    };
    let path = string_field(rule, "path")
        .or_else(|| string_field(rule, "glob"))
        .map(PathPattern::new);

    if ecosystem.is_none() && path.is_none() && min_confidence.is_none() {
        warn!(rule = %rule, "Skipping exclude rule: no criteria");
        return None;
    }

    Some(ExcludeRule {
        ecosystem,
        path,
        min_confidence,
    })
}

fn parse_include(rule: &Value) -> Option<IncludeRule> {
    let target = if let Some(path) = string_field(rule, "path") {
        IncludeTarget::Path(path.to_string())
    } else if let Some(glob) = string_field(rule, "glob") {
        IncludeTarget::Glob(PathPattern::new(glob))
    } else {
        warn!(rule = %rule, "Skipping include rule: needs 'path' or 'glob'");
        return None;
    };

    let ecosystem = match ecosystem_field(rule, "type") {
        Ok(Some(e)) => e,
        Ok(None) => {
            warn!(rule = %rule, "Skipping include rule: missing type");
            return None;
        }
        Err(reason) => {
            warn!(rule = %rule, reason = %reason, "Skipping include rule");
            return None;
        }
    };

    let confidence = match rule.get("confidence") {
        None | Some(Value::Null) => 1.0,
        Some(v) => match v.as_f64() {
            Some(c) => clamp_confidence(c),
            None => {
                warn!(rule = %rule, "Skipping include rule: confidence is not a number");
                return None;
            }
        },
    };

    Some(IncludeRule {
        target,
        ecosystem,
        confidence,
        description: string_field(rule, "description").map(str::to_string),
    })
}

fn parse_force_type(pattern: &str, value: &Value) -> Option<ForceTypeRule> {
    let ecosystem = value.as_str().and_then(Ecosystem::from_tag);
    match ecosystem {
        Some(ecosystem) if !pattern.trim().is_empty() => Some(ForceTypeRule {
            pattern: PathPattern::new(pattern),
            ecosystem,
        }),
        _ => {
            warn!(pattern, value = %value, "Skipping forceType rule");
            None
        }
    }
}

fn parse_boost(pattern: &str, value: &Value) -> Option<BoostRule> {
    match value.as_f64().filter(|d| d.is_finite()) {
        Some(delta) if !pattern.trim().is_empty() => Some(BoostRule {
            pattern: PathPattern::new(pattern),
            delta,
        }),
        _ => {
            warn!(pattern, value = %value, "Skipping boostConfidence rule: delta is not a number");
            None
        }
    }
}
