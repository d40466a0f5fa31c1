use crate::fs::{relative_path, FileSystem};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Packages nested deeper than this are not considered project packages
pub const MAX_PACKAGE_DEPTH: usize = 3;

/// Read-only view of the project shared by all heuristics of one run
pub struct DetectionContext {
    pub root: PathBuf,
    pub fs: Arc<dyn FileSystem>,
    /// Files found by the bounded project walk, sorted
    pub files: Vec<PathBuf>,
    /// Files above this size are not opened by heuristics
    pub max_file_size: u64,
}

impl DetectionContext {
    pub fn new(root: PathBuf, fs: Arc<dyn FileSystem>, files: Vec<PathBuf>, max_file_size: u64) -> Self {
        Self {
            root,
            fs,
            files,
            max_file_size,
        }
    }

    pub fn relative(&self, path: &Path) -> String {
        relative_path(&self.root, path)
    }

    /// Number of directories between the root and `path` (root files are 0)
    pub fn depth(&self, path: &Path) -> usize {
        self.relative(path).matches('/').count()
    }

    pub fn files_with_extension<'a>(
        &'a self,
        extensions: &'a [&'a str],
    ) -> impl Iterator<Item = &'a PathBuf> + 'a {
        self.files.iter().filter(move |p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
        })
    }

    /// Reads a file unless it exceeds the size bound
    pub fn read_bounded(&self, path: &Path) -> Result<Option<String>> {
        let meta = self.fs.metadata(path)?;
        if meta.len() > self.max_file_size {
            debug!(path = %path.display(), size = meta.len(), "Skipping oversized file");
            return Ok(None);
        }
        self.fs.read_to_string(path).map(Some)
    }

    /// The root plus every directory holding a `package.json` within
    /// [`MAX_PACKAGE_DEPTH`]
    pub fn package_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![self.root.clone()];
        for file in &self.files {
            if file.file_name().and_then(|n| n.to_str()) != Some("package.json") {
                continue;
            }
            let Some(dir) = file.parent() else { continue };
            if dir != self.root && self.depth(file) <= MAX_PACKAGE_DEPTH {
                roots.push(dir.to_path_buf());
            }
        }
        roots
    }

    /// All dependency names declared by `<dir>/package.json`
    pub fn dependencies(&self, dir: &Path) -> Result<BTreeSet<String>> {
        let manifest = dir.join("package.json");
        if !self.fs.is_file(&manifest) {
            return Ok(BTreeSet::new());
        }

        let text = self.fs.read_to_string(&manifest)?;
        let json: Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", manifest.display()))?;

        Ok(["dependencies", "devDependencies", "peerDependencies"]
            .iter()
            .filter_map(|section| json.get(*section).and_then(Value::as_object))
            .flat_map(|deps| deps.keys().cloned())
            .collect())
    }

    /// First of `candidates` (relative to `dir`) that exists as a file
    pub fn first_existing(&self, dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
        candidates
            .iter()
            .map(|c| dir.join(c))
            .find(|p| self.fs.is_file(p))
    }
}
