use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    /// Sockets, broken symlinks and the like
    Other,
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub file_type: FileType,
}

impl FileMetadata {
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Directory names a project walk never descends into: VCS metadata,
/// installed packages, build output, caches, and our own output directory
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    ".output",
    ".turbo",
    ".cache",
    "coverage",
    "vendor",
    "storybook-static",
    ".tokenscout",
];

/// Bounds for a recursive project walk
#[derive(Debug, Clone)]
pub struct WalkLimits {
    /// Files directly in the root are depth 1
    pub max_depth: usize,
    pub max_files: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_files: 2000,
        }
    }
}

/// True when a directory component of the root-relative `rel_path` is in
/// [`EXCLUDED_DIRS`]. The final component is never checked.
pub fn is_excluded_path(rel_path: &Path) -> bool {
    let Some(parent) = rel_path.parent() else {
        return false;
    };
    parent
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .any(|name| EXCLUDED_DIRS.contains(&name))
}

/// The file access detection and extraction need, swappable for an
/// in-memory tree in tests
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Every file below `root` outside excluded directories, sorted and
    /// capped at `limits.max_files`
    fn walk_files(&self, root: &Path, limits: &WalkLimits) -> Result<Vec<PathBuf>>;
}
