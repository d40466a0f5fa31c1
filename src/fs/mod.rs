//! File access behind a trait, with a disk-backed and an in-memory implementation

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{is_excluded_path, FileMetadata, FileSystem, FileType, WalkLimits, EXCLUDED_DIRS};
pub use real::RealFileSystem;

use std::path::{Component, Path};

/// Project-relative path with `/` separators, used for pattern matching and display
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
