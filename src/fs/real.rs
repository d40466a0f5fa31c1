use super::{FileMetadata, FileSystem, FileType, WalkLimits, EXCLUDED_DIRS};
use anyhow::{bail, Context, Result};
use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Disk-backed [`FileSystem`]. Walks honour `.gitignore` files even outside a
/// git checkout, but not the user's global excludes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn keep_entry(entry: &DirEntry) -> bool {
    let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
    if !is_dir || entry.depth() == 0 {
        return true;
    }
    entry
        .file_name()
        .to_str()
        .map_or(true, |name| !EXCLUDED_DIRS.contains(&name))
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let meta =
            fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
        let file_type = if meta.is_file() {
            FileType::File
        } else if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::Other
        };
        Ok(FileMetadata {
            size: meta.len(),
            file_type,
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn walk_files(&self, root: &Path, limits: &WalkLimits) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            bail!("Walk root is not a directory: {}", root.display());
        }

        let walker = WalkBuilder::new(root)
            .max_depth(Some(limits.max_depth))
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .require_git(false)
            .filter_entry(keep_entry)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable entry during walk");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if files.len() == limits.max_files {
                warn!(
                    max_files = limits.max_files,
                    root = %root.display(),
                    "File limit reached, remaining files are not scanned"
                );
                break;
            }
            files.push(entry.into_path());
        }

        files.sort();
        debug!(root = %root.display(), files = files.len(), "Project walk finished");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/styles")).unwrap();
        fs::write(dir.path().join("tailwind.config.js"), "module.exports = {};").unwrap();
        fs::write(dir.path().join("src/styles/vars.css"), ":root {}").unwrap();
        dir
    }

    #[test]
    fn test_kinds_and_metadata() {
        let temp = project();
        let fs = RealFileSystem::new();
        let config = temp.path().join("tailwind.config.js");

        assert!(fs.is_dir(&temp.path().join("src")));
        assert!(fs.is_file(&config));
        assert!(!fs.exists(&temp.path().join("missing.css")));

        let meta = fs.metadata(&config).unwrap();
        assert_eq!(meta.file_type, FileType::File);
        assert_eq!(meta.len(), 20);
        assert!(fs.metadata(&temp.path().join("missing.css")).is_err());
    }

    #[test]
    fn test_walk_skips_excluded_dirs() {
        let temp = project();
        fs::create_dir_all(temp.path().join("node_modules/pkg")).unwrap();
        fs::write(temp.path().join("node_modules/pkg/tokens.json"), "{}").unwrap();

        let files = RealFileSystem
            .walk_files(temp.path(), &WalkLimits::default())
            .unwrap();

        assert_eq!(
            files,
            vec![
                temp.path().join("src/styles/vars.css"),
                temp.path().join("tailwind.config.js"),
            ]
        );
    }

    #[test]
    fn test_walk_respects_gitignore() {
        let temp = project();
        fs::write(temp.path().join(".gitignore"), "src/\n").unwrap();

        let files = RealFileSystem
            .walk_files(temp.path(), &WalkLimits::default())
            .unwrap();

        assert!(files.iter().all(|p| !p.ends_with("src/styles/vars.css")));
    }

    #[test]
    fn test_walk_respects_limits() {
        let temp = project();

        let shallow = RealFileSystem
            .walk_files(
                temp.path(),
                &WalkLimits {
                    max_depth: 1,
                    max_files: 100,
                },
            )
            .unwrap();
        assert_eq!(shallow, vec![temp.path().join("tailwind.config.js")]);

        let capped = RealFileSystem
            .walk_files(
                temp.path(),
                &WalkLimits {
                    max_depth: 5,
                    max_files: 1,
                },
            )
            .unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn test_walk_rejects_file_root() {
        let temp = project();
        assert!(RealFileSystem
            .walk_files(&temp.path().join("tailwind.config.js"), &WalkLimits::default())
            .is_err());
    }
}
