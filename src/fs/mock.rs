use super::{is_excluded_path, FileMetadata, FileSystem, FileType, WalkLimits};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(String),
}

impl Node {
    fn file_type(&self) -> FileType {
        match self {
            Node::Dir => FileType::Directory,
            Node::File(_) => FileType::File,
        }
    }
}

/// In-memory project tree. Relative paths are resolved against the root;
/// parent directories appear implicitly when a file is added.
pub struct MockFileSystem {
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            nodes: RwLock::new(BTreeMap::new()),
            root,
        };
        fs.add_dir(".");
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.resolve(path.as_ref());
        let mut nodes = self.nodes.write().unwrap();
        if let Some(parent) = path.parent() {
            mkdir_p(&mut nodes, parent);
        }
        nodes.insert(path, Node::File(content.to_string()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.resolve(path.as_ref());
        mkdir_p(&mut self.nodes.write().unwrap(), &path);
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        joined.components().collect()
    }

    fn node(&self, path: &Path) -> Option<Node> {
        self.nodes.read().unwrap().get(&self.resolve(path)).cloned()
    }
}

fn mkdir_p(nodes: &mut BTreeMap<PathBuf, Node>, dir: &Path) {
    for ancestor in dir.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(Node::Dir))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(Node::File(_)))
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let node = self
            .node(path)
            .ok_or_else(|| anyhow!("No such path in mock tree: {}", path.display()))?;
        let size = match &node {
            Node::File(content) => content.len() as u64,
            Node::Dir => 0,
        };
        Ok(FileMetadata {
            size,
            file_type: node.file_type(),
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.node(path) {
            Some(Node::File(content)) => Ok(content),
            Some(Node::Dir) => Err(anyhow!("Is a directory: {}", path.display())),
            None => Err(anyhow!("No such file in mock tree: {}", path.display())),
        }
    }

    fn walk_files(&self, root: &Path, limits: &WalkLimits) -> Result<Vec<PathBuf>> {
        let root = self.resolve(root);
        if !self.is_dir(&root) {
            return Err(anyhow!("Walk root is not a directory: {}", root.display()));
        }

        let nodes = self.nodes.read().unwrap();
        Ok(nodes
            .iter()
            .filter(|(_, node)| matches!(node, Node::File(_)))
            .filter_map(|(path, _)| {
                let rel = path.strip_prefix(&root).ok()?;
                let depth = rel.components().count();
                (depth <= limits.max_depth && !is_excluded_path(rel)).then(|| path.clone())
            })
            .take(limits.max_files)
            .collect())
    }
}
