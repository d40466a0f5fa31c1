use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranspilerKind {
    Esbuild,
    Tsc,
}

/// A located TypeScript-to-CommonJS compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpiler {
    pub kind: TranspilerKind,
    pub program: PathBuf,
}

impl Transpiler {
    /// Prefers a project-local esbuild, then esbuild on PATH, then tsc
    /// (project-local before PATH).
    pub fn discover(project_root: &Path) -> Option<Self> {
        let local_bin = project_root.join("node_modules").join(".bin");
        let candidates = [
            (TranspilerKind::Esbuild, "esbuild"),
            (TranspilerKind::Tsc, "tsc"),
        ];

        for (kind, name) in candidates {
            let local = local_bin.join(name);
            if local.is_file() {
                return Some(Self {
                    kind,
                    program: local,
                });
            }
            if let Some(found) = find_on_path(name) {
                return Some(Self {
                    kind,
                    program: found,
                });
            }
        }
        None
    }

    /// Compiles `source` to CommonJS text
    pub async fn transpile(&self, source: &Path) -> Result<String, String> {
        match self.kind {
            TranspilerKind::Esbuild => self.run_esbuild(source).await,
            TranspilerKind::Tsc => self.run_tsc(source).await,
        }
    }

    async fn run_esbuild(&self, source: &Path) -> Result<String, String> {
        let output = Command::new(&self.program)
            .arg(source)
            .arg("--format=cjs")
            .arg("--platform=node")
            .arg("--log-level=error")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("failed to run esbuild: {}", e))?;

        if !output.status.success() {
            return Err(first_line(&output.stderr, "esbuild failed"));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_tsc(&self, source: &Path) -> Result<String, String> {
        let out_dir = env::temp_dir().join(format!("tokenscout-tsc-{}", Uuid::new_v4()));
        let _cleanup = ScratchDir(out_dir.clone());

        let output = Command::new(&self.program)
            .arg(source)
            .args(["--module", "commonjs", "--target", "es2019"])
            .args(["--esModuleInterop", "--skipLibCheck"])
            .arg("--outDir")
            .arg(&out_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("failed to run tsc: {}", e))?;

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let emitted = out_dir.join(format!("{}.js", stem));

        // tsc exits non-zero on type errors but still emits
        match fs::read_to_string(&emitted) {
            Ok(js) => Ok(js),
            Err(_) if !output.status.success() => Err(first_line(&output.stdout, "tsc failed")),
            Err(e) => Err(format!("tsc produced no output: {}", e)),
        }
    }
}

fn first_line(bytes: &[u8], fallback: &str) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Transpiled output written beside the original so relative requires resolve.
/// The file is removed when the guard drops.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn create(original: &Path, contents: &str) -> std::io::Result<Self> {
        let path = scratch_path(original);
        fs::write(&path, contents)?;
        debug!(path = %path.display(), "Wrote transpiled scratch module");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove scratch module");
        }
    }
}

struct ScratchDir(PathBuf);

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// `.<stem>.tokenscout-<uuid>.cjs` next to `original`
pub fn scratch_path(original: &Path) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".to_string());
    let name = format!(".{}.tokenscout-{}.cjs", stem, Uuid::new_v4());
    match original.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
