//! Shared fixtures for integration tests: throwaway projects on disk and an
//! evaluator that never spawns a JavaScript runtime.

#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokenscout::evaluator::{EvaluatorConfig, MockRuntime, ModuleOutput};
use tokenscout::fs::RealFileSystem;
use tokenscout::{ConfigEvaluator, DetectionLogger, TokenDetector, TokenPipeline, TokenscoutConfig};

pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn package_json(&self, rel_dir: &str, deps: &[&str]) -> PathBuf {
        let deps: serde_json::Map<String, Value> = deps
            .iter()
            .map(|d| (d.to_string(), Value::String("^1.0.0".to_string())))
            .collect();
        let manifest = serde_json::json!({ "name": "fixture", "dependencies": deps });
        let rel = if rel_dir.is_empty() {
            "package.json".to_string()
        } else {
            format!("{}/package.json", rel_dir)
        };
        self.file(&rel, &manifest.to_string())
    }

    /// Config with the log directory kept inside the project
    pub fn config(&self) -> TokenscoutConfig {
        TokenscoutConfig::default().with_output_dir(self.root().join(".tokenscout"))
    }

    pub fn detector(&self) -> TokenDetector {
        TokenDetector::new(
            Arc::new(RealFileSystem),
            self.root(),
            &self.config(),
            DetectionLogger::disabled(self.root()),
        )
    }

    pub fn pipeline(&self, runtime: MockRuntime) -> TokenPipeline {
        TokenPipeline::new(self.root(), self.config()).with_evaluator(offline_evaluator(self.root(), runtime))
    }
}

pub fn offline_evaluator(root: &Path, runtime: MockRuntime) -> ConfigEvaluator {
    ConfigEvaluator::new(EvaluatorConfig::default(), root)
        .with_runtime(Arc::new(runtime))
        .with_transpiler(None)
}

/// Runtime that answers the next evaluations with `values`, in order
pub fn runtime_returning(values: Vec<Value>) -> MockRuntime {
    let runtime = MockRuntime::new();
    for value in values {
        runtime.add_response(Ok(ModuleOutput::Value(value)));
    }
    runtime
}

/// A stylesheet declaring `count` color custom properties
pub fn css_with_properties(count: usize) -> String {
    let decls: Vec<String> = (0..count)
        .map(|i| format!("  --color-{}: #{:06x};", i, i * 0x111111))
        .collect();
    format!(":root {{\n{}\n}}\n", decls.join("\n"))
}
