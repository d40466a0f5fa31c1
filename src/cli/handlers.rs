//! Subcommand handlers; each returns the process exit code

use super::commands::{DetectArgs, ExtractArgs, OutputFormatArg};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::TokenscoutConfig;
use crate::pipeline::TokenPipeline;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

fn resolve_project_path(path: Option<&PathBuf>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    if !path.is_dir() {
        anyhow::bail!("Project path is not a directory: {}", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))
}

fn load_config() -> Result<TokenscoutConfig> {
    let config = TokenscoutConfig::default();
    config.validate()?;
    Ok(config)
}

fn prepare(path: Option<&PathBuf>) -> Result<(PathBuf, TokenscoutConfig)> {
    let root = resolve_project_path(path)?;
    let config = load_config()?;
    debug!(root = %root.display(), ?config, "Resolved project");
    Ok((root, config))
}

pub async fn handle_detect(args: &DetectArgs, quiet: bool) -> i32 {
    let (root, config) = match prepare(args.project_path.as_ref()) {
        Ok(prepared) => prepared,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    let mut pipeline = TokenPipeline::new(&root, config).without_log_file();
    if let Some(file) = &args.config {
        pipeline = pipeline.with_override_file(file.clone());
    }

    let sources = pipeline.detect().await;
    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_sources(&sources) {
        Ok(out) => {
            print!("{}", out);
            if !quiet && args.format == OutputFormatArg::Human {
                println!();
                pipeline.logger().print_summary();
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

pub async fn handle_extract(args: &ExtractArgs, quiet: bool) -> i32 {
    let (root, mut config) = match prepare(args.project_path.as_ref()) {
        Ok(prepared) => prepared,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir.clone());
    }

    let mut pipeline = TokenPipeline::new(&root, config);
    if args.no_log {
        pipeline = pipeline.without_log_file();
    }
    if let Some(file) = &args.config {
        pipeline = pipeline.with_override_file(file.clone());
    }
    let logger = pipeline.logger().clone();

    let output = pipeline.run().await;

    let rendered = match OutputFormatter::new(OutputFormat::Json).format_tree(&output.tokens) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    if let Err(e) = emit(&rendered, args.output.as_deref()) {
        eprintln!("Error: {:#}", e);
        return 1;
    }

    if !quiet {
        eprint!("{}", logger.render_summary());
        if let Some(path) = &output.log_path {
            info!(path = %path.display(), "Detection log written");
        }
    }
    0
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Token tree written");
            Ok(())
        }
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_missing_path() {
        let missing = PathBuf::from("/definitely/not/a/project");
        assert!(resolve_project_path(Some(&missing)).is_err());
    }

    #[test]
    fn test_resolve_file_is_not_a_project() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tokens.json");
        fs::write(&file, "{}").unwrap();
        assert!(resolve_project_path(Some(&file)).is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_detect_invalid_path_exit_code() {
        let args = DetectArgs {
            project_path: Some(PathBuf::from("/definitely/not/a/project")),
            config: None,
            format: OutputFormatArg::Json,
        };
        assert_eq!(handle_detect(&args, true).await, 1);
    }

    #[tokio::test]
    #[serial]
    async fn test_extract_writes_output_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("theme.css"),
            ":root { --color-brand: #ff0000; --color-muted: #999999; --spacing-md: 16px; \
             --spacing-lg: 24px; --radius-sm: 2px; --shadow-md: 0 1px 2px #0003; }",
        )
        .unwrap();
        let out = temp.path().join("tokens.json");
        let args = ExtractArgs {
            project_path: Some(temp.path().to_path_buf()),
            config: None,
            output_dir: None,
            output: Some(out.clone()),
            no_log: true,
        };

        assert_eq!(handle_extract(&args, true).await, 0);

        let tree: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(tree["colors"]["css-variables-color-brand"]["value"], "#ff0000");
        assert_eq!(tree["meta"]["totalTokens"], 6);
        assert!(!temp.path().join(".tokenscout").exists());
    }
}
