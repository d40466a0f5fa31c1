//! Full runs: detection, overrides, extraction and the persisted audit log

mod support;

use serde_json::{json, Value};
use std::fs;
use support::{css_with_properties, runtime_returning, Project};
use tokenscout::audit::LOG_FILE_NAME;
use tokenscout::evaluator::MockRuntime;
use tokenscout::Ecosystem;

fn design_system(project: &Project) {
    project.package_json("", &["tailwindcss"]);
    project.file("tailwind.config.js", "module.exports = require('./preset');");
    project.file("src/styles/vars.css", &css_with_properties(6));
    project.file("legacy/old.css", &css_with_properties(7));
    project.file(
        "tokenscout.config.json",
        r#"{"tokens": {"exclude": [{"path": "legacy/**"}]}}"#,
    );
}

#[tokio::test]
async fn test_full_run_writes_audit_log() {
    let project = Project::new();
    design_system(&project);
    let runtime = runtime_returning(vec![json!({
        "theme": {
            "colors": {"brand": {"DEFAULT": "#0055ff", "dark": "#0033aa"}},
            "extend": {"spacing": {"18": "4.5rem"}}
        }
    })]);

    let output = project.pipeline(runtime).run().await;

    let ecosystems: Vec<_> = output.sources.iter().map(|s| s.ecosystem).collect();
    assert_eq!(ecosystems, vec![Ecosystem::Tailwind, Ecosystem::CssVariables]);
    assert_eq!(output.tokens.colors["tailwind-brand"].value.to_string(), "#0055ff");
    assert!(output.tokens.colors.contains_key("tailwind-brand-dark"));
    assert!(output.tokens.spacing.contains_key("tailwind-18"));
    assert_eq!(output.tokens.meta.total_tokens, 3 + 6);
    assert_eq!(output.summary.total_tokens, output.tokens.meta.total_tokens);
    assert_eq!(output.summary.extraction_success_rate, 1.0);

    let log_path = output.log_path.clone().unwrap();
    assert_eq!(log_path, project.root().join(".tokenscout").join(LOG_FILE_NAME));

    let log: Value = serde_json::from_str(&fs::read_to_string(&log_path).unwrap()).unwrap();
    assert_eq!(log["detectedSources"].as_array().unwrap().len(), 2);
    assert_eq!(log["detectionCounts"]["beforeOverrides"], 3);
    assert_eq!(log["detectionCounts"]["afterOverrides"], 2);
    assert_eq!(log["extractionResults"].as_array().unwrap().len(), 2);
    assert_eq!(log["overrides"][0]["kind"], "exclude");
    assert!(log["configFile"]
        .as_str()
        .unwrap()
        .ends_with("tokenscout.config.json"));
    let phases: Vec<_> = log["performance"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["phase"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(phases, vec!["detection", "extraction"]);
    assert_eq!(log["summary"]["sourcesByType"]["tailwind"], 1);
}

#[tokio::test]
async fn test_output_serializes_camel_case() {
    let project = Project::new();
    project.file("vars.css", &css_with_properties(6));

    let output = project.pipeline(MockRuntime::new()).without_log_file().run().await;

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["sources"][0]["type"], "css-variables");
    assert_eq!(json["tokens"]["meta"]["totalTokens"], 6);
    assert!(json.get("logPath").is_none());
    assert_eq!(json["summary"]["totalSources"], 1);
}

#[tokio::test]
async fn test_unwritable_log_dir_is_reported_not_fatal() {
    let project = Project::new();
    project.file("vars.css", &css_with_properties(6));
    // A file where the log directory should be
    let blocker = project.file("blocked", "");
    let config = project.config().with_output_dir(blocker.join("nested"));

    let pipeline = tokenscout::TokenPipeline::new(project.root(), config)
        .with_evaluator(support::offline_evaluator(project.root(), MockRuntime::new()));
    let logger = pipeline.logger().clone();
    let output = pipeline.run().await;

    assert!(output.log_path.is_none());
    assert_eq!(output.tokens.meta.total_tokens, 6);
    let issues = logger.snapshot().issues;
    assert!(issues
        .iter()
        .any(|i| i.message.starts_with("Failed to write detection log")));
}
