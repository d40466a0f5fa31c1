//! Extraction and merging across ecosystems

mod support;

use serde_json::json;
use std::sync::Arc;
use support::{offline_evaluator, runtime_returning, Project};
use tokenscout::evaluator::MockRuntime;
use tokenscout::fs::RealFileSystem;
use tokenscout::{DetectionLogger, Ecosystem, TokenSource, UniversalTokenExtractor};

fn extractor(project: &Project, runtime: MockRuntime) -> UniversalTokenExtractor {
    extractor_with_logger(project, runtime, DetectionLogger::disabled(project.root()))
}

fn extractor_with_logger(
    project: &Project,
    runtime: MockRuntime,
    logger: DetectionLogger,
) -> UniversalTokenExtractor {
    UniversalTokenExtractor::new(
        Arc::new(RealFileSystem),
        project.root(),
        &project.config(),
        logger,
    )
    .with_evaluator(offline_evaluator(project.root(), runtime))
}

#[tokio::test]
async fn test_every_ecosystem_lands_under_its_own_prefix() {
    let project = Project::new();
    let tailwind = project.file("tailwind.config.js", "module.exports = {};");
    let mui = project.file("src/theme.js", "export default createTheme({});");
    let css = project.file("vars.css", ":root { --primary: #101010; --space-2: 8px; }");
    let figma = project.file(
        "figma-tokens.json",
        r##"{"global": {"primary": {"value": "#202020", "type": "color"}}}"##,
    );
    let runtime = runtime_returning(vec![
        json!({"theme": {"colors": {"primary": "#303030"}, "spacing": {"2": "0.5rem"}}}),
        json!({"palette": {"primary": "#404040"}, "spacing": 8}),
    ]);

    let tree = extractor(&project, runtime)
        .extract_all(&[
            TokenSource::new(Ecosystem::Tailwind, &tailwind, 0.95, "tw"),
            TokenSource::new(Ecosystem::Mui, &mui, 0.9, "mui"),
            TokenSource::new(Ecosystem::CssVariables, &css, 0.3, "css"),
            TokenSource::new(Ecosystem::FigmaTokens, &figma, 0.85, "figma"),
        ])
        .await;

    let primaries: Vec<_> = tree
        .colors
        .keys()
        .filter(|k| k.ends_with("primary"))
        .cloned()
        .collect();
    assert_eq!(
        primaries,
        vec![
            "css-variables-primary",
            "figma-tokens-global-primary",
            "mui-primary",
            "tailwind-primary",
        ]
    );
    assert_eq!(tree.spacing["tailwind-2"].value.to_string(), "0.5rem");
    assert_eq!(tree.spacing["mui-base"].value.to_string(), "8");
    assert_eq!(tree.spacing["css-variables-space-2"].value.to_string(), "8px");
    assert_eq!(tree.meta.total_tokens, tree.total_tokens());
    assert!(tree.meta.sources.iter().all(|s| s.error.is_none()));
}

#[tokio::test]
async fn test_same_ecosystem_collision_keeps_first_source() {
    let project = Project::new();
    let main = project.file("main.css", ":root { --color-brand: #111111; }");
    let legacy = project.file("legacy.css", ":root { --color-brand: #999999; --color-old: #888888; }");

    let tree = extractor(&project, MockRuntime::new())
        .extract_all(&[
            TokenSource::new(Ecosystem::CssVariables, &main, 0.6, "main"),
            TokenSource::new(Ecosystem::CssVariables, &legacy, 0.4, "legacy"),
        ])
        .await;

    let brand = &tree.colors["css-variables-color-brand"];
    assert_eq!(brand.value.to_string(), "#111111");
    assert_eq!(brand.path, main);
    assert_eq!(tree.meta.sources[1].token_count, 1);
}

#[tokio::test]
async fn test_unparseable_module_never_errors() {
    let project = Project::new();
    let broken = project.file("tailwind.config.js", "module.exports = {{{ nope");
    let logger = DetectionLogger::disabled(project.root());

    let tree = extractor_with_logger(&project, MockRuntime::new(), logger.clone())
        .extract_all(&[TokenSource::new(Ecosystem::Tailwind, &broken, 0.95, "tw")])
        .await;

    assert!(tree.is_empty());
    assert!(tree.meta.sources[0].error.is_none());
    let log = logger.snapshot();
    assert!(log.extraction_results[0].success);
    assert_eq!(log.extraction_results[0].method.as_deref(), Some("static"));
    assert!(!log.issues.is_empty());
}

#[tokio::test]
async fn test_failed_source_does_not_stop_the_rest() {
    let project = Project::new();
    let css = project.file("vars.css", ":root { --color-ok: #00ff00; }");
    let logger = DetectionLogger::disabled(project.root());

    let tree = extractor_with_logger(&project, MockRuntime::new(), logger.clone())
        .extract_all(&[
            TokenSource::new(Ecosystem::Chakra, project.root().join("gone.js"), 0.9, "gone"),
            TokenSource::new(Ecosystem::CssVariables, &css, 0.3, "css"),
        ])
        .await;

    assert!(tree.meta.sources[0].error.is_some());
    assert_eq!(tree.meta.sources[1].token_count, 1);
    assert_eq!(tree.meta.total_tokens, 1);

    let summary = logger.summary();
    assert_eq!(summary.extraction_success_rate, 0.5);
}

#[tokio::test]
async fn test_style_dictionary_config_without_matches_fails() {
    let project = Project::new();
    let config = project.file("config.json", r#"{"source": ["tokens/**/*.json"]}"#);

    let tree = extractor(&project, MockRuntime::new())
        .extract_all(&[TokenSource::new(Ecosystem::StyleDictionary, &config, 0.9, "sd")])
        .await;

    let error = tree.meta.sources[0].error.as_deref().unwrap();
    assert!(error.contains("No token files match"));
}
