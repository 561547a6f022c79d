// tests/config_loading.rs

mod common;
use crate::common::init_tracing;

use std::fs;
use std::path::Path;

use livebuild::config::{load_and_validate, BuildConfiguration, BuildTarget, ConfigSource};
use livebuild::errors::{LivebuildError, Reported};
use livebuild_test_utils::{RecordingReporter, Sink};

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("livebuild.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn static_targets_with_defaults() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[[target]]
[target.output]
path = "dist"

[[target]]
context = "client"
[target.output]
path = "public"
filename = "app.[hash].js"
"#,
    );

    let cfg = load_and_validate(&path, dir.path()).unwrap();

    assert_eq!(cfg.engine.command, "npx webpack --json");
    assert_eq!(cfg.engine.watch, vec!["**/*".to_string()]);
    assert_eq!(cfg.engine.debounce_ms, 100);
    assert_eq!(cfg.run.runtime, "node");
    assert_eq!(cfg.run.inline_flag, "-e");

    assert_eq!(cfg.build.len(), 2);
    assert_eq!(cfg.build.first(), Some(&BuildTarget::new("", "dist")));
    assert_eq!(cfg.build.targets()[1].context, "client");
    assert_eq!(cfg.build.targets()[1].output.filename, "app.[hash].js");
}

#[cfg(unix)]
#[test]
fn targets_from_command_runs_in_config_dir() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("targets.json"),
        r#"[{"entry": "./src/index.js", "output": {"path": "/srv/out"}}]"#,
    )
    .unwrap();
    let path = write_config(
        dir.path(),
        r#"
targets_from = "cat targets.json"

[engine]
command = "./build.sh"
debounce_ms = 250

[run]
runtime = "deno"
inline_flag = "eval"
"#,
    );

    let cfg = load_and_validate(&path, dir.path()).unwrap();

    assert_eq!(cfg.engine.command, "./build.sh");
    assert_eq!(cfg.engine.debounce_ms, 250);
    assert_eq!(cfg.run.runtime, "deno");
    assert_eq!(cfg.build.len(), 1);
    assert_eq!(cfg.build.targets()[0].output.path, "/srv/out");
    assert_eq!(cfg.build.targets()[0].output.filename, "[name].js");
}

#[cfg(unix)]
#[test]
fn targets_from_accepts_a_single_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"targets_from = "echo '{\"output\": {\"path\": \"dist\"}}'""#,
    );

    let cfg = load_and_validate(&path, dir.path()).unwrap();

    assert_eq!(cfg.build.targets(), &[BuildTarget::new("", "dist")]);
}

#[cfg(unix)]
#[test]
fn failing_targets_from_command_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), r#"targets_from = "echo nope >&2; exit 1""#);

    let err = load_and_validate(&path, dir.path()).unwrap_err();

    match err {
        LivebuildError::ConfigError(msg) => {
            assert!(msg.starts_with("configuration factory failed"), "{msg}");
            assert!(msg.contains("nope"), "{msg}");
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn targets_from_printing_no_targets_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), r#"targets_from = "echo '[]'""#);

    let err = load_and_validate(&path, dir.path()).unwrap_err();
    assert!(matches!(err, LivebuildError::ConfigError(_)));
}

#[test]
fn factory_source_is_evaluated_once_and_validated() {
    let source = ConfigSource::Factory(Box::new(|| -> anyhow::Result<BuildConfiguration> {
        Ok(BuildConfiguration::single(BuildTarget::new("", "")))
    }));

    let err = source.resolve().unwrap_err();
    assert!(err.to_string().contains("output.path"));
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
mode = "development"

[[target]]
[target.output]
path = "dist"
"#,
    );

    let err = load_and_validate(&path, dir.path()).unwrap_err();
    assert!(matches!(err, LivebuildError::TomlError(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_and_validate(dir.path().join("nope.toml"), dir.path()).unwrap_err();
    assert!(matches!(err, LivebuildError::IoError(_)));
}

#[test]
fn load_failure_is_shown_on_the_error_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[engine]\ncommand = \"\"\n[[target]]\n[target.output]\npath = \"dist\"\n");
    let reporter = RecordingReporter::new();

    let err = livebuild::load_config(&path, dir.path(), &reporter).unwrap_err();

    assert!(err.downcast_ref::<Reported>().is_some());
    let errors = reporter.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("[engine].command must not be empty"), "{}", errors[0]);
    assert_eq!(reporter.texts(Sink::Info), vec!["Loading build options ...".to_string()]);
}

#[test]
fn successful_load_reports_no_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[[target]]\n[target.output]\npath = \"dist\"\n");
    let reporter = RecordingReporter::new();

    let cfg = livebuild::load_config(&path, dir.path(), &reporter).unwrap();

    assert_eq!(cfg.build.len(), 1);
    assert!(reporter.errors().is_empty());
}
