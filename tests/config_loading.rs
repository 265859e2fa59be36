// tests/config_loading.rs

use std::io::Write;

use devpipe::config::{RawProjectFile, default_config_path, load_and_validate, load_from_path};
use devpipe::dag::resolve_deep;
use devpipe::errors::PipelineError;
use devpipe::project::Project;
use devpipe::types::ResolveStrategy;
use tempfile::NamedTempFile;

fn project_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn loads_settings_and_components() {
    let file = project_file(
        r#"
[settings]
dependencies = "reverse"
keep_going = true
jobs = 3

[component.foo]
build.command = "make -j4"

[component.bar]
depends.build = ["foo"]
checkout.command = ["git init", "git pull"]
"#,
    );

    let loaded = load_and_validate(file.path()).unwrap();

    assert_eq!(loaded.settings.dependencies, ResolveStrategy::Reverse);
    assert!(loaded.settings.keep_going);
    assert_eq!(loaded.settings.jobs, 3);
    assert_eq!(loaded.project.component_names(), vec!["bar", "foo"]);

    let foo = loaded.project.component("foo").unwrap();
    assert_eq!(foo.get_value("build.command"), &["make -j4".to_string()]);

    let bar = loaded.project.component("bar").unwrap();
    assert_eq!(bar.dependencies("build"), vec!["foo"]);
    assert_eq!(
        bar.get_value("checkout.command"),
        &["git init".to_string(), "git pull".to_string()]
    );
}

#[test]
fn missing_sections_use_defaults() {
    let file = project_file("");

    let loaded = load_and_validate(file.path()).unwrap();

    assert_eq!(loaded.settings.dependencies, ResolveStrategy::Deep);
    assert!(!loaded.settings.keep_going);
    assert_eq!(loaded.settings.jobs, 0);
    assert!(loaded.project.is_empty());
}

#[test]
fn scalar_values_are_stringified() {
    let file = project_file(
        r#"
[component.foo]
build.jobs = 8
build.verbose = true
"#,
    );

    let loaded = load_and_validate(file.path()).unwrap();
    let foo = loaded.project.component("foo").unwrap();

    assert_eq!(foo.get_value("build.jobs"), &["8".to_string()]);
    assert_eq!(foo.get_value("build.verbose"), &["true".to_string()]);
}

#[test]
fn comma_separated_string_dependencies() {
    let file = project_file(
        r#"
[component.alpha]
[component.beta]
[component.gamma]
depends.build = "alpha, beta"
"#,
    );

    let loaded = load_and_validate(file.path()).unwrap();
    let resolver = resolve_deep(&loaded.project, &["gamma"], &["build"]).unwrap();

    assert_eq!(
        resolver.plan(),
        vec![
            vec!["alpha.build".to_string(), "beta.build".to_string()],
            vec!["gamma.build".to_string()],
        ]
    );
}

#[test]
fn invalid_component_name_is_rejected() {
    let file = project_file(
        r#"
[component."9lives"]
build.command = "true"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();

    assert!(matches!(err, PipelineError::InvalidComponentName(name) if name == "9lives"));
}

#[test]
fn reserved_key_prefix_is_rejected() {
    let file = project_file(
        r#"
[component.foo]
devpipe.internal = "x"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();

    assert!(matches!(err, PipelineError::InvalidKeyName(key) if key == "devpipe.internal"));
}

#[test]
fn invalid_key_name_is_rejected() {
    let file = project_file(
        r#"
[component.foo]
Build = "x"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();

    assert!(matches!(err, PipelineError::InvalidKeyName(_)));
}

#[test]
fn nested_arrays_are_rejected() {
    let file = project_file(
        r#"
[component.foo]
build.command = [["make"]]
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();

    match err {
        PipelineError::ConfigError(msg) => {
            assert!(msg.contains("foo"));
            assert!(msg.contains("build.command"));
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn unknown_strategy_is_a_toml_error() {
    let file = project_file(
        r#"
[settings]
dependencies = "sideways"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();

    assert!(matches!(err, PipelineError::TomlError(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = load_from_path(dir.path().join("nope.toml")).unwrap_err();

    assert!(matches!(err, PipelineError::IoError(_)));
}

#[test]
fn raw_file_keeps_nested_tables() {
    let file = project_file(
        r#"
[component.foo]
depends.build = ["bar"]
"#,
    );

    let raw: RawProjectFile = load_from_path(file.path()).unwrap();

    assert!(raw.component["foo"]["depends"].is_table());
}

#[test]
fn default_path_is_devpipe_toml() {
    assert_eq!(default_config_path(), std::path::PathBuf::from("devpipe.toml"));
}
