// tests/end_to_end.rs

#![cfg(unix)]

use std::fs;

use clap::Parser;
use devpipe::cli::CliArgs;
use devpipe_test_utils::{init_tracing, with_timeout};
use tempfile::TempDir;

fn write_project(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("devpipe.toml");
    fs::write(&path, body).unwrap();
    path.to_str().unwrap().to_string()
}

fn project_body(dir: &TempDir, fail_lib: bool) -> String {
    let root = dir.path().display();
    let lib_cmd = if fail_lib { "exit 1" } else { "echo lib >> order.txt" };
    format!(
        r#"
[settings]
jobs = 2

[component.lib]
build.command = "{lib_cmd}"
build.workdir = "{root}"

[component.app]
depends.build = "lib"
build.command = "echo app >> order.txt"
build.workdir = "{root}"

[component.docs]
build.command = "echo docs >> docs.txt"
build.workdir = "{root}"
"#
    )
}

#[tokio::test]
async fn build_runs_components_in_dependency_order() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(&dir, &project_body(&dir, false));

    let args = CliArgs::try_parse_from(["devpipe", "--config", &config, "build", "app"]).unwrap();
    with_timeout(devpipe::run(args)).await.unwrap();

    let order = fs::read_to_string(dir.path().join("order.txt")).unwrap();
    assert_eq!(order, "lib\napp\n");
    assert!(!dir.path().join("docs.txt").exists());
}

#[tokio::test]
async fn dry_run_executes_nothing() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(&dir, &project_body(&dir, false));

    let args =
        CliArgs::try_parse_from(["devpipe", "--config", &config, "build", "--dry-run"]).unwrap();
    with_timeout(devpipe::run(args)).await.unwrap();

    assert!(!dir.path().join("order.txt").exists());
    assert!(!dir.path().join("docs.txt").exists());
}

#[tokio::test]
async fn keep_going_builds_unrelated_components() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(&dir, &project_body(&dir, true));

    let args =
        CliArgs::try_parse_from(["devpipe", "--config", &config, "build", "--keep-going"]).unwrap();
    let err = with_timeout(devpipe::run(args)).await.unwrap_err();

    assert!(format!("{err:#}").contains("lib.build"));
    assert!(dir.path().join("docs.txt").exists());
    assert!(!dir.path().join("order.txt").exists(), "app must be skipped");
}

#[tokio::test]
async fn unknown_task_fails_before_running() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = write_project(&dir, &project_body(&dir, false));

    let args =
        CliArgs::try_parse_from(["devpipe", "--config", &config, "run", "--task", "deploy"]).unwrap();
    let err = with_timeout(devpipe::run(args)).await.unwrap_err();

    assert!(err.to_string().contains("deploy"));
    assert!(!dir.path().join("order.txt").exists());
}
