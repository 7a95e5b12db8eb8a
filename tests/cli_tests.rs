mod common;

use common::*;
use std::process::Command;

fn cli_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jobflow"))
}

#[test]
fn test_cli_help() {
    let output = cli_command().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Run conditional job pipelines"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("validate"));
    assert!(stdout.contains("graph"));
}

#[test]
fn test_cli_version() {
    let output = cli_command().arg("--version").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("jobflow"));
}

#[test]
fn test_cli_run_help() {
    let output = cli_command().args(["run", "--help"]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Run a pipeline file"));
    assert!(stdout.contains("--json"));
}

#[test]
fn test_cli_run_success() {
    let dir = create_test_dir();
    let path = write_pipeline(dir.path(), "etl.yaml", &etl_pipeline("echo extracted"));

    let output = cli_command().arg("run").arg(&path).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Running pipeline: etl"));
    assert!(stdout.contains("Success: YES"));
    assert!(stdout.contains("✓ Job: extract [COMPLETED]"));
    assert!(stdout.contains("✓ Job: load [COMPLETED]"));
    assert!(!stdout.contains("alert"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Pipeline 'etl' started"));
    assert!(stderr.contains("Job 'extract' finished"));
    assert!(stderr.contains("Job 'load' finished"));
}

#[test]
fn test_cli_run_failing_final_job() {
    let dir = create_test_dir();
    let path = write_pipeline(dir.path(), "fail.yaml", &single_job_pipeline("fail", "exit 4"));

    let output = cli_command().arg("run").arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Success: NO"));
    assert!(stdout.contains("✗ Job: only [FAILED]"));
    assert!(stdout.contains("Command exited with code 4"));
}

#[test]
fn test_cli_run_cycle_reports_stop() {
    let dir = create_test_dir();
    let path = write_pipeline(dir.path(), "loop.yaml", &looping_pipeline());

    let output = cli_command().arg("run").arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Stopped: job 'ping' would have run twice"));
}

#[test]
fn test_cli_run_json() {
    let dir = create_test_dir();
    let path = write_pipeline(dir.path(), "etl.yaml", &etl_pipeline("exit 1"));

    let output = cli_command()
        .args(["run", "--json"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["pipeline"], "etl");
    assert_eq!(report["termination"]["reason"], "exhausted");

    let reports = report["reports"].as_object().unwrap();
    let mut names: Vec<_> = reports.values().map(|r| r["job_name"].as_str().unwrap()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["alert", "extract"]);

    let extract = reports.values().find(|r| r["job_name"] == "extract").unwrap();
    assert_eq!(extract["status"], "FAILED");
}

#[test]
fn test_cli_run_missing_file() {
    let output = cli_command()
        .args(["run", "/nonexistent/pipeline.yaml"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Pipeline file not found"));
}

#[test]
fn test_cli_validate() {
    let dir = create_test_dir();
    let path = write_pipeline(dir.path(), "etl.yaml", &etl_pipeline("echo ok"));

    let output = cli_command().arg("validate").arg(&path).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("is valid: 3 jobs, 2 transitions"));
}

#[test]
fn test_cli_validate_unknown_target() {
    let dir = create_test_dir();
    let path = write_pipeline(
        dir.path(),
        "broken.yaml",
        r#"
name: broken
jobs:
  a:
    command: "true"
    on:
      - when: completed
        then: nowhere
"#,
    );

    let output = cli_command().arg("validate").arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("undefined job 'nowhere'"));
}

#[test]
fn test_cli_graph() {
    let dir = create_test_dir();
    let path = write_pipeline(dir.path(), "etl.yaml", &etl_pipeline("echo ok"));

    let output = cli_command().arg("graph").arg(&path).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("etl (start: extract)"));
    assert!(stdout.contains("    completed -> load"));
    assert!(stdout.contains("    failed -> alert"));
}
