#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jobflow::{FnJob, JobError, JobHandle, JobReport, JobStatus};
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_pipeline(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).expect("Failed to write pipeline file");
    path
}

/// A job that returns a fixed status and counts its invocations
pub struct StubJob {
    pub handle: JobHandle,
    pub calls: Arc<AtomicUsize>,
}

impl StubJob {
    pub fn new(name: &'static str, status: JobStatus) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = JobHandle::new(FnJob::new(name, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(JobReport::new(name, status.clone()).with_output("job", name))
        }));
        Self { handle, calls }
    }

    pub fn completed(name: &'static str) -> Self {
        Self::new(name, JobStatus::Completed)
    }

    pub fn failed(name: &'static str) -> Self {
        Self::new(name, JobStatus::Failed)
    }

    /// A job whose invocation raises instead of reporting
    pub fn raising(name: &'static str, message: &'static str) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = JobHandle::new(FnJob::new(name, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(JobError::Failed(message.to_string()))
        }));
        Self { handle, calls }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn etl_pipeline(extract_command: &str) -> String {
    format!(
        r#"
name: etl
start: extract
jobs:
  extract:
    command: "{}"
    on:
      - when: completed
        then: load
      - when: failed
        then: alert
  load:
    command: "echo loaded"
  alert:
    command: "echo alerted"
"#,
        extract_command
    )
}

pub fn single_job_pipeline(name: &str, command: &str) -> String {
    format!(
        r#"
name: {}
jobs:
  only:
    command: "{}"
"#,
        name, command
    )
}

pub fn looping_pipeline() -> String {
    r#"
name: loop
jobs:
  ping:
    command: "echo ping"
    on:
      - when: always
        then: pong
  pong:
    command: "echo pong"
    on:
      - when: always
        then: ping
"#
    .to_string()
}
