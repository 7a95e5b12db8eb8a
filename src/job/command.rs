//! Shell command jobs
//!
//! Runs a command through a shell on the host system and reports its exit
//! status. A non-zero exit is a `FAILED` report, not an error: the command
//! ran, and the pipeline can branch on the outcome.
//!
//! Outputs:
//! - `stdout` - trimmed standard output
//! - `stderr` - trimmed standard error
//! - `exit_code` - process exit code (`-1` when killed by a signal)

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Job, JobError, JobReport, JobStatus};

const DEFAULT_SHELL: &str = "sh";

/// A job that executes a shell command
#[derive(Debug, Clone)]
pub struct CommandJob {
    name: String,
    command: String,
    shell: String,
    working_dir: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl CommandJob {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            shell: DEFAULT_SHELL.to_string(),
            working_dir: None,
            env: HashMap::new(),
        }
    }

    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs(mut self, vars: HashMap<String, String>) -> Self {
        self.env.extend(vars);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(&self.command);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.env);

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Job for CommandJob {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, cancel: &CancellationToken) -> Result<JobReport, JobError> {
        info!(job = %self.name, "Executing command: {}", self.command);
        let started_at = Utc::now();

        let child = self.build_command().spawn()?;

        // Dropping the output future drops the child, which kills it
        let output = tokio::select! {
            output = child.wait_with_output() => output?,
            _ = cancel.cancelled() => {
                warn!(job = %self.name, "Command cancelled");
                return Err(JobError::Cancelled);
            }
        };
        let ended_at = Utc::now();

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(job = %self.name, exit_code, "Command exited");

        let mut report = if output.status.success() {
            JobReport::new(&self.name, JobStatus::Completed)
        } else {
            let error = if stderr.is_empty() {
                format!("Command exited with code {}", exit_code)
            } else {
                stderr.clone()
            };
            JobReport::failed(&self.name, error)
        };

        report.outputs.insert("stdout".to_string(), stdout);
        report.outputs.insert("stderr".to_string(), stderr);
        report
            .outputs
            .insert("exit_code".to_string(), exit_code.to_string());

        Ok(report.with_timing(started_at, ended_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_command_success() {
        let job = CommandJob::new("echo", "echo hello");
        let report = job.call(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.output("stdout"), Some("hello"));
        assert_eq!(report.output("exit_code"), Some("0"));
        assert!(report.started_at.is_some());
        assert!(report.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_command_nonzero_exit_is_failed_report() {
        let job = CommandJob::new("fail", "echo oops >&2; exit 3");
        let report = job.call(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.status, JobStatus::Failed);
        assert_eq!(report.output("exit_code"), Some("3"));
        assert_eq!(report.error.as_deref(), Some("oops"));
    }

    #[tokio::test]
    async fn test_command_exit_without_stderr() {
        let job = CommandJob::new("quiet", "exit 1");
        let report = job.call(&CancellationToken::new()).await.unwrap();
        assert_eq!(report.error.as_deref(), Some("Command exited with code 1"));
    }

    #[tokio::test]
    async fn test_command_with_working_dir() {
        let job = CommandJob::new("pwd", "pwd").working_dir("/tmp");
        let report = job.call(&CancellationToken::new()).await.unwrap();

        // On macOS /tmp is a symlink to /private/tmp
        let stdout = report.output("stdout").unwrap();
        assert!(stdout == "/tmp" || stdout == "/private/tmp");
    }

    #[tokio::test]
    async fn test_command_with_env() {
        let job = CommandJob::new("env", "echo $GREETING").env("GREETING", "hi");
        let report = job.call(&CancellationToken::new()).await.unwrap();
        assert_eq!(report.output("stdout"), Some("hi"));
    }

    #[tokio::test]
    async fn test_command_missing_shell_is_error() {
        let job = CommandJob::new("noshell", "true").shell("/nonexistent/shell");
        let err = job.call(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, JobError::Io(_)));
    }

    #[tokio::test]
    async fn test_command_cancelled() {
        let job = CommandJob::new("sleep", "sleep 30");
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), job.call(&cancel))
            .await
            .expect("cancellation should stop the command");
        assert!(matches!(result, Err(JobError::Cancelled)));
    }
}
