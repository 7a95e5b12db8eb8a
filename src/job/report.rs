//! Job status and report types

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status of a job invocation
///
/// The set is open: statuses a job invents are carried as `Custom`.
/// Statuses compare by name without regard to ASCII case, so
/// `Custom("COMPLETED")` equals `Completed` and `Custom("partial")` equals
/// `Custom("PARTIAL")`.
#[derive(Debug, Clone)]
pub enum JobStatus {
    Starting,
    Started,
    Stopping,
    Aborted,
    Failed,
    Completed,
    Custom(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Starting => "STARTING",
            JobStatus::Started => "STARTED",
            JobStatus::Stopping => "STOPPING",
            JobStatus::Aborted => "ABORTED",
            JobStatus::Failed => "FAILED",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Custom(s) => s,
        }
    }

    /// Parse a status name case-insensitively; unknown names become `Custom`
    /// with their original spelling
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "STARTING" => JobStatus::Starting,
            "STARTED" => JobStatus::Started,
            "STOPPING" => JobStatus::Stopping,
            "ABORTED" => JobStatus::Aborted,
            "FAILED" => JobStatus::Failed,
            "COMPLETED" => JobStatus::Completed,
            _ => JobStatus::Custom(name.trim().to_string()),
        }
    }

    /// Status named by a job; built-in names map to their variant
    pub fn custom(name: impl AsRef<str>) -> Self {
        Self::from_name(name.as_ref())
    }

    pub fn is_completed(&self) -> bool {
        *self == JobStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        *self == JobStatus::Failed
    }
}

impl PartialEq for JobStatus {
    fn eq(&self, other: &Self) -> bool {
        self.as_str().trim().eq_ignore_ascii_case(other.as_str().trim())
    }
}

impl Eq for JobStatus {}

impl Hash for JobStatus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.as_str().trim().bytes() {
            state.write_u8(byte.to_ascii_uppercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobStatus::from_name(s))
    }
}

impl Serialize for JobStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::from_name(&raw))
    }
}

/// Outcome of one job invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub job_name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub outputs: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl JobReport {
    pub fn new(job_name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_name: job_name.into(),
            status,
            outputs: HashMap::new(),
            error: None,
            started_at: None,
            ended_at: None,
        }
    }

    /// Report for a job that ran to completion
    pub fn completed(job_name: impl Into<String>) -> Self {
        Self::new(job_name, JobStatus::Completed)
    }

    /// Report for a job that ran but did not succeed
    pub fn failed(job_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(job_name, JobStatus::Failed)
        }
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub fn with_timing(mut self, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self.ended_at = Some(ended_at);
        self
    }

    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(String::as_str)
    }

    /// Wall-clock duration, when the job recorded its timing
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_known() {
        assert_eq!("COMPLETED".parse::<JobStatus>().unwrap(), JobStatus::Completed);
        assert_eq!("failed".parse::<JobStatus>().unwrap(), JobStatus::Failed);
        assert_eq!(" Aborted ".parse::<JobStatus>().unwrap(), JobStatus::Aborted);
    }

    #[test]
    fn test_status_parse_unknown_is_custom() {
        let status: JobStatus = "PARTIAL".parse().unwrap();
        assert_eq!(status, JobStatus::Custom("PARTIAL".to_string()));
        assert_eq!(status.to_string(), "PARTIAL");
        assert!(!status.is_completed());
        assert!(!status.is_failed());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&JobStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");

        let status: JobStatus = serde_json::from_str("\"SKIPPED\"").unwrap();
        assert_eq!(status, JobStatus::Custom("SKIPPED".to_string()));
    }

    #[test]
    fn test_custom_builtin_name_is_builtin() {
        let spelled = JobStatus::Custom("COMPLETED".to_string());
        assert_eq!(spelled, JobStatus::Completed);
        assert!(spelled.is_completed());
        assert!(matches!(JobStatus::custom("completed"), JobStatus::Completed));

        let json = serde_json::to_string(&spelled).unwrap();
        let back: JobStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spelled);
        assert!(matches!(back, JobStatus::Completed));
    }

    #[test]
    fn test_custom_names_ignore_case() {
        let lower = JobStatus::custom("partial");
        assert_eq!(lower, JobStatus::Custom("PARTIAL".to_string()));
        assert_eq!(lower.to_string(), "partial");
        assert_ne!(lower, JobStatus::Custom("PARTIALLY".to_string()));

        let mut seen = std::collections::HashSet::new();
        seen.insert(JobStatus::Custom("Partial".to_string()));
        assert!(seen.contains(&JobStatus::Custom("PARTIAL".to_string())));
        seen.insert(JobStatus::Custom("COMPLETED".to_string()));
        assert!(seen.contains(&JobStatus::Completed));
    }

    #[test]
    fn test_report_builders() {
        let report = JobReport::completed("extract").with_output("rows", "42");
        assert_eq!(report.job_name, "extract");
        assert!(report.status.is_completed());
        assert_eq!(report.output("rows"), Some("42"));
        assert!(report.error.is_none());

        let report = JobReport::failed("load", "connection refused");
        assert!(report.status.is_failed());
        assert_eq!(report.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_report_duration() {
        let start = Utc::now();
        let end = start + chrono::Duration::milliseconds(250);
        let report = JobReport::completed("timed").with_timing(start, end);
        assert_eq!(report.duration(), Some(chrono::Duration::milliseconds(250)));
        assert!(JobReport::completed("untimed").duration().is_none());
    }
}
