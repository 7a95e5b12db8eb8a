//! Pipeline run result types

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::job::{JobHandle, JobId, JobReport, JobStatus};

/// Why a run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// The last job had no matching transition
    Exhausted,
    /// A transition led back to a job that already ran; it was not re-run
    CycleDetected { job_id: JobId, job_name: String },
}

/// Reports of every job invoked during one run, in traversal order
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub pipeline: String,
    pub reports: IndexMap<JobId, JobReport>,
    pub termination: Termination,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl PipelineReport {
    pub fn get(&self, job: &JobHandle) -> Option<&JobReport> {
        self.reports.get(&job.id())
    }

    pub fn contains(&self, job: &JobHandle) -> bool {
        self.reports.contains_key(&job.id())
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobId, &JobReport)> {
        self.reports.iter()
    }

    /// Report of the job that ran last
    pub fn last(&self) -> Option<&JobReport> {
        self.reports.last().map(|(_, report)| report)
    }

    /// The run ended normally and its final job completed
    pub fn succeeded(&self) -> bool {
        self.termination == Termination::Exhausted
            && self
                .last()
                .is_some_and(|report| report.status == JobStatus::Completed)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.ended_at - self.started_at
    }
}
