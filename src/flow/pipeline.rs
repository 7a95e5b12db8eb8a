//! Pipeline executor
//!
//! Walks the job graph from the start job:
//! 1. Invokes the current job and records its report
//! 2. Evaluates the job's transitions in registration order
//! 3. Moves to the target of the first matching transition
//! 4. Stops when nothing matches, or when the next job already ran
//!
//! The walk is iterative. Each call to [`Pipeline::execute`] owns its own
//! report map and visited set, so one pipeline can be run concurrently.
//!
//! Run progress is published as [`PipelineEvent`]s; the executor only
//! traces routing decisions. Attach a
//! [`LoggingListener`](super::listener::LoggingListener) to log progress.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::error::PipelineError;
use super::listener::{PipelineEvent, PipelineListener};
use super::result::{PipelineReport, Termination};
use super::transition::Transition;
use crate::job::{JobHandle, JobId, JobReport};

/// An immutable graph of jobs and transitions
pub struct Pipeline {
    name: String,
    start: JobHandle,
    jobs: IndexMap<JobId, JobHandle>,
    transitions: HashMap<JobId, Vec<Transition>>,
    listeners: Vec<Arc<dyn PipelineListener>>,
}

impl Pipeline {
    pub(crate) fn new(
        name: String,
        start: JobHandle,
        jobs: IndexMap<JobId, JobHandle>,
        transitions: HashMap<JobId, Vec<Transition>>,
        listeners: Vec<Arc<dyn PipelineListener>>,
    ) -> Self {
        Self {
            name,
            start,
            jobs,
            transitions,
            listeners,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> &JobHandle {
        &self.start
    }

    /// Every known job, in registration order
    pub fn jobs(&self) -> impl Iterator<Item = &JobHandle> {
        self.jobs.values()
    }

    pub fn transitions_from(&self, job: &JobHandle) -> &[Transition] {
        self.transitions
            .get(&job.id())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Run the pipeline to completion
    pub async fn execute(&self) -> Result<PipelineReport, PipelineError> {
        self.execute_with(&CancellationToken::new()).await
    }

    /// Run the pipeline, stopping before the next job once `cancel` fires
    ///
    /// The token is also handed to every job so a running job can stop early.
    #[instrument(skip(self, cancel), fields(pipeline = %self.name))]
    pub async fn execute_with(
        &self,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        self.emit(&PipelineEvent::RunStarted {
            run_id: run_id.clone(),
            pipeline: self.name.clone(),
        });

        let started_at = Utc::now();
        match self.traverse(&run_id, cancel).await {
            Ok((reports, termination)) => {
                self.emit(&PipelineEvent::RunCompleted {
                    run_id: run_id.clone(),
                    termination: termination.clone(),
                });
                Ok(PipelineReport {
                    run_id,
                    pipeline: self.name.clone(),
                    reports,
                    termination,
                    started_at,
                    ended_at: Utc::now(),
                })
            }
            Err(e) => {
                self.emit(&PipelineEvent::RunAborted {
                    run_id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn traverse(
        &self,
        run_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(IndexMap<JobId, JobReport>, Termination), PipelineError> {
        let mut reports: IndexMap<JobId, JobReport> = IndexMap::new();
        let mut visited: HashSet<JobId> = HashSet::new();
        let mut current = Some(self.start.clone());

        while let Some(job) = current.take() {
            if visited.contains(&job.id()) {
                self.emit(&PipelineEvent::CycleDetected {
                    run_id: run_id.to_string(),
                    job_id: job.id(),
                    job_name: job.name().to_string(),
                });
                return Ok((
                    reports,
                    Termination::CycleDetected {
                        job_id: job.id(),
                        job_name: job.name().to_string(),
                    },
                ));
            }

            if cancel.is_cancelled() {
                debug!("Cancelled before job '{}'", job.name());
                return Err(PipelineError::Cancelled);
            }

            let report = self.invoke(run_id, &job, cancel).await?;
            current = self.select_next(&job, &report)?;
            visited.insert(job.id());
            reports.insert(job.id(), report);
        }

        Ok((reports, Termination::Exhausted))
    }

    #[instrument(skip(self, run_id, cancel), fields(job = %job.name()))]
    async fn invoke(
        &self,
        run_id: &str,
        job: &JobHandle,
        cancel: &CancellationToken,
    ) -> Result<JobReport, PipelineError> {
        self.emit(&PipelineEvent::JobStarted {
            run_id: run_id.to_string(),
            job_id: job.id(),
            job_name: job.name().to_string(),
        });

        let report = job.call(cancel).await.map_err(|source| match source {
            crate::job::JobError::Cancelled => PipelineError::Cancelled,
            source => PipelineError::JobExecution {
                job: job.name().to_string(),
                source,
            },
        })?;

        self.emit(&PipelineEvent::JobFinished {
            run_id: run_id.to_string(),
            job_id: job.id(),
            job_name: job.name().to_string(),
            status: report.status.clone(),
        });
        Ok(report)
    }

    /// First matching transition wins
    fn select_next(
        &self,
        job: &JobHandle,
        report: &JobReport,
    ) -> Result<Option<JobHandle>, PipelineError> {
        for transition in self.transitions_from(job) {
            let matched =
                transition
                    .matches(report)
                    .map_err(|source| PipelineError::PredicateEvaluation {
                        job: job.name().to_string(),
                        source,
                    })?;
            if matched {
                debug!(
                    "Transition {} -> {} taken",
                    job.name(),
                    transition.target().name()
                );
                return Ok(Some(transition.target().clone()));
            }
        }
        debug!("No transition matched for job '{}'", job.name());
        Ok(None)
    }

    fn emit(&self, event: &PipelineEvent) {
        for listener in &self.listeners {
            listener.on_event(event);
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("start", &self.start)
            .field("jobs", &self.jobs.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
