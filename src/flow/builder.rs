//! Pipeline builder
//!
//! Two surfaces build the same graph:
//!
//! - the fluent chain `start_with` / `when` / `then`, where each `when`
//!   attaches to the current job, i.e. the one named by the most recent
//!   `start_with` or `then`;
//! - `add_transition(from, predicate, to)`, which names the source
//!   explicitly and leaves the current job untouched.
//!
//! ```rust
//! use jobflow::flow::predicate::{job_completed, job_failed};
//! use jobflow::{FnJob, JobHandle, JobReport, PipelineBuilder};
//!
//! # fn main() -> Result<(), jobflow::ConfigurationError> {
//! let extract = JobHandle::new(FnJob::new("extract", || Ok(JobReport::completed("extract"))));
//! let load = JobHandle::new(FnJob::new("load", || Ok(JobReport::completed("load"))));
//! let alert = JobHandle::new(FnJob::new("alert", || Ok(JobReport::completed("alert"))));
//!
//! let pipeline = PipelineBuilder::new()
//!     .start_with(&extract)?
//!     .when(job_completed())?
//!     .then(&load)?
//!     .add_transition(&extract, job_failed(), &alert)
//!     .build()?;
//!
//! assert_eq!(pipeline.transitions_from(&extract).len(), 2);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use super::error::ConfigurationError;
use super::listener::PipelineListener;
use super::pipeline::Pipeline;
use super::predicate::Predicate;
use super::transition::Transition;
use crate::job::{JobHandle, JobId};

const DEFAULT_PIPELINE_NAME: &str = "pipeline";

#[derive(Default)]
pub struct PipelineBuilder {
    name: Option<String>,
    start: Option<JobHandle>,
    current: Option<JobHandle>,
    pending: Option<Arc<dyn Predicate>>,
    jobs: IndexMap<JobId, JobHandle>,
    transitions: HashMap<JobId, Vec<Transition>>,
    listeners: Vec<Arc<dyn PipelineListener>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used in logs and listener events
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn start_with(mut self, job: &JobHandle) -> Result<Self, ConfigurationError> {
        if self.start.is_some() {
            return Err(ConfigurationError::StartJobAlreadySet);
        }
        self.register(job);
        self.start = Some(job.clone());
        self.current = Some(job.clone());
        Ok(self)
    }

    /// Guard the next `then` with `predicate`
    pub fn when<P>(mut self, predicate: P) -> Result<Self, ConfigurationError>
    where
        P: Predicate + 'static,
    {
        if self.current.is_none() {
            return Err(ConfigurationError::NoStartJob);
        }
        if self.pending.is_some() {
            return Err(ConfigurationError::WhenWithoutThen);
        }
        self.pending = Some(Arc::new(predicate));
        Ok(self)
    }

    /// Attach `job` to the current job under the pending predicate; `job`
    /// becomes the current job.
    pub fn then(mut self, job: &JobHandle) -> Result<Self, ConfigurationError> {
        let predicate = self
            .pending
            .take()
            .ok_or(ConfigurationError::ThenWithoutWhen)?;
        let source = self
            .current
            .clone()
            .ok_or(ConfigurationError::NoStartJob)?;

        self.push_transition(Transition::new(source, predicate, job.clone()));
        self.current = Some(job.clone());
        Ok(self)
    }

    pub fn add_transition<P>(mut self, from: &JobHandle, predicate: P, to: &JobHandle) -> Self
    where
        P: Predicate + 'static,
    {
        self.push_transition(Transition::new(from.clone(), Arc::new(predicate), to.clone()));
        self
    }

    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: PipelineListener + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn build(self) -> Result<Pipeline, ConfigurationError> {
        let start = self.start.ok_or(ConfigurationError::NoStartJob)?;
        if self.pending.is_some() {
            return Err(ConfigurationError::WhenWithoutThen);
        }

        // Known jobs are the start job plus every transition target
        for transition in self.transitions.values().flatten() {
            let source = transition.source();
            if !self.jobs.contains_key(&source.id()) {
                return Err(ConfigurationError::DanglingTransition {
                    job: source.name().to_string(),
                });
            }
        }

        Ok(Pipeline::new(
            self.name
                .unwrap_or_else(|| DEFAULT_PIPELINE_NAME.to_string()),
            start,
            self.jobs,
            self.transitions,
            self.listeners,
        ))
    }

    fn register(&mut self, job: &JobHandle) {
        self.jobs.entry(job.id()).or_insert_with(|| job.clone());
    }

    fn push_transition(&mut self, transition: Transition) {
        self.register(transition.target());
        self.transitions
            .entry(transition.source().id())
            .or_default()
            .push(transition);
    }
}
