//! Pipeline, job and transition definitions
//!
//! The serde model of a pipeline file. Every job is a shell command;
//! transitions are listed under `on` in evaluation order.

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::flow::predicate::{always, job_completed, job_failed, status_is, PredicateExt};
use crate::flow::{ConfigurationError, Pipeline, PipelineBuilder, Predicate};
use crate::job::{CommandJob, JobHandle, JobStatus};

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("Pipeline '{0}' defines no jobs")]
    NoJobs(String),

    #[error("Start job '{0}' is not defined")]
    UnknownStartJob(String),

    #[error("Job '{job}' transitions to undefined job '{target}'")]
    UnknownTarget { job: String, target: String },

    #[error("Job '{job}' has a transition with an empty condition")]
    EmptyCondition { job: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// A complete pipeline definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline name (required)
    pub name: String,

    /// Entry job; defaults to the first job in the file
    #[serde(default)]
    pub start: Option<String>,

    /// Default settings for all jobs
    #[serde(default)]
    pub defaults: JobDefaults,

    /// Environment variables available to all jobs
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Jobs, in file order
    pub jobs: IndexMap<String, JobDefinition>,
}

/// Default settings for jobs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobDefaults {
    /// Shell used to run commands (`sh` when unset)
    pub shell: Option<String>,

    /// Working directory for commands
    pub working_dir: Option<PathBuf>,
}

/// A job runs one shell command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Command passed to the shell with `-c`
    pub command: String,

    /// Override the default shell
    pub shell: Option<String>,

    /// Override the default working directory
    pub working_dir: Option<PathBuf>,

    /// Job-level environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Outgoing transitions, first match wins
    #[serde(default, rename = "on")]
    pub transitions: Vec<TransitionDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionDefinition {
    /// `completed`, `failed`, `always`, or any other status name;
    /// prefix with `!` to negate
    pub when: String,

    /// Name of the job to run next
    pub then: String,
}

/// Parse a transition condition into a predicate
pub fn parse_condition(condition: &str) -> Option<Box<dyn Predicate>> {
    let condition = condition.trim();
    if let Some(negated) = condition.strip_prefix('!') {
        let inner = parse_condition(negated)?;
        return Some(Box::new(inner.not()));
    }

    let predicate: Box<dyn Predicate> = match condition.to_ascii_lowercase().as_str() {
        "" => return None,
        "completed" | "success" => Box::new(job_completed()),
        "failed" | "failure" => Box::new(job_failed()),
        "always" | "any" => Box::new(always()),
        _ => Box::new(status_is(JobStatus::from_name(condition))),
    };
    Some(predicate)
}

impl PipelineDefinition {
    /// Name of the entry job
    pub fn start_job(&self) -> Option<&str> {
        self.start
            .as_deref()
            .or_else(|| self.jobs.keys().next().map(String::as_str))
    }

    /// Check job references without building anything
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let start = self
            .start_job()
            .ok_or_else(|| DefinitionError::NoJobs(self.name.clone()))?;
        if !self.jobs.contains_key(start) {
            return Err(DefinitionError::UnknownStartJob(start.to_string()));
        }

        for (name, job) in &self.jobs {
            for transition in &job.transitions {
                if transition.when.trim().trim_start_matches('!').trim().is_empty() {
                    return Err(DefinitionError::EmptyCondition { job: name.clone() });
                }
                if !self.jobs.contains_key(&transition.then) {
                    return Err(DefinitionError::UnknownTarget {
                        job: name.clone(),
                        target: transition.then.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn command_job(&self, name: &str, job: &JobDefinition) -> CommandJob {
        let mut env = self.env.clone();
        env.extend(job.env.clone());

        let mut command = CommandJob::new(name, &job.command).envs(env);
        if let Some(shell) = job.shell.as_ref().or(self.defaults.shell.as_ref()) {
            command = command.shell(shell);
        }
        if let Some(dir) = job.working_dir.as_ref().or(self.defaults.working_dir.as_ref()) {
            command = command.working_dir(dir);
        }
        command
    }

    /// Job handles by name, one `CommandJob` per definition
    pub fn job_handles(&self) -> IndexMap<String, JobHandle> {
        self.jobs
            .iter()
            .map(|(name, job)| (name.clone(), JobHandle::new(self.command_job(name, job))))
            .collect()
    }

    /// Builder with every job and transition in place, ready for listeners
    pub fn builder(&self) -> Result<PipelineBuilder, DefinitionError> {
        self.validate()?;
        let handles = self.job_handles();

        let start = self
            .start_job()
            .and_then(|name| handles.get(name))
            .ok_or_else(|| DefinitionError::NoJobs(self.name.clone()))?;

        let mut builder = PipelineBuilder::new().named(&self.name).start_with(start)?;
        for ((name, job), from) in self.jobs.iter().zip(handles.values()) {
            for transition in &job.transitions {
                let predicate = parse_condition(&transition.when)
                    .ok_or_else(|| DefinitionError::EmptyCondition { job: name.clone() })?;
                let to = handles.get(transition.then.as_str()).ok_or_else(|| {
                    DefinitionError::UnknownTarget {
                        job: name.clone(),
                        target: transition.then.clone(),
                    }
                })?;
                builder = builder.add_transition(from, predicate, to);
            }
        }

        Ok(builder)
    }

    pub fn build_pipeline(&self) -> Result<Pipeline, DefinitionError> {
        Ok(self.builder()?.build()?)
    }
}
