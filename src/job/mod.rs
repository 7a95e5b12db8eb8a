//! Jobs: the units of work a pipeline invokes
//!
//! This module contains:
//! - `report` - JobStatus and JobReport, the outcome of one invocation
//! - `command` - CommandJob, runs a shell command
//! - `function` - FnJob, wraps a closure
//!
//! A job is opaque to the pipeline. It is called once, with a cancellation
//! token, and hands back a report or fails.

pub mod command;
pub mod function;
pub mod report;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub use command::CommandJob;
pub use function::FnJob;
pub use report::{JobReport, JobStatus};

/// Errors a job raises when it cannot produce a report at all
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job cancelled")]
    Cancelled,

    #[error("Job failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// An invocable unit of work
#[async_trait]
pub trait Job: Send + Sync {
    /// Diagnostic name, never used for identity
    fn name(&self) -> &str;

    /// Run the job to completion
    async fn call(&self, cancel: &CancellationToken) -> Result<JobReport, JobError>;
}

/// Identity of a job within pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a job
///
/// Equality and hashing go through the [`JobId`] assigned when the handle
/// is created. Clones share it; two handles built from identically
/// configured jobs do not.
#[derive(Clone)]
pub struct JobHandle {
    id: JobId,
    job: Arc<dyn Job>,
}

impl JobHandle {
    pub fn new<J: Job + 'static>(job: J) -> Self {
        Self::from_arc(Arc::new(job))
    }

    pub fn from_arc(job: Arc<dyn Job>) -> Self {
        Self {
            id: JobId::new(),
            job,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.job.name()
    }

    pub async fn call(&self, cancel: &CancellationToken) -> Result<JobReport, JobError> {
        self.job.call(cancel).await
    }
}

impl PartialEq for JobHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for JobHandle {}

impl Hash for JobHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id)
    }
}
