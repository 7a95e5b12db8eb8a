//! # jobflow
//!
//! Conditional job pipelines: run a job, look at its report, and decide
//! which job runs next.
//!
//! ## Concepts
//!
//! - **Job** - an opaque unit of work that produces a [`JobReport`]
//! - **Predicate** - a pure test over a report
//! - **Transition** - a predicate-guarded edge from one job to another
//! - **Pipeline** - the immutable graph of jobs and transitions, and the
//!   executor that walks it
//!
//! Transitions are evaluated in registration order and the first match
//! wins. A job never runs twice in one execution: reaching it again ends the
//! run with [`Termination::CycleDetected`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobflow::prelude::*;
//! use jobflow::flow::predicate::{job_completed, job_failed};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let extract = JobHandle::new(CommandJob::new("extract", "./extract.sh"));
//!     let load = JobHandle::new(CommandJob::new("load", "./load.sh"));
//!     let alert = JobHandle::new(CommandJob::new("alert", "./page-oncall.sh"));
//!
//!     let pipeline = PipelineBuilder::new()
//!         .named("nightly")
//!         .start_with(&extract)?
//!         .when(job_completed())?
//!         .then(&load)?
//!         .add_transition(&extract, job_failed(), &alert)
//!         .build()?;
//!
//!     let report = pipeline.execute().await?;
//!     for (_, job_report) in report.iter() {
//!         println!("{}: {}", job_report.job_name, job_report.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod definition;
pub mod flow;
pub mod job;

// Re-export main types
pub use definition::{
    DefinitionError, JobDefinition, LoadError, PipelineDefinition, PipelineLoader,
    TransitionDefinition,
};
pub use flow::{
    ConfigurationError, LoggingListener, Pipeline, PipelineBuilder, PipelineError, PipelineEvent,
    PipelineListener, PipelineReport, PipelineState, Predicate, PredicateError, PredicateExt,
    RecordingListener, Termination, Transition,
};
pub use job::{CommandJob, FnJob, Job, JobError, JobHandle, JobId, JobReport, JobStatus};
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::definition::{DefinitionError, LoadError, PipelineDefinition, PipelineLoader};
    pub use crate::flow::{
        ConfigurationError, Pipeline, PipelineBuilder, PipelineError, PipelineEvent,
        PipelineListener, PipelineReport, Predicate, PredicateExt, Termination,
    };
    pub use crate::job::{CommandJob, FnJob, Job, JobError, JobHandle, JobReport, JobStatus};
    pub use tokio_util::sync::CancellationToken;
}
