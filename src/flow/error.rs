//! Pipeline error types

use crate::job::JobError;

/// Errors raised while assembling a pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("No start job")]
    NoStartJob,

    #[error("Start job already set")]
    StartJobAlreadySet,

    #[error("then() called without a preceding when()")]
    ThenWithoutWhen,

    #[error("when() called while a previous when() is still waiting for then()")]
    WhenWithoutThen,

    #[error("Transition from job '{job}' which is not part of the pipeline")]
    DanglingTransition { job: String },
}

/// Errors a predicate raises while classifying a report
#[derive(Debug, thiserror::Error)]
pub enum PredicateError {
    #[error("Predicate failed: {0}")]
    Failed(String),
}

/// Errors that abort a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Job '{job}' failed: {source}")]
    JobExecution {
        job: String,
        #[source]
        source: JobError,
    },

    #[error("Transition predicate for job '{job}' failed: {source}")]
    PredicateEvaluation {
        job: String,
        #[source]
        source: PredicateError,
    },

    #[error("Pipeline cancelled")]
    Cancelled,
}
