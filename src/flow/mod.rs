//! Pipeline orchestration module
//!
//! This module contains:
//! - `builder` - PipelineBuilder, assembles the job graph
//! - `pipeline` - Pipeline, the immutable graph and its executor
//! - `predicate` - Predicates gating transitions
//! - `transition` - Predicate-guarded edges
//! - `listener` - Lifecycle events and listeners
//! - `result` - PipelineReport and Termination
//! - `error` - Configuration and execution errors

pub mod builder;
pub mod error;
pub mod listener;
pub mod pipeline;
pub mod predicate;
pub mod result;
pub mod transition;

pub use builder::PipelineBuilder;
pub use error::{ConfigurationError, PipelineError, PredicateError};
pub use listener::{
    LoggingListener, PipelineEvent, PipelineListener, PipelineState, RecordingListener,
};
pub use pipeline::Pipeline;
pub use predicate::{Predicate, PredicateExt};
pub use result::{PipelineReport, Termination};
pub use transition::Transition;
