//! Predicate-guarded edges between jobs

use std::fmt;
use std::sync::Arc;

use super::error::PredicateError;
use super::predicate::Predicate;
use crate::job::{JobHandle, JobReport};

#[derive(Clone)]
pub struct Transition {
    source: JobHandle,
    predicate: Arc<dyn Predicate>,
    target: JobHandle,
}

impl Transition {
    pub fn new(source: JobHandle, predicate: Arc<dyn Predicate>, target: JobHandle) -> Self {
        Self {
            source,
            predicate,
            target,
        }
    }

    pub fn source(&self) -> &JobHandle {
        &self.source
    }

    pub fn target(&self) -> &JobHandle {
        &self.target
    }

    /// Whether the source job's report takes this edge
    pub fn matches(&self, report: &JobReport) -> Result<bool, PredicateError> {
        self.predicate.evaluate(report)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
