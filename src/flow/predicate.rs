//! Transition predicates
//!
//! A predicate classifies a [`JobReport`] as true or false and decides
//! whether a transition is taken. Predicates never mutate the report. A
//! predicate that fails aborts the run the same way a failing job does.
//!
//! ```rust
//! use jobflow::flow::predicate::{job_failed, status_is, PredicateExt};
//! use jobflow::{JobReport, JobStatus, Predicate};
//!
//! let retryable = job_failed().or(status_is(JobStatus::Aborted));
//! let report = JobReport::new("sync", JobStatus::Aborted);
//! assert!(retryable.evaluate(&report).unwrap());
//! ```

use std::sync::Arc;

use super::error::PredicateError;
use crate::job::{JobReport, JobStatus};

/// A pure test over a job report
pub trait Predicate: Send + Sync {
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError>;
}

impl<P: Predicate + ?Sized> Predicate for Arc<P> {
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError> {
        (**self).evaluate(report)
    }
}

impl<P: Predicate + ?Sized> Predicate for Box<P> {
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError> {
        (**self).evaluate(report)
    }
}

/// Matches reports carrying one specific status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIs(JobStatus);

impl Predicate for StatusIs {
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError> {
        Ok(report.status == self.0)
    }
}

/// Matches every report
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl Predicate for Always {
    fn evaluate(&self, _report: &JobReport) -> Result<bool, PredicateError> {
        Ok(true)
    }
}

pub fn job_completed() -> StatusIs {
    StatusIs(JobStatus::Completed)
}

pub fn job_failed() -> StatusIs {
    StatusIs(JobStatus::Failed)
}

pub fn status_is(status: JobStatus) -> StatusIs {
    StatusIs(status)
}

/// Register last: it shadows every transition after it.
pub fn always() -> Always {
    Always
}

/// Predicate from an infallible closure
pub struct FnPredicate<F>(F);

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&JobReport) -> bool + Send + Sync,
{
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError> {
        Ok((self.0)(report))
    }
}

pub fn from_fn<F>(f: F) -> FnPredicate<F>
where
    F: Fn(&JobReport) -> bool + Send + Sync,
{
    FnPredicate(f)
}

/// Predicate from a fallible closure
pub struct TryFnPredicate<F>(F);

impl<F> Predicate for TryFnPredicate<F>
where
    F: Fn(&JobReport) -> Result<bool, PredicateError> + Send + Sync,
{
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError> {
        (self.0)(report)
    }
}

pub fn try_from_fn<F>(f: F) -> TryFnPredicate<F>
where
    F: Fn(&JobReport) -> Result<bool, PredicateError> + Send + Sync,
{
    TryFnPredicate(f)
}

pub struct And<A, B>(A, B);

impl<A: Predicate, B: Predicate> Predicate for And<A, B> {
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError> {
        Ok(self.0.evaluate(report)? && self.1.evaluate(report)?)
    }
}

pub struct Or<A, B>(A, B);

impl<A: Predicate, B: Predicate> Predicate for Or<A, B> {
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError> {
        Ok(self.0.evaluate(report)? || self.1.evaluate(report)?)
    }
}

pub struct Not<P>(P);

impl<P: Predicate> Predicate for Not<P> {
    fn evaluate(&self, report: &JobReport) -> Result<bool, PredicateError> {
        Ok(!self.0.evaluate(report)?)
    }
}

/// Combinators, short-circuiting left to right
pub trait PredicateExt: Predicate + Sized {
    fn and<P: Predicate>(self, other: P) -> And<Self, P> {
        And(self, other)
    }

    fn or<P: Predicate>(self, other: P) -> Or<Self, P> {
        Or(self, other)
    }

    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<T: Predicate> PredicateExt for T {}
