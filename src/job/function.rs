//! Closure-backed jobs

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{Job, JobError, JobReport};

/// A job whose body is a synchronous closure
///
/// ```rust
/// use jobflow::{FnJob, JobHandle, JobReport};
///
/// let job = JobHandle::new(FnJob::new("greet", || Ok(JobReport::completed("greet"))));
/// assert_eq!(job.name(), "greet");
/// ```
pub struct FnJob<F> {
    name: String,
    body: F,
}

impl<F> FnJob<F>
where
    F: Fn() -> Result<JobReport, JobError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

#[async_trait]
impl<F> Job for FnJob<F>
where
    F: Fn() -> Result<JobReport, JobError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, cancel: &CancellationToken) -> Result<JobReport, JobError> {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        (self.body)()
    }
}
