//! Pipeline lifecycle events and listeners

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::result::Termination;
use crate::job::{JobId, JobStatus};

/// Lifecycle state of one pipeline run
///
/// No event carries `NotStarted`; it is the state before the first event,
/// as reported by [`RecordingListener::state`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Aborted,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Aborted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineEvent {
    RunStarted {
        run_id: String,
        pipeline: String,
    },
    JobStarted {
        run_id: String,
        job_id: JobId,
        job_name: String,
    },
    JobFinished {
        run_id: String,
        job_id: JobId,
        job_name: String,
        status: JobStatus,
    },
    CycleDetected {
        run_id: String,
        job_id: JobId,
        job_name: String,
    },
    RunCompleted {
        run_id: String,
        termination: Termination,
    },
    RunAborted {
        run_id: String,
        error: String,
    },
}

impl PipelineEvent {
    pub fn run_id(&self) -> &str {
        match self {
            PipelineEvent::RunStarted { run_id, .. }
            | PipelineEvent::JobStarted { run_id, .. }
            | PipelineEvent::JobFinished { run_id, .. }
            | PipelineEvent::CycleDetected { run_id, .. }
            | PipelineEvent::RunCompleted { run_id, .. }
            | PipelineEvent::RunAborted { run_id, .. } => run_id,
        }
    }

    /// State the run is in once this event has been emitted
    pub fn state(&self) -> PipelineState {
        match self {
            PipelineEvent::RunCompleted { .. } => PipelineState::Completed,
            PipelineEvent::RunAborted { .. } => PipelineState::Aborted,
            _ => PipelineState::Running,
        }
    }
}

/// Observer of pipeline runs
///
/// Called synchronously from the executing task, in registration order.
pub trait PipelineListener: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

impl<L: PipelineListener + ?Sized> PipelineListener for Arc<L> {
    fn on_event(&self, event: &PipelineEvent) {
        (**self).on_event(event)
    }
}

/// Logs every event through `tracing`
///
/// The executor itself only logs at debug level; attach this listener for
/// run progress at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl PipelineListener for LoggingListener {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { run_id, pipeline } => {
                tracing::info!(%run_id, "Pipeline '{}' started", pipeline)
            }
            PipelineEvent::JobStarted { job_name, .. } => {
                tracing::info!("Job '{}' started", job_name)
            }
            PipelineEvent::JobFinished {
                job_name, status, ..
            } => tracing::info!(%status, "Job '{}' finished", job_name),
            PipelineEvent::CycleDetected { job_name, .. } => {
                tracing::warn!("Job '{}' already ran, stopping", job_name)
            }
            PipelineEvent::RunCompleted { run_id, termination } => {
                tracing::info!(%run_id, ?termination, "Pipeline completed")
            }
            PipelineEvent::RunAborted { run_id, error } => {
                tracing::error!(%run_id, error = %error, "Pipeline aborted")
            }
        }
    }
}

/// Keeps every event it sees, for inspection after a run
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.lock().clone()
    }

    /// State implied by the latest event seen
    pub fn state(&self) -> PipelineState {
        self.lock()
            .last()
            .map(PipelineEvent::state)
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PipelineEvent>> {
        // events pushed before a poisoning panic are still valid
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PipelineListener for RecordingListener {
    fn on_event(&self, event: &PipelineEvent) {
        self.lock().push(event.clone());
    }
}
