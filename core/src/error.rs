use std::any::Any;

use thiserror::Error;

/// Why a submitted task did not produce its value.
#[derive(Debug, Error)]
pub enum TaskFailure {
    #[error("task failed: {0:#}")]
    Failed(anyhow::Error),
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("task was cancelled before it completed")]
    Cancelled,
}

impl TaskFailure {
    /// Convert a payload caught by `catch_unwind` into a failure.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "non-string panic payload".to_string(),
            },
        };
        Self::Panicked(message)
    }
}

/// Failures reported by an executor itself, as opposed to the work it runs.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("task rejected: {reason}")]
    Rejected { reason: String },
    #[error("executor has been shut down")]
    Shutdown,
    #[error("no tasks were supplied")]
    NoTasks,
    #[error("timed out waiting for tasks")]
    Timeout,
    #[error("every task failed")]
    AllFailed(#[source] TaskFailure),
}
