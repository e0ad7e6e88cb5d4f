//! Error types for the work queue

use std::path::PathBuf;

/// Result type for work queue operations
pub type Result<T> = std::result::Result<T, WorkQueueError>;

/// Errors that can occur while running a work queue
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WorkQueueError {
    /// A push was attempted after the queue was closed
    #[error("Queue is closed: '{worker}' attempted to submit after close")]
    QueueClosed {
        /// Display name of the submitting worker
        worker: String,
    },

    /// A push timed out waiting for queue space
    #[error("Job submission timed out after {timeout_ms}ms")]
    PushTimeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Failed to spawn a worker thread
    #[error("Failed to spawn worker '{worker}': {message}")]
    SpawnError {
        /// Display name of the worker
        worker: String,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Worker thread panicked
    #[error("Worker '{worker}' panicked: {message}")]
    WorkerPanic {
        /// Display name of the worker
        worker: String,
        /// Panic message
        message: String,
    },

    /// Worker did not finish within the join timeout
    #[error("Worker '{worker}' did not finish within {timeout_ms}ms")]
    JoinTimeout {
        /// Display name of the worker
        worker: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// One or more workers ended abnormally during a run
    #[error("{failed} worker(s) ended abnormally: {summary}")]
    WorkersFailed {
        /// Number of failed workers
        failed: usize,
        /// Joined failure descriptions
        summary: String,
    },

    /// Reading the input source failed
    #[error("Failed to read input from '{}': {source}", path.display())]
    Input {
        /// Path of the input source
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl WorkQueueError {
    /// Create a queue closed error
    pub fn queue_closed(worker: impl Into<String>) -> Self {
        WorkQueueError::QueueClosed {
            worker: worker.into(),
        }
    }

    /// Create a push timeout error
    pub fn push_timeout(timeout_ms: u64) -> Self {
        WorkQueueError::PushTimeout { timeout_ms }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        WorkQueueError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        WorkQueueError::SpawnError {
            worker: worker.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(worker: impl Into<String>, message: impl Into<String>) -> Self {
        WorkQueueError::WorkerPanic {
            worker: worker.into(),
            message: message.into(),
        }
    }

    /// Create a join timeout error
    pub fn join_timeout(worker: impl Into<String>, timeout_ms: u64) -> Self {
        WorkQueueError::JoinTimeout {
            worker: worker.into(),
            timeout_ms,
        }
    }

    /// Create a workers failed error
    pub fn workers_failed(failed: usize, summary: impl Into<String>) -> Self {
        WorkQueueError::WorkersFailed {
            failed,
            summary: summary.into(),
        }
    }

    /// Create an input error
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorkQueueError::Input {
            path: path.into(),
            source,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        WorkQueueError::Other(msg.into())
    }
}

/// Why a raw descriptor was not turned into a job.
///
/// Rejections are recovered locally by the producer that saw them; they are
/// values carried by [`Classification::Rejected`], not errors that propagate.
///
/// [`Classification::Rejected`]: crate::core::Classification::Rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// The descriptor's type is not in the supported set
    #[error("file type {0} is not supported")]
    UnsupportedType(String),

    /// The descriptor has no separator between name and type
    #[error("malformed descriptor, expected <name>.<type>")]
    MalformedDescriptor,
}
