//! Tracing integration for observability.
//!
//! Available with the `tracing` feature. Workers enter a span carrying their
//! display name and role for their whole lifetime, and emit trace-level
//! events that metrics layers can aggregate.
//!
//! # Example
//!
//! ```rust,ignore
//! use rust_work_queue::prelude::*;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("rust_work_queue=trace".parse().unwrap()))
//!     .init();
//!
//! let report = Orchestrator::new(WorkQueueConfig::default())?.run(builtin_descriptors())?;
//! ```

use crate::core::{WorkerIdentity, WorkerRole};

/// Span covering one worker's lifetime.
pub fn worker_span(identity: &WorkerIdentity) -> tracing::Span {
    let role = match identity.role() {
        WorkerRole::Producer => "producer",
        WorkerRole::Consumer => "consumer",
    };
    tracing::debug_span!("worker", name = identity.name(), role = role)
}

/// Metrics recording functions for observability.
///
/// These functions emit tracing events that can be consumed by
/// metrics collection systems like Prometheus via tracing-opentelemetry.
pub mod metrics {
    use std::time::Duration;

    /// Records a job submission event.
    #[inline]
    pub fn record_submission(queue_depth: usize) {
        tracing::trace!(
            counter.jobs_submitted = 1,
            gauge.queue_depth = queue_depth as i64,
            "job submitted"
        );
    }

    /// Records a rejected descriptor.
    #[inline]
    pub fn record_rejection() {
        tracing::trace!(counter.descriptors_rejected = 1, "descriptor rejected");
    }

    /// Records job completion with timing.
    #[inline]
    pub fn record_completion(duration: Duration, success: bool) {
        let duration_ms = duration.as_millis() as u64;
        if success {
            tracing::trace!(
                counter.jobs_processed = 1,
                histogram.job_duration_ms = duration_ms,
                "job processed"
            );
        } else {
            tracing::trace!(
                counter.jobs_failed = 1,
                histogram.job_duration_ms = duration_ms,
                "job failed"
            );
        }
    }

    /// Records run startup.
    #[inline]
    pub fn record_run_start(producers: usize, consumers: usize, capacity: usize) {
        tracing::info!(producers, consumers, capacity, "work queue run started");
    }

    /// Records run completion.
    #[inline]
    pub fn record_run_finish(processed: u64, failures: usize) {
        tracing::info!(processed, failures, "work queue run finished");
    }
}
