//! Run lifecycle: partition input, start workers, close, drain
//!
//! # Shutdown Mechanism
//!
//! 1. Every producer is joined, without a bound, whether it ends normally or not
//! 2. The queue is closed, exactly once
//! 3. Consumers drain what is left, observe end of stream and exit; the
//!    configured join timeout bounds only this step
//!
//! The close happens through a guard, so an early return or unwind between
//! spawning and step 2 still closes the queue, before any started worker is
//! dropped, and lets consumers finish.

use crate::core::{
    EventSink, JobProcessor, LogSink, NoopProcessor, Result, WorkQueueError, WorkerIdentity,
    WorkerRole,
};
use crate::pool::config::WorkQueueConfig;
use crate::pool::consumer::{Consumer, ConsumerStats};
use crate::pool::producer::{Producer, ProducerStats};
use crate::pool::worker::{GroupOutcome, WorkerFailure, WorkerGroup, WorkerHandle};
use crate::queue::{BoundedJobQueue, QueueStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::Range;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use uuid::Uuid;

/// Split `len` items into `shares` contiguous, disjoint ranges.
///
/// Shares differ in size by at most one; the earliest shares take the
/// remainder. Shares are empty when there are fewer items than shares.
///
/// ```rust
/// use rust_work_queue::pool::partition;
///
/// assert_eq!(partition(5, 2), vec![0..3, 3..5]);
/// assert_eq!(partition(1, 3), vec![0..1, 1..1, 1..1]);
/// ```
pub fn partition(len: usize, shares: usize) -> Vec<Range<usize>> {
    if shares == 0 {
        return Vec::new();
    }
    let base = len / shares;
    let remainder = len % shares;

    let mut start = 0;
    (0..shares)
        .map(|i| {
            let size = base + usize::from(i < remainder);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

/// One worker's counters in a [`RunReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerSummary<S> {
    /// Display name of the worker
    pub worker: String,
    /// The worker's private counters
    pub stats: S,
}

/// What happened during one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique identifier of the run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the last worker was joined
    pub finished_at: DateTime<Utc>,
    /// Producers that finished normally
    pub producers: Vec<WorkerSummary<ProducerStats>>,
    /// Consumers that finished normally
    pub consumers: Vec<WorkerSummary<ConsumerStats>>,
    /// Queue counters at the end of the run
    pub queue: QueueStats,
    /// Workers that ended abnormally
    pub failures: Vec<WorkerFailure>,
}

impl RunReport {
    /// Jobs pushed into the queue
    pub fn submitted(&self) -> u64 {
        self.queue.total_pushed
    }

    /// Descriptors rejected by producers that finished normally
    pub fn rejected(&self) -> u64 {
        self.producers.iter().map(|p| p.stats.rejected).sum()
    }

    /// Accepted jobs that producers that finished normally could not push
    pub fn dropped(&self) -> u64 {
        self.producers.iter().map(|p| p.stats.dropped).sum()
    }

    /// Jobs processed by consumers that finished normally
    pub fn processed(&self) -> u64 {
        self.consumers.iter().map(|c| c.stats.processed).sum()
    }

    /// Jobs whose processing returned an error or panicked
    pub fn failed(&self) -> u64 {
        self.consumers
            .iter()
            .map(|c| c.stats.failed + c.stats.panicked)
            .sum()
    }

    /// Whether every worker finished normally
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn worker failures into an error.
    ///
    /// # Errors
    ///
    /// Returns `WorkersFailed` listing every abnormal ending.
    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            return Ok(self);
        }
        let summary = self
            .failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(WorkQueueError::workers_failed(self.failures.len(), summary))
    }

    /// Render the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| WorkQueueError::other(e.to_string()))
    }
}

/// Closes the queue once, on the normal path or on drop.
struct CloseGuard {
    queue: Arc<BoundedJobQueue>,
    armed: bool,
}

impl CloseGuard {
    fn new(queue: Arc<BoundedJobQueue>) -> Self {
        Self { queue, armed: true }
    }

    fn close(mut self) {
        self.armed = false;
        if self.queue.close() {
            log::debug!("queue closed with {} jobs pending", self.queue.len());
        }
    }
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        if self.armed && self.queue.close() {
            log::warn!("queue closed early, run did not reach the normal shutdown path");
        }
    }
}

/// Runs producers and consumers around one shared bounded queue.
///
/// # Example
///
/// ```rust
/// use rust_work_queue::prelude::*;
/// use std::sync::Arc;
///
/// # fn main() -> Result<()> {
/// let sink = Arc::new(CollectingSink::new());
/// let orchestrator = Orchestrator::new(WorkQueueConfig::new(2, 2, 2))?
///     .with_sink(sink.clone());
///
/// let report = orchestrator.run(["a.text", "b.pdf", "c.image", "d.bin", "e.text"])?;
/// assert_eq!(report.processed(), 4);
/// assert_eq!(report.rejected(), 1);
/// assert!(report.is_clean());
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    config: WorkQueueConfig,
    sink: Arc<dyn EventSink>,
    processor: Arc<dyn JobProcessor>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator that logs events and does no extra processing
    pub fn new(config: WorkQueueConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sink: Arc::new(LogSink),
            processor: Arc::new(NoopProcessor),
        })
    }

    /// Send events to `sink`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Process jobs with `processor`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_processor(mut self, processor: Arc<dyn JobProcessor>) -> Self {
        self.processor = processor;
        self
    }

    /// The run configuration
    pub fn config(&self) -> &WorkQueueConfig {
        &self.config
    }

    /// Run every descriptor through a fresh queue and wait for all workers.
    ///
    /// Worker failures do not make this fail; they are logged and listed in
    /// [`RunReport::failures`]. Use [`RunReport::into_result`] to escalate.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if a worker thread cannot be created. Workers
    /// already started are released by closing the queue.
    pub fn run<I, S>(&self, descriptors: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let descriptors: Vec<String> = descriptors.into_iter().map(Into::into).collect();
        let config = &self.config;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        log::info!(
            "run {} starting: {} descriptors, {} producers, {} consumers, capacity {}",
            run_id,
            descriptors.len(),
            config.producers,
            config.consumers,
            config.queue_capacity
        );
        #[cfg(feature = "tracing")]
        crate::telemetry::metrics::record_run_start(
            config.producers,
            config.consumers,
            config.queue_capacity,
        );

        let queue = Arc::new(BoundedJobQueue::new(config.queue_capacity));
        let mut consumers = WorkerGroup::new(WorkerRole::Consumer);
        let mut producers = WorkerGroup::new(WorkerRole::Producer);
        // Declared after the groups so it drops, and closes, before they join
        let close_guard = CloseGuard::new(Arc::clone(&queue));

        self.spawn_consumers(&queue, &mut consumers)?;
        self.spawn_producers(&queue, descriptors, &mut producers)?;

        // A producer still running may still push, so it is never detached
        let producer_outcome = producers.join_all(None);
        close_guard.close();
        let consumer_outcome = consumers.join_all(config.join_timeout);

        let report = Self::build_report(
            run_id,
            started_at,
            producer_outcome,
            consumer_outcome,
            queue.stats(),
        );

        #[cfg(feature = "tracing")]
        crate::telemetry::metrics::record_run_finish(report.processed(), report.failures.len());
        if report.is_clean() {
            log::info!(
                "run {} complete: {} submitted, {} rejected, {} processed",
                run_id,
                report.submitted(),
                report.rejected(),
                report.processed()
            );
        } else {
            log::error!(
                "run {} complete with {} failed worker(s)",
                run_id,
                report.failures.len()
            );
        }
        Ok(report)
    }

    fn spawn_consumers(
        &self,
        queue: &Arc<BoundedJobQueue>,
        group: &mut WorkerGroup<ConsumerStats>,
    ) -> Result<()> {
        let config = &self.config;
        let live = Arc::new(AtomicUsize::new(config.consumers));

        for index in 0..config.consumers {
            let identity = config.names.identity(WorkerRole::Consumer, index);
            let consumer = Consumer::new(
                identity.clone(),
                Arc::clone(queue),
                config.supported_types.clone(),
                Arc::clone(&self.processor),
                Arc::clone(&self.sink),
            )
            .tracking_liveness(Arc::clone(&live));

            group.push(self.spawn_worker(identity, move || consumer.run())?);
        }
        Ok(())
    }

    fn spawn_producers(
        &self,
        queue: &Arc<BoundedJobQueue>,
        descriptors: Vec<String>,
        group: &mut WorkerGroup<ProducerStats>,
    ) -> Result<()> {
        let config = &self.config;
        let mut remaining = descriptors.into_iter();

        for (index, share) in partition(remaining.len(), config.producers)
            .into_iter()
            .enumerate()
        {
            let identity = config.names.identity(WorkerRole::Producer, index);
            let assigned: Vec<String> = remaining.by_ref().take(share.len()).collect();
            let producer = Producer::new(
                identity.clone(),
                assigned,
                Arc::clone(queue),
                config.supported_types.clone(),
                Arc::clone(&self.sink),
            )
            .with_push_policy(config.push_policy);

            group.push(self.spawn_worker(identity, move || producer.run())?);
        }
        Ok(())
    }

    fn spawn_worker<T, F>(&self, identity: WorkerIdentity, body: F) -> Result<WorkerHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        #[cfg(test)]
        tests::check_spawn(&identity)?;

        let name = self.thread_name(&identity);
        WorkerHandle::spawn(identity, name, body)
    }

    fn thread_name(&self, identity: &WorkerIdentity) -> String {
        let role = match identity.role() {
            WorkerRole::Producer => "producer",
            WorkerRole::Consumer => "consumer",
        };
        format!(
            "{}-{}-{}",
            self.config.thread_name_prefix,
            role,
            identity.index() + 1
        )
    }

    fn build_report(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        producers: GroupOutcome<ProducerStats>,
        consumers: GroupOutcome<ConsumerStats>,
        queue: QueueStats,
    ) -> RunReport {
        let mut failures = producers.failures;
        failures.extend(consumers.failures);

        RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            producers: summarize(producers.completed),
            consumers: summarize(consumers.completed),
            queue,
            failures,
        }
    }
}

fn summarize<S>(completed: Vec<(WorkerIdentity, S)>) -> Vec<WorkerSummary<S>> {
    completed
        .into_iter()
        .map(|(identity, stats)| WorkerSummary {
            worker: identity.name().to_string(),
            stats,
        })
        .collect()
}
