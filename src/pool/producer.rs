//! Producer worker: classifies descriptors and submits jobs

use crate::core::{
    Classification, Event, EventSink, Result, SupportedTypes, WorkQueueError, WorkerIdentity,
};
use crate::queue::{BoundedJobQueue, PushPolicy, QueueError};
use serde::Serialize;
use std::sync::Arc;

/// Counters private to one producer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProducerStats {
    /// Jobs pushed into the queue
    pub submitted: u64,
    /// Descriptors rejected during classification
    pub rejected: u64,
    /// Accepted jobs that could not be pushed
    pub dropped: u64,
}

/// Submits the jobs of one share of the input, in order.
pub struct Producer {
    identity: WorkerIdentity,
    descriptors: Vec<String>,
    queue: Arc<BoundedJobQueue>,
    supported: SupportedTypes,
    policy: PushPolicy,
    sink: Arc<dyn EventSink>,
}

impl Producer {
    /// Create a producer bound to its share of descriptors
    pub fn new(
        identity: WorkerIdentity,
        descriptors: Vec<String>,
        queue: Arc<BoundedJobQueue>,
        supported: SupportedTypes,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            identity,
            descriptors,
            queue,
            supported,
            policy: PushPolicy::default(),
            sink,
        }
    }

    /// Use a push policy other than blocking
    #[must_use]
    pub fn with_push_policy(mut self, policy: PushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Identity of this producer
    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    /// Process every assigned descriptor, then finish.
    ///
    /// Rejections and push timeouts are reported and skipped.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the queue was closed under this producer; the
    /// job in hand and the rest of the share are not submitted.
    pub fn run(self) -> Result<ProducerStats> {
        let Producer {
            identity,
            descriptors,
            queue,
            supported,
            policy,
            sink,
        } = self;

        #[cfg(feature = "tracing")]
        let span = crate::telemetry::worker_span(&identity);
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        log::debug!("{} running with {} descriptors", identity, descriptors.len());
        let mut stats = ProducerStats::default();

        for descriptor in descriptors {
            let job = match supported.classify(&descriptor) {
                Classification::Accepted(job) => job,
                Classification::Rejected(reason) => {
                    stats.rejected += 1;
                    #[cfg(feature = "tracing")]
                    crate::telemetry::metrics::record_rejection();
                    sink.emit(Event::Rejected {
                        worker: identity.clone(),
                        descriptor,
                        reason,
                    });
                    continue;
                }
            };

            let record = job.clone();
            match policy.push(&queue, job) {
                Ok(()) => {
                    stats.submitted += 1;
                    #[cfg(feature = "tracing")]
                    crate::telemetry::metrics::record_submission(queue.len());
                    sink.emit(Event::Submitted {
                        worker: identity.clone(),
                        job: record,
                    });
                }
                Err(QueueError::Timeout(job)) => {
                    stats.dropped += 1;
                    let timeout_ms = policy.timeout().map_or(0, |t| t.as_millis() as u64);
                    sink.emit(Event::Dropped {
                        worker: identity.clone(),
                        job,
                        reason: WorkQueueError::push_timeout(timeout_ms).to_string(),
                    });
                }
                Err(e) => {
                    stats.dropped += 1;
                    log::error!(
                        "{} could not submit {}: {} ({} submitted so far)",
                        identity,
                        record,
                        e,
                        stats.submitted
                    );
                    sink.emit(Event::Dropped {
                        worker: identity.clone(),
                        job: record,
                        reason: e.to_string(),
                    });
                    return Err(WorkQueueError::queue_closed(identity.name()));
                }
            }
        }

        log::debug!(
            "{} finished: {} submitted, {} rejected, {} dropped",
            identity,
            stats.submitted,
            stats.rejected,
            stats.dropped
        );
        Ok(stats)
    }
}
