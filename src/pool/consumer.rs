//! Consumer worker: drains the queue until end of stream

use crate::core::{Event, EventSink, Job, JobProcessor, Result, SupportedTypes, WorkerIdentity};
use crate::pool::worker::panic_message;
use crate::queue::{BoundedJobQueue, QueueError};
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters private to one consumer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerStats {
    /// Jobs processed successfully
    pub processed: u64,
    /// Jobs skipped because their kind is not supported
    pub mismatched: u64,
    /// Jobs whose processor returned an error
    pub failed: u64,
    /// Jobs whose processor panicked
    pub panicked: u64,
}

/// Pops and processes jobs until the queue reports end of stream.
pub struct Consumer {
    identity: WorkerIdentity,
    queue: Arc<BoundedJobQueue>,
    supported: SupportedTypes,
    processor: Arc<dyn JobProcessor>,
    sink: Arc<dyn EventSink>,
    live: Option<Arc<AtomicUsize>>,
}

impl Consumer {
    /// Create a consumer bound to the shared queue
    pub fn new(
        identity: WorkerIdentity,
        queue: Arc<BoundedJobQueue>,
        supported: SupportedTypes,
        processor: Arc<dyn JobProcessor>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            identity,
            queue,
            supported,
            processor,
            sink,
            live: None,
        }
    }

    /// Share a count of live consumers with the rest of the group.
    ///
    /// The consumer decrements it on exit. When the last live consumer exits
    /// without reaching end of stream the queue is closed, so producers
    /// blocked on a full queue are released instead of waiting forever.
    #[must_use]
    pub fn tracking_liveness(mut self, live: Arc<AtomicUsize>) -> Self {
        self.live = Some(live);
        self
    }

    /// Identity of this consumer
    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    /// Drain the queue until end of stream.
    pub fn run(self) -> Result<ConsumerStats> {
        let mut exit = ExitGuard {
            identity: &self.identity,
            queue: &self.queue,
            live: self.live.as_deref(),
            reached_end: false,
        };

        #[cfg(feature = "tracing")]
        let span = crate::telemetry::worker_span(&self.identity);
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        log::debug!("{} running", self.identity);
        let mut stats = ConsumerStats::default();

        loop {
            match self.queue.pop() {
                Ok(job) => self.handle(job, &mut stats),
                Err(QueueError::EndOfStream) => break,
                Err(e) => {
                    log::error!("{} stopped on unexpected queue error: {}", self.identity, e);
                    return Err(e.into());
                }
            }
        }

        exit.reached_end = true;
        log::debug!(
            "{} finished: {} processed, {} mismatched, {} failed, {} panicked",
            self.identity,
            stats.processed,
            stats.mismatched,
            stats.failed,
            stats.panicked
        );
        Ok(stats)
    }

    fn handle(&self, job: Job, stats: &mut ConsumerStats) {
        if !self.supported.contains(job.kind()) {
            stats.mismatched += 1;
            self.sink.emit(Event::Mismatch {
                worker: self.identity.clone(),
                job,
            });
            return;
        }

        let start = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.processor.process(&self.identity, &job)
        }));
        #[cfg(feature = "tracing")]
        crate::telemetry::metrics::record_completion(
            start.elapsed(),
            matches!(result, Ok(Ok(()))),
        );

        let event = match result {
            Ok(Ok(())) => {
                stats.processed += 1;
                log::trace!("{} processed {} in {:?}", self.identity, job, start.elapsed());
                Event::Processed {
                    worker: self.identity.clone(),
                    job,
                }
            }
            Ok(Err(e)) => {
                stats.failed += 1;
                Event::ProcessingFailed {
                    worker: self.identity.clone(),
                    job,
                    message: e.to_string(),
                }
            }
            Err(payload) => {
                stats.panicked += 1;
                Event::ProcessingFailed {
                    worker: self.identity.clone(),
                    job,
                    message: format!("panicked: {}", panic_message(&*payload)),
                }
            }
        };
        self.sink.emit(event);
    }
}

struct ExitGuard<'a> {
    identity: &'a WorkerIdentity,
    queue: &'a BoundedJobQueue,
    live: Option<&'a AtomicUsize>,
    reached_end: bool,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        let Some(live) = self.live else {
            return;
        };
        let last = live.fetch_sub(1, Ordering::AcqRel) == 1;
        if !self.reached_end && last && self.queue.close() {
            log::error!(
                "{} was the last live consumer and ended abnormally; queue force-closed",
                self.identity
            );
        }
    }
}
