//! Human-readable event stream emitted by workers.
//!
//! Every accepted submission, rejected descriptor and processed job becomes one
//! [`Event`]. Workers hand events to an [`EventSink`]; the sink decides where
//! they go:
//!
//! - [`LogSink`]: through the `log` facade (default)
//! - [`StdoutSink`]: one plain line per event
//! - [`CollectingSink`]: kept in memory for inspection
//! - [`ChannelSink`]: forwarded over a crossbeam channel to an observer thread

use crate::core::error::RejectReason;
use crate::core::identity::WorkerIdentity;
use crate::core::job::Job;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::fmt;

/// Log target used by [`LogSink`]
pub const EVENT_LOG_TARGET: &str = "rust_work_queue::events";

/// Something observable a worker did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A producer pushed a job into the queue
    Submitted {
        /// Emitting worker
        worker: WorkerIdentity,
        /// Submitted job
        job: Job,
    },
    /// A producer discarded a descriptor during classification
    Rejected {
        /// Emitting worker
        worker: WorkerIdentity,
        /// Raw descriptor as received
        descriptor: String,
        /// Why it was discarded
        reason: RejectReason,
    },
    /// A producer accepted a job but could not enqueue it
    Dropped {
        /// Emitting worker
        worker: WorkerIdentity,
        /// The job that was not enqueued
        job: Job,
        /// Why the push failed
        reason: String,
    },
    /// A consumer processed a job
    Processed {
        /// Emitting worker
        worker: WorkerIdentity,
        /// Processed job
        job: Job,
    },
    /// A consumer popped a job whose kind is not supported
    Mismatch {
        /// Emitting worker
        worker: WorkerIdentity,
        /// Skipped job
        job: Job,
    },
    /// The job processor returned an error or panicked
    ProcessingFailed {
        /// Emitting worker
        worker: WorkerIdentity,
        /// Job being processed
        job: Job,
        /// Failure description
        message: String,
    },
}

impl Event {
    /// The worker that emitted this event
    pub fn worker(&self) -> &WorkerIdentity {
        match self {
            Event::Submitted { worker, .. }
            | Event::Rejected { worker, .. }
            | Event::Dropped { worker, .. }
            | Event::Processed { worker, .. }
            | Event::Mismatch { worker, .. }
            | Event::ProcessingFailed { worker, .. } => worker,
        }
    }

    /// The job this event is about, if any
    pub fn job(&self) -> Option<&Job> {
        match self {
            Event::Rejected { .. } => None,
            Event::Submitted { job, .. }
            | Event::Dropped { job, .. }
            | Event::Processed { job, .. }
            | Event::Mismatch { job, .. }
            | Event::ProcessingFailed { job, .. } => Some(job),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Submitted { worker, job } => write!(f, "{} submitted: {}", worker, job),
            Event::Rejected {
                worker,
                descriptor,
                reason,
            } => write!(f, "{} rejected {}: {}", worker, descriptor, reason),
            Event::Dropped {
                worker,
                job,
                reason,
            } => write!(f, "{} dropped {}: {}", worker, job, reason),
            Event::Processed { worker, job } => write!(f, "{} processing: {}", worker, job),
            Event::Mismatch { worker, job } => write!(
                f,
                "{} skipped {}: file type {} is not supported",
                worker,
                job,
                job.kind()
            ),
            Event::ProcessingFailed {
                worker,
                job,
                message,
            } => write!(f, "{} failed to process {}: {}", worker, job, message),
        }
    }
}

/// Destination for worker events.
pub trait EventSink: Send + Sync {
    /// Record one event
    fn emit(&self, event: Event);
}

/// Writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: Event) {
        match &event {
            Event::Submitted { .. } | Event::Processed { .. } => {
                log::info!(target: EVENT_LOG_TARGET, "{}", event)
            }
            Event::Rejected { .. } | Event::Dropped { .. } | Event::Mismatch { .. } => {
                log::warn!(target: EVENT_LOG_TARGET, "{}", event)
            }
            Event::ProcessingFailed { .. } => log::error!(target: EVENT_LOG_TARGET, "{}", event),
        }
    }
}

/// Prints one line per event to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, event: Event) {
        println!("{}", event);
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Event>>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Jobs reported as processed, in emission order
    pub fn processed_jobs(&self) -> Vec<Job> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Processed { job, .. } => Some(job.clone()),
                _ => None,
            })
            .collect()
    }

    /// Jobs reported as submitted, in emission order
    pub fn submitted_jobs(&self) -> Vec<Job> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Submitted { job, .. } => Some(job.clone()),
                _ => None,
            })
            .collect()
    }

    /// Rejected descriptors with their reasons, in emission order
    pub fn rejections(&self) -> Vec<(String, RejectReason)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Rejected {
                    descriptor, reason, ..
                } => Some((descriptor.clone(), reason.clone())),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}

/// Forwards events to a [`Receiver`] held by an observer.
///
/// Events emitted after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Event>,
}

impl ChannelSink {
    /// Create a sink and the receiver that observes it
    pub fn new() -> (Self, Receiver<Event>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}
