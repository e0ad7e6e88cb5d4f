//! Core types and traits for the work queue

pub mod error;
pub mod event;
pub mod identity;
pub mod job;
pub mod processor;

pub use error::{RejectReason, Result, WorkQueueError};
pub use event::{ChannelSink, CollectingSink, Event, EventSink, LogSink, StdoutSink};
pub use identity::{WorkerIdentity, WorkerNames, WorkerRole};
pub use job::{Classification, Job, JobKind, SupportedTypes};
pub use processor::{JobProcessor, NoopProcessor, SimulatedWork};
