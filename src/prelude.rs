//! Convenient re-exports for common types and traits

pub use crate::core::{
    ChannelSink, Classification, CollectingSink, Event, EventSink, Job, JobKind, JobProcessor,
    LogSink, NoopProcessor, RejectReason, Result, SimulatedWork, StdoutSink, SupportedTypes,
    WorkQueueError, WorkerIdentity, WorkerNames, WorkerRole,
};
pub use crate::input::{builtin_descriptors, read_descriptors};
pub use crate::pool::{
    ConsumerStats, FailureKind, Orchestrator, ProducerStats, RunReport, WorkQueueConfig,
    WorkerFailure,
};
pub use crate::queue::{BoundedJobQueue, BoundedQueue, PushPolicy, QueueError};
