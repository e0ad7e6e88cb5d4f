//! Worker threads and the run lifecycle around the shared queue

pub mod config;
pub mod consumer;
pub mod orchestrator;
pub mod producer;
pub mod worker;

pub use config::WorkQueueConfig;
pub use consumer::{Consumer, ConsumerStats};
pub use orchestrator::{partition, Orchestrator, RunReport, WorkerSummary};
pub use producer::{Producer, ProducerStats};
pub use worker::{FailureKind, GroupOutcome, WorkerFailure, WorkerGroup, WorkerHandle};
