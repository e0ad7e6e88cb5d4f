//! # Rust Work Queue
//!
//! A bounded multi-producer/multi-consumer work queue with blocking
//! backpressure and a clean, deterministic shutdown.
//!
//! ## Features
//!
//! - **Bounded Queue**: FIFO monitor queue that blocks producers when full
//! - **Close Semantics**: Consumers drain pending jobs, then observe end of stream
//! - **Classification**: Descriptors are accepted or rejected by file type before submission
//! - **Worker Groups**: Named producer and consumer threads joined with an optional timeout
//! - **Run Reports**: Per-worker counters, queue peak and worker failures as JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_work_queue::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let orchestrator = Orchestrator::new(WorkQueueConfig::new(5, 3, 2))?;
//! let report = orchestrator.run(builtin_descriptors())?;
//!
//! assert_eq!(report.processed(), 7);
//! assert_eq!(report.rejected(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use rust_work_queue::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let config = WorkQueueConfig::new(10, 4, 2)
//!     .with_supported_types(SupportedTypes::only([JobKind::Pdf, JobKind::Text]))
//!     .with_push_policy(PushPolicy::BlockWithTimeout(Duration::from_millis(500)))
//!     .with_labels("Computer", "Printer");
//! config.validate()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the Queue Directly
//!
//! ```rust
//! use rust_work_queue::prelude::*;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(BoundedQueue::new(2));
//! let consumer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         let mut sum = 0;
//!         while let Ok(n) = queue.pop() {
//!             sum += n;
//!         }
//!         sum
//!     })
//! };
//!
//! for n in 1..=10 {
//!     queue.push(n).unwrap();
//! }
//! queue.close();
//! assert_eq!(consumer.join().unwrap(), 55);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod input;
pub mod pool;
pub mod prelude;
pub mod queue;
#[cfg(feature = "tracing")]
pub mod telemetry;

pub use core::{Job, JobKind, Result, WorkQueueError};
pub use pool::{Orchestrator, RunReport, WorkQueueConfig};
pub use queue::{BoundedJobQueue, BoundedQueue};
