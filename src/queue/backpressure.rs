//! What a producer does when the queue is full.
//!
//! Blocking is the backpressure mechanism: a producer simply waits for a
//! consumer to free a slot. [`PushPolicy::BlockWithTimeout`] bounds that wait
//! for deployments that prefer dropping a job over stalling a producer.

use super::{BoundedQueue, QueueResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Strategy for pushing into a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PushPolicy {
    /// Block until space is available (default behavior).
    #[default]
    Block,

    /// Block with timeout; the job is handed back if the wait expires.
    BlockWithTimeout(Duration),
}

impl PushPolicy {
    /// Push `item` into `queue` according to this policy.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if the queue is closed, or `Timeout` if a bounded
    /// wait expired. Either way the item comes back inside the error.
    pub fn push<T>(&self, queue: &BoundedQueue<T>, item: T) -> QueueResult<(), T> {
        match *self {
            PushPolicy::Block => queue.push(item),
            PushPolicy::BlockWithTimeout(timeout) => queue.push_timeout(item, timeout),
        }
    }

    /// The timeout of a bounded policy, if any
    pub fn timeout(&self) -> Option<Duration> {
        match *self {
            PushPolicy::Block => None,
            PushPolicy::BlockWithTimeout(timeout) => Some(timeout),
        }
    }
}
