//! Bounded job queue and its backpressure policies.
//!
//! [`BoundedQueue`] is the only shared mutable resource of a run: producers
//! block in [`push`](BoundedQueue::push) while it is full, consumers block in
//! [`pop`](BoundedQueue::pop) while it is empty, and
//! [`close`](BoundedQueue::close) turns an empty queue into a permanent
//! end-of-stream.
//!
//! ```rust
//! use rust_work_queue::queue::{BoundedJobQueue, QueueError};
//! use rust_work_queue::core::{Job, JobKind};
//!
//! let queue = BoundedJobQueue::new(2);
//! queue.push(Job::new("a", JobKind::Text)).unwrap();
//! queue.close();
//!
//! assert_eq!(queue.pop().unwrap().name(), "a");
//! assert!(matches!(queue.pop(), Err(QueueError::EndOfStream)));
//! ```

mod backpressure;
mod bounded;

pub use backpressure::PushPolicy;
pub use bounded::{BoundedJobQueue, BoundedQueue, QueueStats};

use crate::core::WorkQueueError;
use std::fmt;

/// Errors that can occur during queue operations.
///
/// Failed pushes hand the item back so the caller decides what to do with it.
#[derive(Clone, PartialEq, Eq)]
pub enum QueueError<T> {
    /// Queue is full (for `try_push`)
    Full(T),
    /// Queue is closed and not accepting new items
    Closed(T),
    /// Push timed out waiting for space
    Timeout(T),
    /// Queue is empty (for `try_pop` and `pop_timeout`)
    Empty,
    /// Queue is closed and drained
    EndOfStream,
}

impl<T> QueueError<T> {
    /// Takes the rejected item out of a failed push.
    pub fn into_inner(self) -> Option<T> {
        match self {
            QueueError::Full(item) | QueueError::Closed(item) | QueueError::Timeout(item) => {
                Some(item)
            }
            QueueError::Empty | QueueError::EndOfStream => None,
        }
    }
}

impl<T> fmt::Debug for QueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full(_) => write!(f, "Full(..)"),
            QueueError::Closed(_) => write!(f, "Closed(..)"),
            QueueError::Timeout(_) => write!(f, "Timeout(..)"),
            QueueError::Empty => write!(f, "Empty"),
            QueueError::EndOfStream => write!(f, "EndOfStream"),
        }
    }
}

impl<T> fmt::Display for QueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Full(_) => write!(f, "queue is full"),
            QueueError::Closed(_) => write!(f, "queue is closed"),
            QueueError::Timeout(_) => write!(f, "timed out waiting for queue space"),
            QueueError::Empty => write!(f, "queue is empty"),
            QueueError::EndOfStream => write!(f, "end of stream"),
        }
    }
}

impl<T> std::error::Error for QueueError<T> {}

impl<T> From<QueueError<T>> for WorkQueueError {
    fn from(err: QueueError<T>) -> Self {
        WorkQueueError::other(err.to_string())
    }
}

/// Result type for queue operations.
pub type QueueResult<R, T> = std::result::Result<R, QueueError<T>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_inner() {
        assert_eq!(QueueError::Closed(7).into_inner(), Some(7));
        assert_eq!(QueueError::Full(1).into_inner(), Some(1));
        assert_eq!(QueueError::Timeout(2).into_inner(), Some(2));
        assert_eq!(QueueError::<i32>::EndOfStream.into_inner(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(QueueError::Closed(()).to_string(), "queue is closed");
        assert_eq!(QueueError::<()>::EndOfStream.to_string(), "end of stream");
        assert_eq!(format!("{:?}", QueueError::Full("x")), "Full(..)");
    }

    #[test]
    fn test_into_work_queue_error() {
        let err: WorkQueueError = QueueError::Closed(1).into();
        assert!(matches!(err, WorkQueueError::Other(_)));
        assert_eq!(err.to_string(), "queue is closed");
        let err: WorkQueueError = QueueError::<i32>::EndOfStream.into();
        assert_eq!(err.to_string(), "end of stream");
    }
}
