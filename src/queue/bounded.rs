//! Bounded FIFO queue with blocking push and pop.

use super::{QueueError, QueueResult};
use crate::core::Job;
use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// The queue shared by producers and consumers of a run.
pub type BoundedJobQueue = BoundedQueue<Job>;

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A bounded FIFO queue with a fixed capacity.
///
/// This is a monitor: one mutex around the item buffer and the closed flag,
/// with a `not_full` condition that pushers wait on and a `not_empty`
/// condition that poppers wait on. Items are delivered strictly in push order.
///
/// Once [`close`](Self::close) has been called, pushes fail with
/// [`QueueError::Closed`] and pops keep returning items until the buffer is
/// drained, then return [`QueueError::EndOfStream`] for every later call.
///
/// # Example
///
/// ```rust
/// use rust_work_queue::queue::{BoundedQueue, QueueError};
///
/// let queue = BoundedQueue::new(2);
/// queue.push(1).unwrap();
/// queue.push(2).unwrap();
///
/// // Queue is now full - try_push will fail
/// match queue.try_push(3) {
///     Err(QueueError::Full(item)) => assert_eq!(item, 3),
///     _ => panic!("expected Full error"),
/// }
/// ```
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    len: AtomicUsize,
    peak_len: AtomicUsize,
    total_pushed: AtomicU64,
    total_popped: AtomicU64,
}

/// Snapshot of queue counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Fixed capacity
    pub capacity: usize,
    /// Items currently buffered
    pub len: usize,
    /// Highest number of items ever buffered at once
    pub peak_len: usize,
    /// Items accepted by push
    pub total_pushed: u64,
    /// Items handed out by pop
    pub total_popped: u64,
    /// Whether the queue has been closed
    pub closed: bool,
}

impl<T> BoundedQueue<T> {
    /// Creates a new bounded queue with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            len: AtomicUsize::new(0),
            peak_len: AtomicUsize::new(0),
            total_pushed: AtomicU64::new(0),
            total_popped: AtomicU64::new(0),
        }
    }

    /// Returns the maximum capacity of this queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `item`, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] with the item if the queue is closed,
    /// including when it is closed while this call is waiting for space.
    pub fn push(&self, item: T) -> QueueResult<(), T> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(QueueError::Closed(item));
            }
            if state.items.len() < self.capacity {
                break;
            }
            self.not_full.wait(&mut state);
        }
        self.enqueue(&mut state, item);
        Ok(())
    }

    /// Appends `item` if there is space right now.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] or [`QueueError::Closed`] with the item.
    pub fn try_push(&self, item: T) -> QueueResult<(), T> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(QueueError::Closed(item));
        }
        if state.items.len() >= self.capacity {
            return Err(QueueError::Full(item));
        }
        self.enqueue(&mut state, item);
        Ok(())
    }

    /// Appends `item`, waiting at most `timeout` for space.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Timeout`] or [`QueueError::Closed`] with the item.
    pub fn push_timeout(&self, item: T, timeout: Duration) -> QueueResult<(), T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(QueueError::Closed(item));
            }
            if state.items.len() < self.capacity {
                break;
            }
            if self.not_full.wait_until(&mut state, deadline).timed_out() {
                if state.closed {
                    return Err(QueueError::Closed(item));
                }
                if state.items.len() < self.capacity {
                    break;
                }
                return Err(QueueError::Timeout(item));
            }
        }
        self.enqueue(&mut state, item);
        Ok(())
    }

    /// Removes the head, blocking while the queue is empty and open.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EndOfStream`] once the queue is closed and empty.
    pub fn pop(&self) -> QueueResult<T, T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = self.dequeue(&mut state) {
                return Ok(item);
            }
            if state.closed {
                return Err(QueueError::EndOfStream);
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Removes the head if one is available right now.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if nothing is buffered, or
    /// [`QueueError::EndOfStream`] if the queue is closed and drained.
    pub fn try_pop(&self) -> QueueResult<T, T> {
        let mut state = self.state.lock();
        match self.dequeue(&mut state) {
            Some(item) => Ok(item),
            None if state.closed => Err(QueueError::EndOfStream),
            None => Err(QueueError::Empty),
        }
    }

    /// Removes the head, waiting at most `timeout` for one to arrive.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] on timeout, or
    /// [`QueueError::EndOfStream`] if the queue is closed and drained.
    pub fn pop_timeout(&self, timeout: Duration) -> QueueResult<T, T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(item) = self.dequeue(&mut state) {
                return Ok(item);
            }
            if state.closed {
                return Err(QueueError::EndOfStream);
            }
            if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                return match self.dequeue(&mut state) {
                    Some(item) => Ok(item),
                    None if state.closed => Err(QueueError::EndOfStream),
                    None => Err(QueueError::Empty),
                };
            }
        }
    }

    /// Marks the queue closed and wakes every blocked caller.
    ///
    /// Idempotent. Returns `true` only for the call that actually closed the
    /// queue. Buffered items stay available to `pop`.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        drop(state);

        self.not_empty.notify_all();
        self.not_full.notify_all();
        true
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of buffered items. Does not take the lock; the value may be
    /// stale by the time it is used.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Whether nothing is buffered (same caveat as [`len`](Self::len)).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the buffer is at capacity (same caveat as [`len`](Self::len)).
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Free slots (same caveat as [`len`](Self::len)).
    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Highest number of items ever buffered at once.
    pub fn peak_len(&self) -> usize {
        self.peak_len.load(Ordering::Acquire)
    }

    /// Snapshot of the queue counters.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            capacity: self.capacity,
            len: self.len(),
            peak_len: self.peak_len(),
            total_pushed: self.total_pushed.load(Ordering::Relaxed),
            total_popped: self.total_popped.load(Ordering::Relaxed),
            closed: self.is_closed(),
        }
    }

    fn enqueue(&self, state: &mut MutexGuard<'_, State<T>>, item: T) {
        state.items.push_back(item);
        let len = state.items.len();
        debug_assert!(len <= self.capacity);
        self.len.store(len, Ordering::Release);
        self.peak_len.fetch_max(len, Ordering::AcqRel);
        self.total_pushed.fetch_add(1, Ordering::Relaxed);
        self.not_empty.notify_one();
    }

    fn dequeue(&self, state: &mut MutexGuard<'_, State<T>>) -> Option<T> {
        let item = state.items.pop_front()?;
        self.len.store(state.items.len(), Ordering::Release);
        self.total_popped.fetch_add(1, Ordering::Relaxed);
        self.not_full.notify_one();
        Some(item)
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
