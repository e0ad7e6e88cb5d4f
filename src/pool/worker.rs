//! Worker thread handles and groups

use crate::core::{Result, WorkQueueError, WorkerIdentity, WorkerRole};
use serde::Serialize;
use std::any::Any;
use std::thread;
use std::time::{Duration, Instant};

/// How often a bounded join checks whether the thread has finished
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Grace period a dropped, un-joined handle waits before detaching its thread
const DROP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// A spawned worker thread whose body returns `Result<S>`
#[derive(Debug)]
pub struct WorkerHandle<S> {
    identity: WorkerIdentity,
    thread: Option<thread::JoinHandle<Result<S>>>,
}

impl<S: Send + 'static> WorkerHandle<S> {
    /// Spawn `body` on a named thread
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the OS refuses to create the thread
    pub fn spawn<F>(identity: WorkerIdentity, thread_name: String, body: F) -> Result<Self>
    where
        F: FnOnce() -> Result<S> + Send + 'static,
    {
        let thread = thread::Builder::new()
            .name(thread_name)
            .spawn(body)
            .map_err(|e| {
                WorkQueueError::spawn_with_source(identity.name(), "Cannot create thread", e)
            })?;

        log::debug!("{} started", identity);
        Ok(Self {
            identity,
            thread: Some(thread),
        })
    }
}

impl<S> WorkerHandle<S> {
    /// Identity of the worker
    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    /// Whether the thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Wait for the worker without a bound.
    ///
    /// # Errors
    ///
    /// Returns `WorkerPanic` if the thread panicked, or the error the worker
    /// body returned.
    pub fn join(mut self) -> Result<S> {
        match self.thread.take() {
            Some(thread) => match thread.join() {
                Ok(result) => result,
                Err(payload) => Err(WorkQueueError::worker_panic(
                    self.identity.name(),
                    panic_message(&*payload),
                )),
            },
            None => Err(WorkQueueError::other(format!(
                "{} was already joined",
                self.identity
            ))),
        }
    }

    /// Wait for the worker at most `timeout`.
    ///
    /// On expiry the thread is detached and keeps running on its own.
    ///
    /// # Errors
    ///
    /// Returns `JoinTimeout` on expiry, otherwise as [`join`](Self::join).
    pub fn join_timeout(self, timeout: Duration) -> Result<S> {
        self.join_deadline(Instant::now() + timeout, timeout)
    }

    fn join_deadline(mut self, deadline: Instant, timeout: Duration) -> Result<S> {
        while !self.is_finished() {
            if Instant::now() >= deadline {
                self.thread.take();
                log::warn!(
                    "{} did not finish within {}ms, detaching its thread",
                    self.identity,
                    timeout.as_millis()
                );
                return Err(WorkQueueError::join_timeout(
                    self.identity.name(),
                    timeout.as_millis() as u64,
                ));
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }
        self.join()
    }
}

impl<S> Drop for WorkerHandle<S> {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let start = Instant::now();
            while !thread.is_finished() {
                if start.elapsed() >= DROP_JOIN_TIMEOUT {
                    log::warn!(
                        "{} did not finish within {}s timeout during drop. Thread may be leaked.",
                        self.identity,
                        DROP_JOIN_TIMEOUT.as_secs()
                    );
                    return;
                }
                thread::sleep(JOIN_POLL_INTERVAL);
            }
            if let Err(payload) = thread.join() {
                log::error!(
                    "{} panicked during shutdown: {}",
                    self.identity,
                    panic_message(&*payload)
                );
            }
        }
    }
}

/// How a worker ended abnormally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The thread panicked
    Panicked,
    /// The worker body returned an error
    Errored,
    /// The worker did not finish within the join timeout
    TimedOut,
}

/// A worker that did not finish normally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerFailure {
    /// Display name of the worker
    pub worker: String,
    /// Worker role
    pub role: WorkerRole,
    /// Failure category
    pub kind: FailureKind,
    /// Failure description
    pub message: String,
}

impl WorkerFailure {
    fn new(identity: &WorkerIdentity, error: WorkQueueError) -> Self {
        let kind = match error {
            WorkQueueError::WorkerPanic { .. } => FailureKind::Panicked,
            WorkQueueError::JoinTimeout { .. } => FailureKind::TimedOut,
            _ => FailureKind::Errored,
        };
        Self {
            worker: identity.name().to_string(),
            role: identity.role(),
            kind,
            message: error.to_string(),
        }
    }
}

/// Results of joining a [`WorkerGroup`]
#[derive(Debug)]
pub struct GroupOutcome<S> {
    /// Workers that finished normally, in spawn order
    pub completed: Vec<(WorkerIdentity, S)>,
    /// Workers that ended abnormally, in spawn order
    pub failures: Vec<WorkerFailure>,
}

/// A fixed set of workers of one role, joined together
#[derive(Debug)]
pub struct WorkerGroup<S> {
    role: WorkerRole,
    handles: Vec<WorkerHandle<S>>,
}

impl<S> WorkerGroup<S> {
    /// Create an empty group
    pub fn new(role: WorkerRole) -> Self {
        Self {
            role,
            handles: Vec::new(),
        }
    }

    /// Role of the workers in this group
    pub fn role(&self) -> WorkerRole {
        self.role
    }

    /// Add a spawned worker
    pub fn push(&mut self, handle: WorkerHandle<S>) {
        debug_assert_eq!(handle.identity().role(), self.role);
        self.handles.push(handle);
    }

    /// Number of workers
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the group has no workers
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Join every worker, sharing one deadline when `timeout` is set.
    ///
    /// Abnormal endings are collected, never propagated, so a failed worker
    /// cannot prevent the rest of the group from being joined.
    pub fn join_all(self, timeout: Option<Duration>) -> GroupOutcome<S> {
        let deadline = timeout.map(|t| (Instant::now() + t, t));
        let mut outcome = GroupOutcome {
            completed: Vec::with_capacity(self.handles.len()),
            failures: Vec::new(),
        };

        for handle in self.handles {
            let identity = handle.identity().clone();
            let result = match deadline {
                Some((at, t)) => handle.join_deadline(at, t),
                None => handle.join(),
            };
            match result {
                Ok(stats) => outcome.completed.push((identity, stats)),
                Err(e) => {
                    log::error!("{} ended abnormally: {}", identity, e);
                    outcome.failures.push(WorkerFailure::new(&identity, e));
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorkerNames;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn identity(role: WorkerRole, index: usize) -> WorkerIdentity {
        WorkerNames::default().identity(role, index)
    }

    #[test]
    fn test_join_returns_worker_result() {
        let handle =
            WorkerHandle::spawn(identity(WorkerRole::Producer, 0), "t-0".to_string(), || Ok(7))
                .unwrap();
        assert_eq!(handle.identity().name(), "Producer 1");
        assert_eq!(handle.join().unwrap(), 7);
    }

    #[test]
    fn test_join_reports_panic() {
        let handle = WorkerHandle::<()>::spawn(
            identity(WorkerRole::Consumer, 0),
            "t-panic".to_string(),
            || panic!("Intentional panic for testing"),
        )
        .unwrap();

        match handle.join() {
            Err(WorkQueueError::WorkerPanic { worker, message }) => {
                assert_eq!(worker, "Consumer 1");
                assert_eq!(message, "Intentional panic for testing");
            }
            other => panic!("expected WorkerPanic, got {:?}", other),
        }
    }

    #[test]
    fn test_join_timeout_detaches() {
        let release = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&release);
        let handle = WorkerHandle::spawn(
            identity(WorkerRole::Consumer, 1),
            "t-slow".to_string(),
            move || {
                while !flag.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(1));
                }
                Ok(())
            },
        )
        .unwrap();

        let err = handle.join_timeout(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, WorkQueueError::JoinTimeout { timeout_ms: 20, .. }));
        release.store(true, Ordering::SeqCst);
    }

    #[test]
    fn test_group_collects_failures() {
        let mut group = WorkerGroup::new(WorkerRole::Producer);
        for index in 0..3 {
            let handle = WorkerHandle::spawn(
                identity(WorkerRole::Producer, index),
                format!("t-{}", index),
                move || match index {
                    1 => Err(WorkQueueError::queue_closed("Producer 2")),
                    2 => panic!("producer blew up"),
                    _ => Ok(index),
                },
            )
            .unwrap();
            group.push(handle);
        }
        assert_eq!(group.len(), 3);

        let outcome = group.join_all(Some(Duration::from_secs(5)));
        assert_eq!(outcome.completed.len(), 1);
        assert_eq!(outcome.completed[0].1, 0);

        let kinds: Vec<_> = outcome.failures.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FailureKind::Errored, FailureKind::Panicked]);
        assert_eq!(outcome.failures[1].worker, "Producer 3");
        assert!(outcome.failures[1].message.contains("producer blew up"));
    }

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*owned), "owned");
        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*other), "Unknown panic");
    }
}
