//! Pluggable job processing for consumers

use crate::core::error::Result;
use crate::core::identity::WorkerIdentity;
use crate::core::job::Job;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Work a consumer performs on each popped job.
///
/// The consumer emits the processing record itself; a processor only adds
/// whatever side effect the job stands for. Errors and panics are reported
/// per job and never stop the consumer.
pub trait JobProcessor: Send + Sync {
    /// Process one job
    ///
    /// # Errors
    ///
    /// Returns an error if the job could not be processed
    fn process(&self, worker: &WorkerIdentity, job: &Job) -> Result<()>;
}

impl<F> JobProcessor for F
where
    F: Fn(&WorkerIdentity, &Job) -> Result<()> + Send + Sync,
{
    fn process(&self, worker: &WorkerIdentity, job: &Job) -> Result<()> {
        self(worker, job)
    }
}

/// Processor that does nothing beyond the consumer's processing record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProcessor;

impl JobProcessor for NoopProcessor {
    fn process(&self, _worker: &WorkerIdentity, _job: &Job) -> Result<()> {
        Ok(())
    }
}

/// Sleeps for a random duration per job to simulate device work.
#[derive(Debug, Clone)]
pub struct SimulatedWork {
    millis: RangeInclusive<u64>,
}

impl SimulatedWork {
    /// Sleep between `min` and `max` per job, picked uniformly
    pub fn between(min: Duration, max: Duration) -> Self {
        let lo = min.as_millis() as u64;
        let hi = (max.as_millis() as u64).max(lo);
        Self { millis: lo..=hi }
    }
}

impl JobProcessor for SimulatedWork {
    fn process(&self, _worker: &WorkerIdentity, _job: &Job) -> Result<()> {
        let ms = fastrand::u64(self.millis.clone());
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
        Ok(())
    }
}
