//! Configuration for a work queue run.

use crate::core::{Result, SupportedTypes, WorkQueueError, WorkerNames};
use crate::queue::PushPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable for the queue capacity
pub const ENV_CAPACITY: &str = "WORK_QUEUE_CAPACITY";
/// Environment variable for the producer count
pub const ENV_PRODUCERS: &str = "WORK_QUEUE_PRODUCERS";
/// Environment variable for the consumer count
pub const ENV_CONSUMERS: &str = "WORK_QUEUE_CONSUMERS";
/// Environment variable for the supported type list, e.g. `text,pdf`
pub const ENV_TYPES: &str = "WORK_QUEUE_TYPES";
/// Environment variable for a bounded push wait in milliseconds
pub const ENV_PUSH_TIMEOUT_MS: &str = "WORK_QUEUE_PUSH_TIMEOUT_MS";

/// Configuration for a work queue run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkQueueConfig {
    /// Fixed capacity of the shared queue
    pub queue_capacity: usize,
    /// Number of producer workers
    pub producers: usize,
    /// Number of consumer workers
    pub consumers: usize,
    /// Job kinds producers accept and consumers process
    pub supported_types: SupportedTypes,
    /// How producers push into a full queue.
    /// Default: Block
    pub push_policy: PushPolicy,
    /// Upper bound on waiting for consumers to drain once the queue is
    /// closed (`None` waits forever). Producers are always joined without a
    /// bound, so the queue is never closed under a live producer.
    /// Default: None
    pub join_timeout: Option<Duration>,
    /// Display labels for workers
    pub names: WorkerNames,
    /// Thread name prefix
    pub thread_name_prefix: String,
}

impl Default for WorkQueueConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 5,
            producers: 3,
            consumers: 2,
            supported_types: SupportedTypes::default(),
            push_policy: PushPolicy::default(),
            join_timeout: None,
            names: WorkerNames::default(),
            thread_name_prefix: "work-queue".to_string(),
        }
    }
}

impl WorkQueueConfig {
    /// Create a configuration with the given capacity and worker counts
    #[must_use]
    pub fn new(queue_capacity: usize, producers: usize, consumers: usize) -> Self {
        Self {
            queue_capacity,
            producers,
            consumers,
            ..Default::default()
        }
    }

    /// Set queue capacity
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set producer count
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_producers(mut self, producers: usize) -> Self {
        self.producers = producers;
        self
    }

    /// Set consumer count
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_consumers(mut self, consumers: usize) -> Self {
        self.consumers = consumers;
        self
    }

    /// Set the supported job kinds
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_supported_types(mut self, types: SupportedTypes) -> Self {
        self.supported_types = types;
        self
    }

    /// Set the push policy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rust_work_queue::prelude::*;
    /// use std::time::Duration;
    ///
    /// let config = WorkQueueConfig::default()
    ///     .with_push_policy(PushPolicy::BlockWithTimeout(Duration::from_secs(5)));
    /// assert!(config.validate().is_ok());
    /// ```
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_push_policy(mut self, policy: PushPolicy) -> Self {
        self.push_policy = policy;
        self
    }

    /// Set the join timeout (`None` waits without bound)
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_join_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Set display labels, e.g. `("Computer", "Printer")`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_labels<P: Into<String>, C: Into<String>>(mut self, producer: P, consumer: C) -> Self {
        self.names = WorkerNames::new(producer, consumer);
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| WorkQueueError::invalid_config("json", e.to_string()))
    }

    /// Serialize this configuration as JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| WorkQueueError::other(e.to_string()))
    }

    /// Defaults overridden by `WORK_QUEUE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `WORK_QUEUE_*` key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_CAPACITY) {
            config.queue_capacity = parse_count(ENV_CAPACITY, &value)?;
        }
        if let Some(value) = lookup(ENV_PRODUCERS) {
            config.producers = parse_count(ENV_PRODUCERS, &value)?;
        }
        if let Some(value) = lookup(ENV_CONSUMERS) {
            config.consumers = parse_count(ENV_CONSUMERS, &value)?;
        }
        if let Some(value) = lookup(ENV_TYPES) {
            config.supported_types = SupportedTypes::parse_list(&value).map_err(|token| {
                WorkQueueError::invalid_config(ENV_TYPES, format!("unknown job type '{}'", token))
            })?;
        }
        if let Some(value) = lookup(ENV_PUSH_TIMEOUT_MS) {
            let ms = value.trim().parse::<u64>().map_err(|e| {
                WorkQueueError::invalid_config(ENV_PUSH_TIMEOUT_MS, e.to_string())
            })?;
            config.push_policy = PushPolicy::BlockWithTimeout(Duration::from_millis(ms));
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(WorkQueueError::invalid_config(
                "queue_capacity",
                "Queue capacity must be greater than 0",
            ));
        }
        if self.producers == 0 {
            return Err(WorkQueueError::invalid_config(
                "producers",
                "Number of producers must be greater than 0",
            ));
        }
        if self.consumers == 0 {
            return Err(WorkQueueError::invalid_config(
                "consumers",
                "Number of consumers must be greater than 0",
            ));
        }
        if self.supported_types.is_empty() {
            return Err(WorkQueueError::invalid_config(
                "supported_types",
                "At least one job type must be supported",
            ));
        }
        if let Some(timeout) = self.push_policy.timeout() {
            if timeout.is_zero() {
                return Err(WorkQueueError::invalid_config(
                    "push_policy",
                    "Push timeout must be non-zero",
                ));
            }
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| WorkQueueError::invalid_config(key, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::JobKind;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = WorkQueueConfig::default();
        assert_eq!(config.queue_capacity, 5);
        assert_eq!(config.producers, 3);
        assert_eq!(config.consumers, 2);
        assert_eq!(config.push_policy, PushPolicy::Block);
        assert_eq!(config.join_timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = WorkQueueConfig::new(2, 2, 2)
            .with_labels("Computer", "Printer")
            .with_supported_types(SupportedTypes::only([JobKind::Pdf]))
            .with_join_timeout(Some(Duration::from_secs(5)))
            .with_thread_name_prefix("spool");

        assert_eq!(config.queue_capacity, 2);
        assert_eq!(config.names.producer_label, "Computer");
        assert_eq!(config.names.consumer_label, "Printer");
        assert!(config.supported_types.contains(JobKind::Pdf));
        assert_eq!(config.join_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.thread_name_prefix, "spool");
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        for (config, parameter) in [
            (WorkQueueConfig::new(0, 1, 1), "queue_capacity"),
            (WorkQueueConfig::new(1, 0, 1), "producers"),
            (WorkQueueConfig::new(1, 1, 0), "consumers"),
        ] {
            match config.validate() {
                Err(WorkQueueError::InvalidConfig { parameter: p, .. }) => assert_eq!(p, parameter),
                other => panic!("expected InvalidConfig for {}, got {:?}", parameter, other),
            }
        }
    }

    #[test]
    fn test_validate_rejects_empty_types_and_zero_timeout() {
        let config = WorkQueueConfig::default().with_supported_types(SupportedTypes::only([]));
        assert!(config.validate().is_err());

        let config = WorkQueueConfig::default()
            .with_push_policy(PushPolicy::BlockWithTimeout(Duration::ZERO));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_CAPACITY, "2"),
            (ENV_PRODUCERS, " 4 "),
            (ENV_CONSUMERS, "1"),
            (ENV_TYPES, "txt,png"),
            (ENV_PUSH_TIMEOUT_MS, "250"),
        ]
        .into_iter()
        .collect();

        let config =
            WorkQueueConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.queue_capacity, 2);
        assert_eq!(config.producers, 4);
        assert_eq!(config.consumers, 1);
        assert_eq!(
            config.supported_types,
            SupportedTypes::only([JobKind::Text, JobKind::Image])
        );
        assert_eq!(
            config.push_policy,
            PushPolicy::BlockWithTimeout(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = WorkQueueConfig::from_lookup(|key| {
            (key == ENV_PRODUCERS).then(|| "many".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, WorkQueueError::InvalidConfig { .. }));

        let err =
            WorkQueueConfig::from_lookup(|key| (key == ENV_TYPES).then(|| "gif".to_string()))
                .unwrap_err();
        assert!(err.to_string().contains("gif"));

        let err =
            WorkQueueConfig::from_lookup(|key| (key == ENV_CAPACITY).then(|| "0".to_string()))
                .unwrap_err();
        assert!(err.to_string().contains("queue_capacity"));
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let config = WorkQueueConfig::from_json(r#"{"queue_capacity": 2, "consumers": 4}"#).unwrap();
        assert_eq!(config.queue_capacity, 2);
        assert_eq!(config.consumers, 4);
        assert_eq!(config.producers, 3);

        let json = config.to_json().unwrap();
        assert_eq!(WorkQueueConfig::from_json(&json).unwrap(), config);

        assert!(WorkQueueConfig::from_json("{not json").is_err());
    }
}
