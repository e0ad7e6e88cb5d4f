//! Worker identities and display names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which side of the queue a worker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerRole {
    /// Submits jobs into the queue
    Producer,
    /// Drains jobs from the queue
    Consumer,
}

/// Stable identity of a worker, assigned at spawn time.
///
/// `index` is zero based; the display name uses the one based position
/// (`"Producer 1"` for index 0).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerIdentity {
    role: WorkerRole,
    index: usize,
    name: Arc<str>,
}

impl WorkerIdentity {
    /// Worker role
    pub fn role(&self) -> WorkerRole {
        self.role
    }

    /// Zero based spawn index within the role
    pub fn index(&self) -> usize {
        self.index
    }

    /// Display name such as `"Consumer 2"`
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Lookup table from `(role, index)` to display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerNames {
    /// Label used for producers
    pub producer_label: String,
    /// Label used for consumers
    pub consumer_label: String,
}

impl Default for WorkerNames {
    fn default() -> Self {
        Self::new("Producer", "Consumer")
    }
}

impl WorkerNames {
    /// Create a table with custom labels, e.g. `("Computer", "Printer")`
    pub fn new(producer_label: impl Into<String>, consumer_label: impl Into<String>) -> Self {
        Self {
            producer_label: producer_label.into(),
            consumer_label: consumer_label.into(),
        }
    }

    /// Label for a role
    pub fn label(&self, role: WorkerRole) -> &str {
        match role {
            WorkerRole::Producer => &self.producer_label,
            WorkerRole::Consumer => &self.consumer_label,
        }
    }

    /// Build the identity of the worker spawned at `index`
    pub fn identity(&self, role: WorkerRole, index: usize) -> WorkerIdentity {
        WorkerIdentity {
            role,
            index,
            name: Arc::from(format!("{} {}", self.label(role), index + 1)),
        }
    }
}
