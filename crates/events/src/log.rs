//! Bounded operation log
//!
//! A capped, append-only record of operation events kept for audit and
//! troubleshooting. The orchestrator owns the single writer; observers
//! only ever receive cloned snapshots.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppEvent;

/// One logged event: a severity-free message key plus its parameters,
/// so the presentation layer can re-localize after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub key: String,
    pub parameters: Vec<String>,
}

/// Bounded FIFO of log entries. Appending past the capacity evicts the
/// oldest entry, preserving insertion order of the remainder.
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<EventLogEntry>,
    capacity: usize,
}

impl EventLog {
    /// Create a log holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry derived from an event.
    pub fn record(&mut self, event: &AppEvent) {
        self.push(event.message_key(), event.parameters());
    }

    /// Append a raw key/parameters entry.
    pub fn push(&mut self, key: impl Into<String>, parameters: Vec<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(EventLogEntry {
            timestamp: Utc::now(),
            key: key.into(),
            parameters,
        });
    }

    /// Read-only snapshot for observers.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EventLogEntry> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
