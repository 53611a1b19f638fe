//! Transient failure blacklist for mirror URLs.
//!
//! A mirror that failed is skipped by later resolutions until either it
//! succeeds again or the current epoch ends, at which point the whole set is
//! cleared. The set is process-local and never persisted.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use crate::clock::elapsed_since;

/// Set of recently failed mirror URLs with an epoch-based reset.
#[derive(Debug, Clone)]
pub struct FailureBlacklist {
    /// URL -> time of the most recent failure.
    entries: BTreeMap<String, SystemTime>,
    epoch: Duration,
    epoch_started: SystemTime,
}

impl FailureBlacklist {
    pub fn new(epoch: Duration, now: SystemTime) -> Self {
        Self {
            entries: BTreeMap::new(),
            epoch,
            epoch_started: now,
        }
    }

    /// Clear everything if the epoch has elapsed. Returns true if a reset happened.
    pub fn maybe_reset(&mut self, now: SystemTime) -> bool {
        if elapsed_since(now, self.epoch_started) < self.epoch {
            return false;
        }
        let dropped = self.entries.len();
        self.entries.clear();
        self.epoch_started = now;
        if dropped > 0 {
            tracing::debug!(dropped, "blacklist epoch elapsed, mirrors eligible again");
        }
        true
    }

    pub fn record_failure(&mut self, url: &str, now: SystemTime) {
        self.entries.insert(url.to_string(), now);
    }

    /// Remove `url` after a successful fetch.
    pub fn record_success(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Blacklisted URLs in sorted order.
    pub fn urls(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
