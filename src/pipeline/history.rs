//! Bounded, newest-first collections kept by the monitor.
//!
//! Both collections insert at the front and drop from the back once full:
//! - [`AlertHistory`]: the last [`ALERT_CAPACITY`] alerts;
//! - [`MonitoredCache`]: up to [`MONITORED_CAPACITY`] recently alerted
//!   products, filtered every cycle down to those still listed in stock.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use crate::models::{Alert, MonitoredEntry, Snapshot};

/// Maximum number of alerts kept in history.
pub const ALERT_CAPACITY: usize = 50;

/// Maximum number of entries in the monitored cache.
pub const MONITORED_CAPACITY: usize = 20;

/// A list capped at `capacity` entries with the newest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedList<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedList<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the front, returning the entries dropped from the back.
    pub fn push_front(&mut self, item: T) -> Vec<T> {
        self.items.push_front(item);
        let mut dropped = Vec::new();
        while self.items.len() > self.capacity {
            if let Some(oldest) = self.items.pop_back() {
                dropped.push(oldest);
            }
        }
        dropped
    }

    /// Keep only the entries matching `keep`, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> BoundedList<T> {
    /// Ordered copy of the entries, newest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

/// Alert history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AlertHistory {
    alerts: BoundedList<Alert>,
}

impl AlertHistory {
    pub fn new() -> Self {
        Self {
            alerts: BoundedList::with_capacity(ALERT_CAPACITY),
        }
    }

    /// Add an alert in front of all others.
    pub fn prepend(&mut self, alert: Alert) {
        self.alerts.push_front(alert);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn to_vec(&self) -> Vec<Alert> {
        self.alerts.to_vec()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl Default for AlertHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Recently alerted products that are still in stock, newest first.
///
/// No two entries share a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MonitoredCache {
    entries: BoundedList<MonitoredEntry>,
}

impl MonitoredCache {
    pub fn new() -> Self {
        Self {
            entries: BoundedList::with_capacity(MONITORED_CAPACITY),
        }
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.entries.iter().any(|e| e.link() == link)
    }

    /// Add `entry` in front unless its link is already cached.
    ///
    /// Returns whether the entry was inserted.
    pub fn prepend(&mut self, entry: MonitoredEntry) -> bool {
        if self.contains_link(entry.link()) {
            return false;
        }
        self.entries.push_front(entry);
        true
    }

    /// Drop every entry whose link is not listed in stock in `snapshot`.
    ///
    /// Returns the number of entries removed.
    pub fn retain_in_stock(&mut self, snapshot: &Snapshot) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| snapshot.is_listed_in_stock(entry.link()));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonitoredEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<MonitoredEntry> {
        self.entries.to_vec()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MonitoredCache {
    fn default() -> Self {
        Self::new()
    }
}
