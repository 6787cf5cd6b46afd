//! Published monitor state.
//!
//! The monitor loop is the only writer. Each cycle builds a complete
//! [`MonitorState`] and swaps it in through a `watch` channel. Readers clone
//! the current `Arc` and never see a half-applied cycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::models::Snapshot;

use super::history::{AlertHistory, MonitoredCache};
use super::query::DashboardView;

/// Where the monitor loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Fetching,
    Extracting,
    Diffing,
    Applying,
    Sleeping,
    Stopped,
}

/// Everything the query path can see, as of one point of the writer.
#[derive(Debug, Clone)]
pub struct MonitorState {
    /// Latest successfully extracted snapshot
    pub snapshot: Arc<Snapshot>,
    pub alerts: AlertHistory,
    pub monitored: MonitoredCache,
    /// Time of the last successful cycle, `None` before the first one
    pub last_updated: Option<DateTime<Utc>>,
    /// True while a cycle is in progress
    pub busy: bool,
    pub phase: Phase,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(Snapshot::new()),
            alerts: AlertHistory::new(),
            monitored: MonitoredCache::new(),
            last_updated: None,
            busy: false,
            phase: Phase::Idle,
        }
    }
}

/// Create the writer/reader pair around an empty state.
pub fn state_channel() -> (StatePublisher, StateReader) {
    let (tx, rx) = watch::channel(Arc::new(MonitorState::default()));
    (StatePublisher { tx }, StateReader { rx })
}

/// Write side, owned by the monitor loop.
#[derive(Debug)]
pub struct StatePublisher {
    tx: watch::Sender<Arc<MonitorState>>,
}

impl StatePublisher {
    /// The state as last published.
    pub fn current(&self) -> Arc<MonitorState> {
        Arc::clone(&self.tx.borrow())
    }

    /// Replace the whole state in one step.
    pub fn publish(&self, state: MonitorState) {
        self.tx.send_replace(Arc::new(state));
    }

    /// Apply a small edit (busy flag, phase) to a copy of the current state
    /// and publish it.
    pub fn update(&self, edit: impl FnOnce(&mut MonitorState)) {
        self.tx.send_modify(|state| edit(Arc::make_mut(state)));
    }

    /// A new read handle.
    pub fn subscribe(&self) -> StateReader {
        StateReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side, cheap to clone and hand to request handlers.
#[derive(Debug, Clone)]
pub struct StateReader {
    rx: watch::Receiver<Arc<MonitorState>>,
}

impl StateReader {
    /// The most recently published state.
    pub fn current(&self) -> Arc<MonitorState> {
        Arc::clone(&self.rx.borrow())
    }

    /// The external view of the current state.
    pub fn view(&self) -> DashboardView {
        DashboardView::from_state(&self.current())
    }
}
