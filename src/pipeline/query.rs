//! Read-only projection served to the query front-end.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Alert, MonitoredEntry, Snapshot};

use super::state::MonitorState;

/// The external view of the monitor.
///
/// Field names are part of the wire format of `/api/data`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// In-stock products keyed by id, in page order
    pub products: Snapshot,
    pub monitored_products: Vec<MonitoredEntry>,
    pub alerts: Vec<Alert>,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_scraping: bool,
    /// Number of in-stock products
    pub total_count: usize,
}

impl DashboardView {
    pub fn from_state(state: &MonitorState) -> Self {
        let products = state.snapshot.in_stock();
        Self {
            total_count: products.len(),
            products,
            monitored_products: state.monitored.to_vec(),
            alerts: state.alerts.to_vec(),
            last_updated: state.last_updated,
            is_scraping: state.busy,
        }
    }
}
