//! Alert and monitored-entry data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProductRecord;

/// The transition that raised an alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertKind {
    /// A product seen for the first time while in stock
    #[serde(rename = "NEW")]
    New,
    /// A known product that went from out of stock to in stock
    #[serde(rename = "STOCK")]
    BackInStock,
}

impl AlertKind {
    /// Human-readable alert message for a product.
    pub fn message(&self, name: &str) -> String {
        match self {
            AlertKind::New => format!("New Product: {name}"),
            AlertKind::BackInStock => format!("Back in Stock: {name}"),
        }
    }

    /// Tag used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::New => "NEW PRODUCT",
            AlertKind::BackInStock => "BACK IN STOCK",
        }
    }
}

/// A timestamped alert shown in the alert history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub link: String,
    pub time: DateTime<Utc>,
}

impl Alert {
    /// Build an alert for `product`.
    pub fn new(kind: AlertKind, product: &ProductRecord, time: DateTime<Utc>) -> Self {
        Self {
            kind,
            message: kind.message(&product.name),
            link: product.link.clone(),
            time,
        }
    }
}

/// A product that recently raised an alert.
///
/// Serializes flat: the product fields plus `alert_type` and `alert_time`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitoredEntry {
    #[serde(flatten)]
    pub product: ProductRecord,

    #[serde(rename = "alert_type")]
    pub alert_kind: AlertKind,

    pub alert_time: DateTime<Utc>,
}

impl MonitoredEntry {
    /// Companion entry for an alert raised by `product`.
    pub fn for_alert(product: &ProductRecord, alert: &Alert) -> Self {
        Self {
            product: product.clone(),
            alert_kind: alert.kind,
            alert_time: alert.time,
        }
    }

    pub fn link(&self) -> &str {
        &self.product.link
    }
}
