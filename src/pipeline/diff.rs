//! Diff calculation between stock observations.
//!
//! Compares a freshly extracted snapshot against the cumulative "seen" map
//! (product id -> last known stock flag) and decides which products raise an
//! alert:
//!
//! - an unseen product that is in stock raises `New` (except on the first run);
//! - a known product going from out of stock to in stock raises `BackInStock`.
//!
//! Every other transition is silent. In particular in stock -> out of stock
//! raises nothing; it only drops the product from the monitored cache later.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::models::{Alert, AlertKind, MonitoredEntry, ProductId, Snapshot};

use super::history::MonitoredCache;

/// Cumulative map from product id to its last observed stock flag.
///
/// Only ever grows: products that leave the catalog keep their entry.
pub type SeenSet = HashMap<ProductId, bool>;

/// Outcome of one diff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    /// The seen map updated with every product of the snapshot
    pub seen: SeenSet,
    /// Alerts in emission (snapshot) order
    pub alerts: Vec<Alert>,
    /// Companion monitored entries, in the same order, minus links already cached
    pub monitored: Vec<MonitoredEntry>,
}

impl DiffResult {
    /// Check if any alert was raised.
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Number of alerts of the given kind.
    pub fn count(&self, kind: AlertKind) -> usize {
        self.alerts.iter().filter(|a| a.kind == kind).count()
    }
}

/// Diff `snapshot` against `previous`.
///
/// Pure: the same inputs always give the same result. `monitored` is only
/// consulted to avoid producing a companion entry for a link that is already
/// cached.
pub fn calculate_diff(
    previous: &SeenSet,
    snapshot: &Snapshot,
    first_run: bool,
    monitored: &MonitoredCache,
    now: DateTime<Utc>,
) -> DiffResult {
    let mut seen = previous.clone();
    let mut alerts = Vec::new();
    let mut entries = Vec::new();
    let mut linked: HashSet<&str> = HashSet::new();

    for (id, product) in snapshot.iter() {
        let kind = match seen.insert(id.clone(), product.in_stock) {
            None if !first_run && product.in_stock => Some(AlertKind::New),
            Some(false) if product.in_stock => Some(AlertKind::BackInStock),
            _ => None,
        };

        let Some(kind) = kind else {
            continue;
        };

        let alert = Alert::new(kind, product, now);
        if !monitored.contains_link(&product.link) && linked.insert(product.link.as_str()) {
            entries.push(MonitoredEntry::for_alert(product, &alert));
        }
        alerts.push(alert);
    }

    DiffResult {
        seen,
        alerts,
        monitored: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductRecord;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    fn snapshot(items: &[(&str, bool)]) -> Snapshot {
        items
            .iter()
            .map(|(id, in_stock)| {
                (
                    id.to_string(),
                    ProductRecord {
                        name: format!("Product {id}"),
                        link: id.to_string(),
                        image: String::new(),
                        in_stock: *in_stock,
                    },
                )
            })
            .collect()
    }

    fn seen(items: &[(&str, bool)]) -> SeenSet {
        items.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    #[test]
    fn test_first_run_raises_nothing() {
        let result = calculate_diff(
            &SeenSet::new(),
            &snapshot(&[("A", true), ("B", false)]),
            true,
            &MonitoredCache::new(),
            now(),
        );

        assert!(!result.has_alerts());
        assert!(result.monitored.is_empty());
        assert_eq!(result.seen, seen(&[("A", true), ("B", false)]));
    }

    #[test]
    fn test_new_product_in_stock() {
        let result = calculate_diff(
            &seen(&[("A", true)]),
            &snapshot(&[("A", true), ("B", true)]),
            false,
            &MonitoredCache::new(),
            now(),
        );

        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].kind, AlertKind::New);
        assert_eq!(result.alerts[0].message, "New Product: Product B");
        assert_eq!(result.alerts[0].link, "B");
        assert_eq!(result.alerts[0].time, now());
        assert_eq!(result.monitored.len(), 1);
        assert_eq!(result.monitored[0].alert_kind, AlertKind::New);
    }

    #[test]
    fn test_new_product_out_of_stock_is_silent_but_seen() {
        let result = calculate_diff(
            &SeenSet::new(),
            &snapshot(&[("B", false)]),
            false,
            &MonitoredCache::new(),
            now(),
        );

        assert!(!result.has_alerts());
        assert_eq!(result.seen.get("B"), Some(&false));
    }

    #[test]
    fn test_back_in_stock() {
        let result = calculate_diff(
            &seen(&[("A", false)]),
            &snapshot(&[("A", true)]),
            false,
            &MonitoredCache::new(),
            now(),
        );

        assert_eq!(result.count(AlertKind::BackInStock), 1);
        assert_eq!(result.alerts[0].message, "Back in Stock: Product A");
        assert_eq!(result.seen.get("A"), Some(&true));
    }

    #[test]
    fn test_back_in_stock_applies_even_on_first_run_flag() {
        let result = calculate_diff(
            &seen(&[("A", false)]),
            &snapshot(&[("A", true)]),
            true,
            &MonitoredCache::new(),
            now(),
        );

        assert_eq!(result.count(AlertKind::BackInStock), 1);
    }

    #[test]
    fn test_going_out_of_stock_is_silent() {
        let result = calculate_diff(
            &seen(&[("A", true)]),
            &snapshot(&[("A", false)]),
            false,
            &MonitoredCache::new(),
            now(),
        );

        assert!(!result.has_alerts());
        assert_eq!(result.seen.get("A"), Some(&false));
    }

    #[test]
    fn test_missing_products_stay_seen() {
        let result = calculate_diff(
            &seen(&[("A", false), ("Z", true)]),
            &snapshot(&[("A", false)]),
            false,
            &MonitoredCache::new(),
            now(),
        );

        assert_eq!(result.seen.len(), 2);
        assert_eq!(result.seen.get("Z"), Some(&true));
    }

    #[test]
    fn test_alerts_follow_snapshot_order() {
        let result = calculate_diff(
            &seen(&[("A", false)]),
            &snapshot(&[("C", true), ("A", true), ("B", true)]),
            false,
            &MonitoredCache::new(),
            now(),
        );

        let links: Vec<&str> = result.alerts.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(links, vec!["C", "A", "B"]);
        let kinds: Vec<AlertKind> = result.alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::New, AlertKind::BackInStock, AlertKind::New]
        );
    }

    #[test]
    fn test_cached_link_gets_no_companion_entry() {
        let mut cache = MonitoredCache::new();
        let earlier = snapshot(&[("A", true)]);
        let record = earlier.get("A").unwrap();
        let alert = Alert::new(AlertKind::New, record, now());
        cache.prepend(MonitoredEntry::for_alert(record, &alert));

        let result = calculate_diff(
            &seen(&[("A", false)]),
            &snapshot(&[("A", true)]),
            false,
            &cache,
            now(),
        );

        assert_eq!(result.alerts.len(), 1);
        assert!(result.monitored.is_empty());
    }

    #[test]
    fn test_diff_is_idempotent() {
        let previous = seen(&[("A", false), ("B", true)]);
        let current = snapshot(&[("A", true), ("B", true), ("C", true)]);
        let cache = MonitoredCache::new();

        let first = calculate_diff(&previous, &current, false, &cache, now());
        let second = calculate_diff(&previous, &current, false, &cache, now());

        assert_eq!(first, second);
        assert_eq!(first.alerts.len(), 2);
    }
}
