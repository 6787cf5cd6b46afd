//! Product record and snapshot data structures.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Stable product key.
///
/// Derived from the product's canonical link; the default extractor uses the
/// resolved absolute link itself, so a product's id and `link` coincide.
pub type ProductId = String;

/// A product as extracted from one listing block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRecord {
    /// Display name
    pub name: String,

    /// Absolute product link
    pub link: String,

    /// Image URL (empty when the block has none)
    #[serde(default)]
    pub image: String,

    /// Whether the product can currently be added to the cart
    pub in_stock: bool,
}

/// The full product map produced by one extraction.
///
/// Iteration follows insertion (page) order. Re-inserting an existing id
/// replaces its record but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<(ProductId, ProductRecord)>,
    index: HashMap<ProductId, usize>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the record it replaced, if any.
    pub fn insert(&mut self, id: impl Into<ProductId>, record: ProductRecord) -> Option<ProductRecord> {
        let id = id.into();
        match self.index.get(&id) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, record)),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, record));
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ProductRecord> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(id, record)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &ProductRecord)> {
        self.entries.iter().map(|(id, record)| (id, record))
    }

    /// Whether `link` is listed in this snapshot and currently in stock.
    pub fn is_listed_in_stock(&self, link: &str) -> bool {
        self.get(link).is_some_and(|record| record.in_stock)
    }

    /// The in-stock subset, preserving order.
    pub fn in_stock(&self) -> Snapshot {
        self.iter()
            .filter(|(_, record)| record.in_stock)
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    /// Number of in-stock products.
    pub fn in_stock_count(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.in_stock).count()
    }
}

impl FromIterator<(ProductId, ProductRecord)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (ProductId, ProductRecord)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (id, record) in iter {
            snapshot.insert(id, record);
        }
        snapshot
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, record) in &self.entries {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, in_stock: bool) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            link: format!("https://shop.example/{name}"),
            image: String::new(),
            in_stock,
        }
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("c", record("c", true));
        snapshot.insert("a", record("a", false));
        snapshot.insert("b", record("b", true));

        let ids: Vec<&str> = snapshot.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("a", record("a", false));
        snapshot.insert("b", record("b", false));
        let old = snapshot.insert("a", record("a", true));

        assert_eq!(old.map(|r| r.in_stock), Some(false));
        assert_eq!(snapshot.len(), 2);
        let first = snapshot.iter().next().map(|(id, r)| (id.clone(), r.in_stock));
        assert_eq!(first, Some(("a".to_string(), true)));
    }

    #[test]
    fn test_in_stock_subset() {
        let snapshot: Snapshot = vec![
            ("a".to_string(), record("a", true)),
            ("b".to_string(), record("b", false)),
            ("c".to_string(), record("c", true)),
        ]
        .into_iter()
        .collect();

        let in_stock = snapshot.in_stock();
        assert_eq!(in_stock.len(), 2);
        assert_eq!(snapshot.in_stock_count(), 2);
        assert!(!in_stock.contains("b"));
        assert!(snapshot.is_listed_in_stock("a"));
        assert!(!snapshot.is_listed_in_stock("b"));
        assert!(!snapshot.is_listed_in_stock("missing"));
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let snapshot: Snapshot = vec![
            ("z".to_string(), record("z", true)),
            ("a".to_string(), record("a", false)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&snapshot).unwrap();
        let z = json.find("\"z\"").unwrap();
        let a = json.find("\"a\"").unwrap();
        assert!(z < a);
        assert!(json.contains("\"in_stock\":true"));
    }
}
