//! The import record store.
//!
//! File processors do not touch the graph directly. They fill a record
//! store: an ordered list of rows whose string keys carry a prefix saying
//! which element the value belongs to (`source.` and `destination.` for
//! the endpoint vertices, `transaction.` for the connection). The merge
//! step then turns rows into graph elements.

use arcstr::ArcStr;
use astral_common::types::AttrType;
use astral_common::utils::hash::FxHashMap;
use astral_common::{Error, Result};

/// Key prefixes and well-known record keys.
pub mod keys {
    /// Prefix for attributes of the row's source vertex.
    pub const SOURCE: &str = "source.";
    /// Prefix for attributes of the row's destination vertex.
    pub const DESTINATION: &str = "destination.";
    /// Prefix for attributes of the row's transaction.
    pub const TRANSACTION: &str = "transaction.";

    /// Identifier of the source vertex. Required for the row to produce
    /// anything.
    pub const SOURCE_IDENTIFIER: &str = "source.identifier";
    /// Identifier of the destination vertex. Its presence makes the row a
    /// transaction row.
    pub const DESTINATION_IDENTIFIER: &str = "destination.identifier";
    /// Identifier of the transaction.
    pub const TRANSACTION_IDENTIFIER: &str = "transaction.identifier";
    /// "true"/"false"; transactions default to directed.
    pub const TRANSACTION_DIRECTED: &str = "transaction.directed";
}

/// Ordered rows of prefixed key to string value mappings, with optional
/// type declarations for the attributes behind the keys.
#[derive(Debug, Default)]
pub struct RecordStore {
    rows: Vec<FxHashMap<ArcStr, String>>,
    types: FxHashMap<ArcStr, AttrType>,
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new row and returns its index.
    pub fn add(&mut self) -> usize {
        self.rows.push(FxHashMap::default());
        self.rows.len() - 1
    }

    /// Sets a value on the current (last) row.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let row = self
            .rows
            .last_mut()
            .ok_or_else(|| Error::Import("no current record; call add() first".to_string()))?;
        row.insert(ArcStr::from(key), value.into());
        Ok(())
    }

    /// Sets a value on an earlier row.
    pub fn set_at(&mut self, index: usize, key: &str, value: impl Into<String>) -> Result<()> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or_else(|| Error::Import(format!("no record at index {index}")))?;
        row.insert(ArcStr::from(key), value.into());
        Ok(())
    }

    /// Reads a value from a row.
    #[must_use]
    pub fn get(&self, index: usize, key: &str) -> Option<&str> {
        self.rows
            .get(index)?
            .get(&ArcStr::from(key))
            .map(String::as_str)
    }

    /// Declares the value type behind a key, so the merge can register
    /// the attribute with something better than a string.
    pub fn declare_type(&mut self, key: &str, attr_type: AttrType) {
        self.types.insert(ArcStr::from(key), attr_type);
    }

    /// The declared type for a key, if any.
    #[must_use]
    pub fn declared_type(&self, key: &str) -> Option<AttrType> {
        self.types.get(&ArcStr::from(key)).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows in insertion order as (key, value) pairs sorted by
    /// key, so the merge is deterministic.
    pub fn rows(&self) -> impl Iterator<Item = Vec<(&str, &str)>> {
        self.rows.iter().map(|row| {
            let mut entries: Vec<(&str, &str)> = row
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            entries.sort_unstable_by_key(|&(k, _)| k);
            entries
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_values() {
        let mut records = RecordStore::new();
        assert!(records.set(keys::SOURCE_IDENTIFIER, "a").is_err());

        let first = records.add();
        records.set(keys::SOURCE_IDENTIFIER, "a").unwrap();
        records.add();
        records.set(keys::SOURCE_IDENTIFIER, "b").unwrap();
        records.set_at(first, "source.label", "Alpha").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records.get(first, keys::SOURCE_IDENTIFIER), Some("a"));
        assert_eq!(records.get(first, "source.label"), Some("Alpha"));
        assert_eq!(records.get(1, keys::SOURCE_IDENTIFIER), Some("b"));
        assert_eq!(records.get(1, "source.label"), None);
        assert_eq!(records.get(7, keys::SOURCE_IDENTIFIER), None);
    }

    #[test]
    fn test_type_declarations() {
        let mut records = RecordStore::new();
        records.declare_type("source.weight", AttrType::Float);
        assert_eq!(records.declared_type("source.weight"), Some(AttrType::Float));
        assert_eq!(records.declared_type("source.label"), None);
    }

    #[test]
    fn test_rows_iterate_sorted() {
        let mut records = RecordStore::new();
        records.add();
        records.set("source.z", "1").unwrap();
        records.set("source.a", "2").unwrap();

        let row: Vec<_> = records.rows().next().unwrap();
        assert_eq!(row, vec![("source.a", "2"), ("source.z", "1")]);
    }
}
