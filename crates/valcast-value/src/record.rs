//! Insertion-ordered field map

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// An ordered mapping from field names to values
///
/// Records serve three roles: keyword arguments supplied to the engine,
/// the in-progress instance that field handlers may read sibling fields
/// from, and the structural output of instance-to-record conversion.
/// A record produced from a coerced instance carries the schema name as
/// a tag so it can be recognized as an already-coerced value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Schema tag, set when this record is the payload of a coerced instance
    schema: Option<String>,

    /// Field entries in insertion order
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Create a new empty record
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: None,
            entries: Vec::new(),
        }
    }

    /// Create an empty record tagged as an instance payload of a schema
    pub fn for_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            entries: Vec::new(),
        }
    }

    /// Schema tag, if this record is a coerced instance payload
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Insert or replace a field value, preserving first-insertion order
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Get a field value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Check whether a field is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Remove a field by name, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterate over field names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Consume the record, yielding entries in insertion order
    #[must_use]
    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }

    /// Compare field sets ignoring the schema tag and entry order
    #[must_use]
    pub fn same_fields(&self, other: &Record) -> bool {
        self.entries.len() == other.entries.len()
            && self.iter().all(|(name, value)| other.get(name) == Some(value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order() {
        let mut record = Record::new();
        record.insert("b", Value::Int(2));
        record.insert("a", Value::Int(1));
        record.insert("c", Value::Int(3));

        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new();
        record.insert("a", Value::Int(1));
        record.insert("b", Value::Int(2));
        record.insert("a", Value::Int(9));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&Value::Int(9)));
        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_schema_tag() {
        let record = Record::for_schema("Point");
        assert_eq!(record.schema(), Some("Point"));
        assert_eq!(Record::new().schema(), None);
    }

    #[test]
    fn test_same_fields_ignores_order_and_tag() {
        let left: Record = [("x", Value::Int(1)), ("y", Value::Int(2))]
            .into_iter()
            .collect();
        let mut right = Record::for_schema("Point");
        right.insert("y", Value::Int(2));
        right.insert("x", Value::Int(1));

        assert!(left.same_fields(&right));
        assert_ne!(left, right);
    }

    #[test]
    fn test_remove() {
        let mut record: Record = [("x", Value::Int(1)), ("y", Value::Int(2))]
            .into_iter()
            .collect();
        assert_eq!(record.remove("x"), Some(Value::Int(1)));
        assert_eq!(record.remove("x"), None);
        assert_eq!(record.len(), 1);
    }
}
