//! String-keyed content metadata.
//!
//! Site generators hand over metadata either as raw strings or as datetime
//! values they already parsed. `Metadata` keeps the keys in the order the
//! generator produced them so that diagnostics come out in a stable order.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::{TITLE, UNTITLED};

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    /// A datetime without zone information
    DateTime(NaiveDateTime),
    /// A datetime carrying its own offset
    ZonedDateTime(DateTime<FixedOffset>),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => write!(f, "{}", s),
            MetadataValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            MetadataValue::ZonedDateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Text(s)
    }
}

impl From<NaiveDateTime> for MetadataValue {
    fn from(dt: NaiveDateTime) -> Self {
        MetadataValue::DateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for MetadataValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        MetadataValue::ZonedDateTime(dt)
    }
}

/// Insertion-ordered metadata with exact-key lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata(Vec<(String, MetadataValue)>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value, replacing an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The item title used in diagnostics.
    pub fn title(&self) -> String {
        self.get(TITLE)
            .map(|v| v.to_string())
            .unwrap_or_else(|| UNTITLED.to_string())
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<MetadataValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut metadata: Metadata = [("a", "1"), ("b", "2")].into_iter().collect();
        metadata.insert("a", "3");

        let keys: Vec<_> = metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(metadata.get_text("a"), Some("3"));
    }

    #[test]
    fn lookup_is_exact() {
        let metadata: Metadata = [("Event-Start", "x")].into_iter().collect();
        assert!(metadata.get("event-start").is_none());
        assert!(metadata.contains_key("Event-Start"));
    }

    #[test]
    fn title_falls_back_when_missing() {
        assert_eq!(Metadata::new().title(), "(untitled)");
    }
}
