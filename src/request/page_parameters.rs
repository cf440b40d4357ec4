//! Ordered page parameter set.
//!
//! # Responsibilities
//! - Hold the key/value pairs a bookmarkable page is constructed from
//! - Keep insertion order (encoders walk parameters in this order)
//! - Support repeated keys (multi-valued query parameters)
//!
//! # Design Decisions
//! - Keys are unique at the top level; repeated values live in `ParamValue::Multi`
//! - A `Null` value is accepted but codes as an empty string, so it comes back
//!   from a decode as `Single("")`

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// One string value.
    Single(String),
    /// Repeated values, in the order they were seen.
    Multi(Vec<String>),
    /// No value. Encoded as an empty string; never recovered as `Null`.
    Null,
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Single(s) => serializer.serialize_str(s),
            ParamValue::Multi(values) => values.serialize(serializer),
            ParamValue::Null => serializer.serialize_str(""),
        }
    }
}

impl ParamValue {
    /// First value, or `None` for `Null` and empty arrays.
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(s) => Some(s),
            ParamValue::Multi(values) => values.first().map(String::as_str),
            ParamValue::Null => None,
        }
    }

    /// All values as they are written to a URL. `Null` yields a single empty string.
    pub fn coded_values(&self) -> Vec<&str> {
        match self {
            ParamValue::Single(s) => vec![s.as_str()],
            ParamValue::Multi(values) => values.iter().map(String::as_str).collect(),
            ParamValue::Null => vec![""],
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Multi(values)
    }
}

impl From<Option<String>> for ParamValue {
    fn from(value: Option<String>) -> Self {
        value.map(ParamValue::Single).unwrap_or(ParamValue::Null)
    }
}

/// Ordered mapping from parameter name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParameters {
    entries: Vec<(String, ParamValue)>,
}

impl Serialize for PageParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl PageParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Add a value for `key`, turning an existing value into a `Multi`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => {
                let slot = &mut self.entries[i].1;
                *slot = match std::mem::replace(slot, ParamValue::Null) {
                    ParamValue::Single(prev) => ParamValue::Multi(vec![prev, value]),
                    ParamValue::Multi(mut values) => {
                        values.push(value);
                        ParamValue::Multi(values)
                    }
                    ParamValue::Null => ParamValue::Multi(vec![String::new(), value]),
                };
            }
            None => self.entries.push((key, ParamValue::Single(value))),
        }
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Get the first string value stored under `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::first)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Copy every entry of `other` into this set, overwriting existing keys.
    pub fn merge(&mut self, other: &PageParameters) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl<K, V> FromIterator<(K, V)> for PageParameters
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = PageParameters::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl fmt::Display for PageParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                ParamValue::Single(s) => write!(f, "{}={}", key, s)?,
                ParamValue::Multi(values) => write!(f, "{}={:?}", key, values)?,
                ParamValue::Null => write!(f, "{}=null", key)?,
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_replaces_in_place() {
        let mut params = PageParameters::new();
        params.insert("b", "1");
        params.insert("a", "2");
        params.insert("b", "3");

        let keys: Vec<_> = params.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(params.get_str("b"), Some("3"));
    }

    #[test]
    fn test_append_builds_multi_value() {
        let mut params = PageParameters::new();
        params.append("tag", "x");
        params.append("tag", "y");
        assert_eq!(
            params.get("tag"),
            Some(&ParamValue::Multi(vec!["x".into(), "y".into()]))
        );
        assert_eq!(params.get_str("tag"), Some("x"));
    }

    #[test]
    fn test_null_codes_as_empty_string() {
        let value = ParamValue::from(None::<String>);
        assert_eq!(value, ParamValue::Null);
        assert_eq!(value.coded_values(), vec![""]);
        assert_eq!(value.first(), None);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut params: PageParameters = [("a", "1"), ("b", "2")].into_iter().collect();
        let query: PageParameters = [("b", "9"), ("c", "3")].into_iter().collect();
        params.merge(&query);
        assert_eq!(params.get_str("b"), Some("9"));
        assert_eq!(params.get_str("c"), Some("3"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_serializes_as_json_object() {
        let mut params = PageParameters::new();
        params.insert("a", "1");
        params.insert("n", ParamValue::Null);
        params.append("m", "x");
        params.append("m", "y");
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"a":"1","n":"","m":["x","y"]}"#);
    }
}
