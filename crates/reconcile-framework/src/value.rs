//! # Declared Configuration Values
//!
//! [`Value`] is the declared side of a resource: the tree handed to the reconciler by the
//! declarative tool, and the observed tree the reconciler hands back. Unlike the wire form
//! it has a third scalar state, [`Value::Unknown`], for values the tool cannot resolve
//! until some other object exists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of the declared configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Not yet resolved. Only meaningful on the declared side before creation.
    Unknown,
    /// Absent.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(BTreeMap<String, Value>),
}

static NULL: Value = Value::Null;

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Builds an object from `(name, value)` pairs.
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn string_set<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Value::Set(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    pub fn string_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Present means neither null nor unknown.
    pub fn is_present(&self) -> bool {
        !self.is_null() && !self.is_unknown()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Field lookup on an object; missing fields and non-objects read as null.
    pub fn get(&self, field: &str) -> &Value {
        match self {
            Value::Object(fields) | Value::Map(fields) => fields.get(field).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Sets a field, turning `self` into an object first if it was null.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        if self.is_null() {
            *self = Value::Object(BTreeMap::new());
        }
        if let Value::Object(fields) | Value::Map(fields) = self {
            fields.insert(field.into(), value);
        }
    }

    /// An empty list, set or map counts as an empty collection.
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Value::List(items) | Value::Set(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    /// A copy with set elements in a stable order, so sets compare independently of order.
    pub fn canonical(&self) -> Value {
        match self {
            Value::Set(items) => {
                let mut items: Vec<Value> = items.iter().map(Value::canonical).collect();
                items.sort_by_cached_key(|v| serde_json::to_string(v).unwrap_or_default());
                items.dedup();
                Value::Set(items)
            }
            Value::List(items) => Value::List(items.iter().map(Value::canonical).collect()),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.canonical()))
                    .collect(),
            ),
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), v.canonical()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_reads_missing_fields_as_null() {
        let v = Value::object([("name", Value::from("sales"))]);
        assert_eq!(v.get("name"), &Value::from("sales"));
        assert!(v.get("missing").is_null());
        assert!(Value::Int(1).get("anything").is_null());
    }

    #[test]
    fn test_set_promotes_null_to_object() {
        let mut v = Value::Null;
        v.set("namespace", Value::from("default"));
        assert_eq!(v.get("namespace").as_str(), Some("default"));
    }

    #[test]
    fn test_canonical_ignores_set_order_and_null_fields() {
        let a = Value::object([
            ("ids", Value::string_set(["b", "a"])),
            ("note", Value::Null),
        ]);
        let b = Value::object([("ids", Value::string_set(["a", "b"]))]);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_canonical_keeps_list_order() {
        let a = Value::string_list(["b", "a"]);
        let b = Value::string_list(["a", "b"]);
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_unknown_is_not_present() {
        assert!(!Value::Unknown.is_present());
        assert!(!Value::Null.is_present());
        assert!(Value::Bool(false).is_present());
    }
}
