//! Field-level drift detection between a declared tree and the last observed tree.

use crate::schema::{AttributeNode, Field, FieldMode, ObjectSchema};
use crate::value::Value;
use std::collections::BTreeSet;

/// Top-level attribute names whose declared value differs from the observed one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changed: BTreeSet<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changed.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.changed.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(String::as_str)
    }

    /// True when anything outside `fields` changed. Families use this to decide whether
    /// the main update call is needed when some attributes have dedicated sub-APIs.
    pub fn has_changes_except(&self, fields: &[&str]) -> bool {
        self.changed.iter().any(|c| !fields.contains(&c.as_str()))
    }

    pub fn insert(&mut self, field: impl Into<String>) {
        self.changed.insert(field.into());
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            changed: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Compares `declared` against `observed` field by field.
///
/// Computed fields, declared-unknown values and declared-null optional-computed fields
/// never count as drift, at any depth. Sets compare independently of order, and on
/// explicit-empty collections null and empty are the same value.
pub fn diff(schema: &ObjectSchema, declared: &Value, observed: &Value) -> ChangeSet {
    schema
        .fields
        .iter()
        .filter(|f| field_differs(f, declared.get(&f.name), observed.get(&f.name)))
        .map(|f| f.name.clone())
        .collect()
}

fn field_differs(field: &Field, declared: &Value, observed: &Value) -> bool {
    if !field.is_sent() || declared.is_unknown() {
        return false;
    }
    if declared.is_null() && field.mode == FieldMode::OptionalComputed {
        return false;
    }
    if (field.sends_explicit_empty() || field.reads_empty_as_null())
        && is_null_or_empty(declared)
        && is_null_or_empty(observed)
    {
        return false;
    }
    node_differs(&field.node, declared, observed)
}

fn is_null_or_empty(value: &Value) -> bool {
    value.is_null() || value.is_empty_collection()
}

fn node_differs(node: &AttributeNode, declared: &Value, observed: &Value) -> bool {
    if declared.is_unknown() {
        return false;
    }
    match (node, declared, observed) {
        (AttributeNode::Object(schema), Value::Object(_), Value::Object(_)) => schema
            .fields
            .iter()
            .any(|f| field_differs(f, declared.get(&f.name), observed.get(&f.name))),
        (AttributeNode::Variant(options), Value::Object(_), Value::Object(_)) => options
            .iter()
            .any(|o| field_differs(o, declared.get(&o.name), observed.get(&o.name))),
        (AttributeNode::List(element), Value::List(d), Value::List(o)) => {
            d.len() != o.len() || d.iter().zip(o).any(|(d, o)| node_differs(element, d, o))
        }
        (AttributeNode::Map(element), Value::Map(d), Value::Map(o)) => {
            d.len() != o.len()
                || d.iter().any(|(key, d)| match o.get(key) {
                    Some(o) => node_differs(element, d, o),
                    None => true,
                })
        }
        _ => declared.canonical() != observed.canonical(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeNode as N, Field};

    fn schema() -> ObjectSchema {
        ObjectSchema::new(vec![
            Field::required("name", N::string()),
            Field::optional("subnet_ids", N::set(N::string())),
            Field::optional("rules", N::list(N::string())).explicit_empty(),
            Field::optional_computed("import_mode", N::string()),
            Field::computed("arn", N::string()),
            Field::optional(
                "settings",
                N::object(vec![
                    Field::optional("timezone", N::string()),
                    Field::computed("revision", N::int()),
                ]),
            ),
        ])
    }

    fn observed() -> Value {
        Value::object([
            ("name", Value::from("sales")),
            ("subnet_ids", Value::string_set(["b", "a"])),
            ("rules", Value::List(vec![])),
            ("import_mode", Value::from("SPICE")),
            ("arn", Value::from("arn:x")),
            (
                "settings",
                Value::object([("timezone", Value::from("UTC")), ("revision", Value::Int(3))]),
            ),
        ])
    }

    #[test]
    fn test_no_drift_when_declared_matches() {
        let declared = Value::object([
            ("name", Value::from("sales")),
            ("subnet_ids", Value::string_set(["a", "b"])),
            ("rules", Value::Null),
            ("import_mode", Value::Null),
            ("settings", Value::object([("timezone", Value::from("UTC"))])),
        ]);
        assert!(diff(&schema(), &declared, &observed()).is_empty());
    }

    #[test]
    fn test_unknown_never_counts_as_drift() {
        let declared = Value::object([
            ("name", Value::Unknown),
            ("subnet_ids", Value::string_set(["a", "b"])),
            ("settings", Value::object([("timezone", Value::Unknown)])),
        ]);
        assert!(diff(&schema(), &declared, &observed()).is_empty());
    }

    #[test]
    fn test_changed_fields_are_reported_by_top_level_name() {
        let declared = Value::object([
            ("name", Value::from("marketing")),
            ("subnet_ids", Value::string_set(["a"])),
            ("rules", Value::string_list(["r1"])),
            ("import_mode", Value::from("DIRECT_QUERY")),
            ("settings", Value::object([("timezone", Value::from("CET"))])),
        ]);
        let changes = diff(&schema(), &declared, &observed());
        assert_eq!(
            changes.iter().collect::<Vec<_>>(),
            vec!["import_mode", "name", "rules", "settings", "subnet_ids"]
        );
    }

    #[test]
    fn test_empty_as_null_collections_never_drift_from_absent() {
        let schema = ObjectSchema::new(vec![
            Field::optional("tags", N::map(N::string())).empty_as_null(),
            Field::optional("grants", N::set(N::string())).empty_as_null(),
            Field::optional("labels", N::map(N::string())),
        ]);
        let absent = Value::object([
            ("tags", Value::Null),
            ("grants", Value::Null),
            ("labels", Value::Null),
        ]);
        let declared = Value::object([
            ("tags", Value::map::<&str>([])),
            ("grants", Value::Set(vec![])),
            ("labels", Value::map::<&str>([])),
        ]);

        let changes = diff(&schema, &declared, &absent);
        assert_eq!(changes.iter().collect::<Vec<_>>(), vec!["labels"]);

        let mut tagged = declared.clone();
        tagged.set("tags", Value::map([("team", Value::from("sales"))]));
        assert!(diff(&schema, &tagged, &absent).contains("tags"));
    }

    #[test]
    fn test_has_changes_except() {
        let changes: ChangeSet = ["permissions", "refresh_properties"].into_iter().collect();
        assert!(!changes.has_changes_except(&["permissions", "refresh_properties", "tags"]));
        assert!(changes.has_changes_except(&["permissions"]));
        assert!(!ChangeSet::default().has_changes_except(&[]));
    }
}
