//! # Expand / Flatten
//!
//! The transcoder converts between the declared [`Value`] tree and the remote wire form
//! (`serde_json::Value`), guided by an [`ObjectSchema`]. Typed remote structs convert to
//! and from the wire form with serde, see [`expand_typed`] and [`flatten_typed`].
//!
//! ## Expand (declared → wire)
//!
//! 1. Unknown scalars are omitted: a value the tool cannot resolve is never sent.
//! 2. Null scalars are omitted: absence implies the remote default.
//! 3. Null collections are omitted, except on fields declared
//!    [`explicit_empty`](crate::schema::Field::explicit_empty), which expand to `[]`/`{}`.
//! 4. A variant expands exactly its populated option. More than one populated option is
//!    always [`TranscodeError::InvalidVariant`]; none populated is an error for a required
//!    variant and an omitted field otherwise.
//!
//! ## Flatten (wire → declared)
//!
//! 1. An explicit empty container on an `explicit_empty` field flattens to null when the
//!    prior declared value was null, so `expand → flatten` recovers the caller's intent
//!    rather than the wire representation.
//! 2. A variant flattens to an object with the populated option set and every sibling null.
//! 3. Keys the schema does not know are a [`TranscodeError::SchemaMismatch`]: data is never
//!    dropped silently.

use crate::schema::{AttributeNode, Field, FieldMode, ObjectSchema, ScalarType};
use crate::value::Value;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map as JsonMap, Number, Value as Json};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

/// Transcoding failures. All of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    #[error("invalid variant at {path}: expected exactly one option, found {populated}")]
    InvalidVariant { path: String, populated: usize },

    #[error("schema mismatch at {path}: {message}")]
    SchemaMismatch { path: String, message: String },

    #[error("encoding error at {path}: {message}")]
    Encoding { path: String, message: String },
}

impl TranscodeError {
    fn mismatch(path: &str, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            path: display_path(path),
            message: message.into(),
        }
    }

    fn encoding(path: &str, message: impl Into<String>) -> Self {
        Self::Encoding {
            path: display_path(path),
            message: message.into(),
        }
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

fn child(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Unknown => "unknown",
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::List(_) => "list",
        Value::Set(_) => "set",
        Value::Map(_) => "map",
        Value::Object(_) => "object",
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

// =============================================================================
// EXPAND
// =============================================================================

/// Expands a declared object into its wire form.
pub fn expand(schema: &ObjectSchema, declared: &Value) -> Result<Json, TranscodeError> {
    let object = expand_object(schema, declared, "")?;
    Ok(Json::Object(object.unwrap_or_default()))
}

/// Expands a declared object and deserializes the wire form into a typed API input.
pub fn expand_typed<T: DeserializeOwned>(
    schema: &ObjectSchema,
    declared: &Value,
) -> Result<T, TranscodeError> {
    let wire = expand(schema, declared)?;
    trace!(%wire, "Expanded");
    serde_json::from_value(wire).map_err(|e| TranscodeError::mismatch("", e.to_string()))
}

fn expand_field(field: &Field, value: &Value, path: &str) -> Result<Option<Json>, TranscodeError> {
    if !field.is_sent() {
        return Ok(None);
    }
    match value {
        Value::Unknown => Ok(None),
        Value::Null if field.sends_explicit_empty() => Ok(Some(empty_container(&field.node))),
        Value::Null => match &field.node {
            AttributeNode::Variant(_) if field.mode == FieldMode::Required => {
                Err(TranscodeError::InvalidVariant {
                    path: display_path(path),
                    populated: 0,
                })
            }
            _ => Ok(None),
        },
        present => expand_node(&field.node, present, path, field.mode == FieldMode::Required),
    }
}

fn empty_container(node: &AttributeNode) -> Json {
    match node {
        AttributeNode::Map(_) => Json::Object(JsonMap::new()),
        _ => Json::Array(Vec::new()),
    }
}

fn expand_node(
    node: &AttributeNode,
    value: &Value,
    path: &str,
    required: bool,
) -> Result<Option<Json>, TranscodeError> {
    match node {
        AttributeNode::Scalar(scalar) => expand_scalar(*scalar, value, path).map(Some),
        AttributeNode::List(element) | AttributeNode::Set(element) => {
            let items = match value {
                Value::List(items) | Value::Set(items) => items,
                other => {
                    return Err(TranscodeError::mismatch(
                        path,
                        format!("expected a collection, found {}", kind_of(other)),
                    ))
                }
            };
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                if !item.is_present() {
                    continue;
                }
                let item_path = format!("{path}[{index}]");
                if let Some(json) = expand_node(element, item, &item_path, true)? {
                    out.push(json);
                }
            }
            Ok(Some(Json::Array(out)))
        }
        AttributeNode::Map(element) => {
            let entries = match value {
                Value::Map(entries) | Value::Object(entries) => entries,
                other => {
                    return Err(TranscodeError::mismatch(
                        path,
                        format!("expected a map, found {}", kind_of(other)),
                    ))
                }
            };
            let mut out = JsonMap::new();
            for (key, item) in entries {
                if !item.is_present() {
                    continue;
                }
                if let Some(json) = expand_node(element, item, &child(path, key), true)? {
                    out.insert(key.clone(), json);
                }
            }
            Ok(Some(Json::Object(out)))
        }
        AttributeNode::Object(schema) => Ok(expand_object(schema, value, path)?.map(Json::Object)),
        AttributeNode::Variant(options) => expand_variant(options, value, path, required),
    }
}

fn expand_object(
    schema: &ObjectSchema,
    value: &Value,
    path: &str,
) -> Result<Option<JsonMap<String, Json>>, TranscodeError> {
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null | Value::Unknown => return Ok(None),
        other => {
            return Err(TranscodeError::mismatch(
                path,
                format!("expected an object, found {}", kind_of(other)),
            ))
        }
    };
    if let Some(stray) = fields.keys().find(|k| schema.field(k).is_none()) {
        return Err(TranscodeError::mismatch(
            &child(path, stray),
            "attribute is not part of the schema",
        ));
    }

    let mut out = JsonMap::new();
    for field in &schema.fields {
        let value = fields.get(&field.name).unwrap_or(&Value::Null);
        if let Some(json) = expand_field(field, value, &child(path, &field.name))? {
            out.insert(field.wire_name.clone(), json);
        }
    }
    Ok(Some(out))
}

fn expand_variant(
    options: &[Field],
    value: &Value,
    path: &str,
    required: bool,
) -> Result<Option<Json>, TranscodeError> {
    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(TranscodeError::mismatch(
                path,
                format!("expected a variant block, found {}", kind_of(other)),
            ))
        }
    };
    if let Some(stray) = fields
        .keys()
        .find(|k| !options.iter().any(|o| &o.name == *k))
    {
        return Err(TranscodeError::mismatch(
            &child(path, stray),
            "not an option of this variant",
        ));
    }

    let populated: Vec<&Field> = options
        .iter()
        .filter(|o| fields.get(&o.name).is_some_and(Value::is_present))
        .collect();

    match populated.as_slice() {
        [] if required => Err(TranscodeError::InvalidVariant {
            path: display_path(path),
            populated: 0,
        }),
        [] => Ok(None),
        [option] => {
            let option_path = child(path, &option.name);
            let inner = expand_node(&option.node, &fields[&option.name], &option_path, true)?
                .unwrap_or_else(|| Json::Object(JsonMap::new()));
            let mut out = JsonMap::new();
            out.insert(option.wire_name.clone(), inner);
            Ok(Some(Json::Object(out)))
        }
        many => Err(TranscodeError::InvalidVariant {
            path: display_path(path),
            populated: many.len(),
        }),
    }
}

fn expand_scalar(scalar: ScalarType, value: &Value, path: &str) -> Result<Json, TranscodeError> {
    let json = match (scalar, value) {
        (ScalarType::String, Value::String(s)) => Json::String(s.clone()),
        (ScalarType::Bool, Value::Bool(b)) => Json::Bool(*b),
        (ScalarType::Int, Value::Int(n)) => Json::Number((*n).into()),
        (ScalarType::Float, Value::Int(n)) => Json::Number((*n).into()),
        (ScalarType::Float, Value::Float(f)) => Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| TranscodeError::encoding(path, format!("{f} is not a finite number")))?,
        (ScalarType::Timestamp, Value::String(s)) => {
            let parsed = DateTime::parse_from_rfc3339(s).map_err(|e| {
                TranscodeError::encoding(path, format!("invalid RFC 3339 timestamp {s:?}: {e}"))
            })?;
            Json::Number(parsed.timestamp().into())
        }
        (expected, other) => {
            return Err(TranscodeError::mismatch(
                path,
                format!("expected {expected:?}, found {}", kind_of(other)),
            ))
        }
    };
    Ok(json)
}

// =============================================================================
// FLATTEN
// =============================================================================

/// Flattens a wire object into the declared tree, using `prior` to recover the caller's
/// null-versus-empty intent.
pub fn flatten(schema: &ObjectSchema, remote: &Json, prior: &Value) -> Result<Value, TranscodeError> {
    flatten_object(schema, remote, prior, "")
}

/// Serializes a typed API object and flattens it.
pub fn flatten_typed<T: Serialize>(
    schema: &ObjectSchema,
    remote: &T,
    prior: &Value,
) -> Result<Value, TranscodeError> {
    let wire =
        serde_json::to_value(remote).map_err(|e| TranscodeError::encoding("", e.to_string()))?;
    trace!(%wire, "Flattening");
    flatten(schema, &wire, prior)
}

fn flatten_field(
    field: &Field,
    remote: Option<&Json>,
    prior: &Value,
    path: &str,
) -> Result<Value, TranscodeError> {
    if field.write_only {
        return Ok(if prior.is_unknown() { Value::Null } else { prior.clone() });
    }
    let json = match remote {
        None | Some(Json::Null) if field.reads_empty_as_null() && prior.is_empty_collection() => {
            return Ok(prior.clone())
        }
        None | Some(Json::Null) => return Ok(Value::Null),
        Some(json) => json,
    };
    if field.sends_explicit_empty() && prior.is_null() && is_empty_json(json) {
        return Ok(Value::Null);
    }
    flatten_node(&field.node, json, prior, path)
}

fn is_empty_json(json: &Json) -> bool {
    match json {
        Json::Array(items) => items.is_empty(),
        Json::Object(entries) => entries.is_empty(),
        _ => false,
    }
}

fn flatten_node(
    node: &AttributeNode,
    json: &Json,
    prior: &Value,
    path: &str,
) -> Result<Value, TranscodeError> {
    match node {
        AttributeNode::Scalar(scalar) => flatten_scalar(*scalar, json, path),
        AttributeNode::List(element) => {
            let items = expect_array(json, path)?;
            let priors = match prior {
                Value::List(priors) => priors.as_slice(),
                _ => &[],
            };
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let item_prior = priors.get(index).unwrap_or(&Value::Null);
                out.push(flatten_node(element, item, item_prior, &format!("{path}[{index}]"))?);
            }
            Ok(Value::List(out))
        }
        AttributeNode::Set(element) => {
            // Set elements have no stable position to pair with a prior value.
            let items = expect_array(json, path)?;
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                out.push(flatten_node(element, item, &Value::Null, &format!("{path}[{index}]"))?);
            }
            Ok(Value::Set(out))
        }
        AttributeNode::Map(element) => {
            let entries = expect_object(json, path)?;
            let mut out = BTreeMap::new();
            for (key, item) in entries {
                let item = flatten_node(element, item, prior.get(key), &child(path, key))?;
                out.insert(key.clone(), item);
            }
            Ok(Value::Map(out))
        }
        AttributeNode::Object(schema) => flatten_object(schema, json, prior, path),
        AttributeNode::Variant(options) => flatten_variant(options, json, prior, path),
    }
}

fn expect_array<'a>(json: &'a Json, path: &str) -> Result<&'a Vec<Json>, TranscodeError> {
    json.as_array().ok_or_else(|| {
        TranscodeError::mismatch(path, format!("expected an array, found {}", json_kind(json)))
    })
}

fn expect_object<'a>(json: &'a Json, path: &str) -> Result<&'a JsonMap<String, Json>, TranscodeError> {
    json.as_object().ok_or_else(|| {
        TranscodeError::mismatch(path, format!("expected an object, found {}", json_kind(json)))
    })
}

fn flatten_object(
    schema: &ObjectSchema,
    json: &Json,
    prior: &Value,
    path: &str,
) -> Result<Value, TranscodeError> {
    let entries = expect_object(json, path)?;
    if let Some(stray) = entries.keys().find(|k| schema.field_by_wire(k).is_none()) {
        return Err(TranscodeError::mismatch(
            &child(path, stray),
            "remote returned an attribute the schema does not describe",
        ));
    }

    let mut out = BTreeMap::new();
    for field in &schema.fields {
        let value = flatten_field(
            field,
            entries.get(&field.wire_name),
            prior.get(&field.name),
            &child(path, &field.name),
        )?;
        out.insert(field.name.clone(), value);
    }
    Ok(Value::Object(out))
}

fn flatten_variant(
    options: &[Field],
    json: &Json,
    prior: &Value,
    path: &str,
) -> Result<Value, TranscodeError> {
    let entries = expect_object(json, path)?;
    let populated: Vec<(&String, &Json)> = entries.iter().filter(|(_, v)| !v.is_null()).collect();
    let (wire_name, inner) = match populated.as_slice() {
        [single] => *single,
        other => {
            return Err(TranscodeError::mismatch(
                path,
                format!("remote variant has {} populated options, expected 1", other.len()),
            ))
        }
    };
    let option = options
        .iter()
        .find(|o| &o.wire_name == wire_name)
        .ok_or_else(|| {
            TranscodeError::mismatch(&child(path, wire_name), "unknown variant option")
        })?;

    let mut out: BTreeMap<String, Value> = options
        .iter()
        .map(|o| (o.name.clone(), Value::Null))
        .collect();
    let value = flatten_node(
        &option.node,
        inner,
        prior.get(&option.name),
        &child(path, &option.name),
    )?;
    out.insert(option.name.clone(), value);
    Ok(Value::Object(out))
}

fn flatten_scalar(scalar: ScalarType, json: &Json, path: &str) -> Result<Value, TranscodeError> {
    let value = match (scalar, json) {
        (ScalarType::String, Json::String(s)) => Value::String(s.clone()),
        (ScalarType::Bool, Json::Bool(b)) => Value::Bool(*b),
        (ScalarType::Int, Json::Number(n)) => Value::Int(n.as_i64().ok_or_else(|| {
            TranscodeError::encoding(path, format!("{n} is not a 64-bit integer"))
        })?),
        (ScalarType::Float, Json::Number(n)) => Value::Float(n.as_f64().ok_or_else(|| {
            TranscodeError::encoding(path, format!("{n} is not representable as a float"))
        })?),
        (ScalarType::Timestamp, Json::Number(n)) => {
            let seconds = n
                .as_i64()
                .ok_or_else(|| TranscodeError::encoding(path, format!("{n} is not epoch seconds")))?;
            let ts = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
                TranscodeError::encoding(path, format!("{seconds} is out of range"))
            })?;
            Value::String(ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        }
        (expected, other) => {
            return Err(TranscodeError::mismatch(
                path,
                format!("expected {expected:?}, found {}", json_kind(other)),
            ))
        }
    };
    Ok(value)
}
