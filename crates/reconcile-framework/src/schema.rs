//! # Attribute Schemas
//!
//! A schema describes the shape of one resource family: which attributes exist, how each
//! maps to the remote wire name, whether it is sent or only observed, and how null
//! collections are treated. The [`transcode`](crate::transcode) and
//! [`diff`](crate::diff) modules consult it uniformly, so per-resource null/empty policy
//! lives here as data instead of being re-derived at every call site.
//!
//! ```rust
//! use reconcile_framework::schema::{AttributeNode, Field, ObjectSchema};
//!
//! let schema = ObjectSchema::new(vec![
//!     Field::required("name", AttributeNode::string()),
//!     Field::optional("subnet_ids", AttributeNode::set(AttributeNode::string())),
//!     Field::computed("arn", AttributeNode::string()),
//! ]);
//! assert_eq!(schema.field("subnet_ids").unwrap().wire_name, "SubnetIds");
//! ```

/// Scalar types understood by the transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Bool,
    Int,
    Float,
    /// RFC 3339 on the declared side, epoch seconds on the wire.
    Timestamp,
}

/// The shape of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeNode {
    Scalar(ScalarType),
    List(Box<AttributeNode>),
    Set(Box<AttributeNode>),
    Map(Box<AttributeNode>),
    Object(ObjectSchema),
    /// Exactly one of the options is populated on the wire; at most one when declared.
    Variant(Vec<Field>),
}

impl AttributeNode {
    pub fn string() -> Self {
        AttributeNode::Scalar(ScalarType::String)
    }

    pub fn bool() -> Self {
        AttributeNode::Scalar(ScalarType::Bool)
    }

    pub fn int() -> Self {
        AttributeNode::Scalar(ScalarType::Int)
    }

    pub fn float() -> Self {
        AttributeNode::Scalar(ScalarType::Float)
    }

    pub fn timestamp() -> Self {
        AttributeNode::Scalar(ScalarType::Timestamp)
    }

    pub fn list(element: AttributeNode) -> Self {
        AttributeNode::List(Box::new(element))
    }

    pub fn set(element: AttributeNode) -> Self {
        AttributeNode::Set(Box::new(element))
    }

    pub fn map(element: AttributeNode) -> Self {
        AttributeNode::Map(Box::new(element))
    }

    pub fn object(fields: Vec<Field>) -> Self {
        AttributeNode::Object(ObjectSchema::new(fields))
    }

    /// A closed set of mutually exclusive options. Options are declared with
    /// [`Field::optional`]; their mode is otherwise ignored.
    pub fn variant(options: Vec<Field>) -> Self {
        AttributeNode::Variant(options)
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            AttributeNode::List(_) | AttributeNode::Set(_) | AttributeNode::Map(_)
        )
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Required,
    Optional,
    /// Observed only; never sent to the remote API.
    Computed,
    /// Sent when declared; when declared null the remote default is adopted.
    OptionalComputed,
}

/// How a null collection is sent to the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionPolicy {
    /// Null means "leave it to the remote default": the field is omitted.
    #[default]
    OmitWhenNull,
    /// The remote API only clears the value when sent an explicit empty container, so a
    /// null collection is expanded to `[]`/`{}` and an empty one flattens back to null when
    /// the caller had declared null.
    ExplicitEmpty,
    /// The remote API reports an empty collection as absent. Null and empty are the same
    /// value: neither drifts from the other, and an absent remote value reads back as
    /// the empty container the caller declared.
    EmptyAsNull,
}

/// One named attribute of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub wire_name: String,
    pub node: AttributeNode,
    pub mode: FieldMode,
    pub collection_policy: CollectionPolicy,
    /// Sent but never returned by describe (secrets). The observed value is the prior one.
    pub write_only: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, node: AttributeNode, mode: FieldMode) -> Self {
        let name = name.into();
        Self {
            wire_name: pascal_case(&name),
            name,
            node,
            mode,
            collection_policy: CollectionPolicy::OmitWhenNull,
            write_only: false,
        }
    }

    pub fn required(name: impl Into<String>, node: AttributeNode) -> Self {
        Self::new(name, node, FieldMode::Required)
    }

    pub fn optional(name: impl Into<String>, node: AttributeNode) -> Self {
        Self::new(name, node, FieldMode::Optional)
    }

    pub fn computed(name: impl Into<String>, node: AttributeNode) -> Self {
        Self::new(name, node, FieldMode::Computed)
    }

    pub fn optional_computed(name: impl Into<String>, node: AttributeNode) -> Self {
        Self::new(name, node, FieldMode::OptionalComputed)
    }

    /// Overrides the PascalCase wire name derived from the declared name.
    pub fn wire(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    /// Marks a collection field as requiring an explicit empty container to clear.
    pub fn explicit_empty(mut self) -> Self {
        self.collection_policy = CollectionPolicy::ExplicitEmpty;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    /// Marks a collection field whose empty value the remote API reports as absent.
    pub fn empty_as_null(mut self) -> Self {
        self.collection_policy = CollectionPolicy::EmptyAsNull;
        self
    }

    pub fn is_sent(&self) -> bool {
        self.mode != FieldMode::Computed
    }

    pub(crate) fn sends_explicit_empty(&self) -> bool {
        self.collection_policy == CollectionPolicy::ExplicitEmpty && self.node.is_collection()
    }

    pub(crate) fn reads_empty_as_null(&self) -> bool {
        self.collection_policy == CollectionPolicy::EmptyAsNull && self.node.is_collection()
    }
}

/// The fields of an object node, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
}

impl ObjectSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_wire(&self, wire_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }
}

/// `physical_table_map_id` -> `PhysicalTableMapId`.
pub fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
