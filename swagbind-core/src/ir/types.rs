//! Language-agnostic object model types.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use crate::parse::{Method, path::PathTemplate};

/// The kind of value that a type node describes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypeKind {
    /// No value; an empty response.
    None,
    Integer,
    String,
    Boolean,
    Object,
    Array,
    Number,
    File,
}

impl FromStr for TypeKind {
    type Err = UnknownTypeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "integer" => Self::Integer,
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "array" => Self::Array,
            "number" => Self::Number,
            "file" => Self::File,
            _ => return Err(UnknownTypeKind),
        })
    }
}

#[derive(Debug)]
pub struct UnknownTypeKind;

/// A format that refines the representation of a type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    Uuid,
    Double,
    Float,
    Int32,
    Int64,
    Date,
    DateTime,
    Byte,
    Binary,
    Password,
    Email,
    Uri,
    Hostname,
    Ipv4,
    Ipv6,
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "uuid" => Self::Uuid,
            "double" => Self::Double,
            "float" => Self::Float,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "date" => Self::Date,
            "date-time" => Self::DateTime,
            "byte" => Self::Byte,
            "binary" => Self::Binary,
            "password" => Self::Password,
            "email" => Self::Email,
            "uri" => Self::Uri,
            "hostname" => Self::Hostname,
            "ipv4" => Self::Ipv4,
            "ipv6" => Self::Ipv6,
            _ => return Err(UnknownFormat),
        })
    }
}

#[derive(Debug)]
pub struct UnknownFormat;

/// Identifies a named schema by its reference path,
/// like `#/definitions/Pet`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SchemaKey(String);

impl SchemaKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment of the reference path, with
    /// JSON Pointer escapes undone.
    pub fn last_segment(&self) -> String {
        let segment = self.0.rsplit('/').next().unwrap_or(&self.0);
        segment.replace("~1", "/").replace("~0", "~")
    }
}

impl Display for SchemaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single resolved type.
///
/// Nodes are immutable once built. Array nodes always have an item
/// node; object nodes have a schema reference if they're named, a
/// value node if they're string-keyed maps, and neither if they're
/// anonymous.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrimitiveNode {
    kind: TypeKind,
    format: Option<Format>,
    items: Option<Box<PrimitiveNode>>,
    schema_ref: Option<SchemaKey>,
    values: Option<Box<PrimitiveNode>>,
}

impl PrimitiveNode {
    /// The void node.
    pub fn none() -> Self {
        Self::scalar(TypeKind::None, None)
    }

    /// Builds a node for a kind that doesn't carry nested types.
    /// Arrays and objects built this way hold anonymous objects.
    pub fn scalar(kind: TypeKind, format: Option<Format>) -> Self {
        match kind {
            TypeKind::Array => Self::array(Self::anonymous(), format),
            kind => Self {
                kind,
                format,
                items: None,
                schema_ref: None,
                values: None,
            },
        }
    }

    pub fn array(items: PrimitiveNode, format: Option<Format>) -> Self {
        Self {
            kind: TypeKind::Array,
            format,
            items: Some(Box::new(items)),
            schema_ref: None,
            values: None,
        }
    }

    /// A reference to a named schema.
    pub fn reference(key: SchemaKey) -> Self {
        Self {
            kind: TypeKind::Object,
            format: None,
            items: None,
            schema_ref: Some(key),
            values: None,
        }
    }

    /// An object with string keys and values of the given type.
    pub fn map(values: PrimitiveNode) -> Self {
        Self {
            kind: TypeKind::Object,
            format: None,
            items: None,
            schema_ref: None,
            values: Some(Box::new(values)),
        }
    }

    /// An inline object without a name.
    pub fn anonymous() -> Self {
        Self::scalar(TypeKind::Object, None)
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    #[inline]
    pub fn items(&self) -> Option<&PrimitiveNode> {
        self.items.as_deref()
    }

    #[inline]
    pub fn schema_ref(&self) -> Option<&SchemaKey> {
        self.schema_ref.as_ref()
    }

    #[inline]
    pub fn values(&self) -> Option<&PrimitiveNode> {
        self.values.as_deref()
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::None
    }
}

/// A named, typed field of a schema or operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyField {
    pub name: String,
    pub required: bool,
    /// Allowed values for string fields, in declaration order,
    /// without duplicates.
    pub enum_values: Option<Vec<String>>,
    pub node: PrimitiveNode,
    pub description: Option<String>,
}

/// A named object type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectSchema {
    pub title: String,
    pub description: Option<String>,
    pub properties: Vec<PropertyField>,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&PropertyField> {
        self.properties.iter().find(|field| field.name == name)
    }
}

/// How a parameter is sent. The declaration order is the
/// emission order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ParameterPosition {
    Body,
    Query,
    Header,
    FormData,
    Path,
}

impl FromStr for ParameterPosition {
    type Err = UnknownPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "body" => Self::Body,
            "query" => Self::Query,
            "header" => Self::Header,
            "formData" => Self::FormData,
            "path" => Self::Path,
            _ => return Err(UnknownPosition),
        })
    }
}

#[derive(Debug)]
pub struct UnknownPosition;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    pub field: PropertyField,
    pub position: ParameterPosition,
}

impl Parameter {
    #[inline]
    pub fn name(&self) -> &str {
        &self.field.name
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseEntry {
    pub status_code: String,
    pub description: String,
    pub result: PrimitiveNode,
}

impl ResponseEntry {
    /// Returns the numeric status code, or `None` for `default`
    /// and other non-numeric keys.
    pub fn numeric_code(&self) -> Option<u16> {
        self.status_code.parse().ok()
    }
}

/// A single endpoint.
#[derive(Clone, Debug)]
pub struct Operation {
    pub id: String,
    pub path: String,
    pub template: PathTemplate<'static>,
    pub method: Method,
    pub description: Option<String>,
    pub summary: Option<String>,
    /// Tags in declaration order, without duplicates.
    pub tags: Vec<String>,
    /// Parameters, sorted by position, then by name.
    pub parameters: Vec<Parameter>,
    pub responses: BTreeMap<String, ResponseEntry>,
    pub requires_auth: bool,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

impl Operation {
    /// Returns the response with the lowest 2xx status code
    /// that has a non-void result.
    pub fn success(&self) -> Option<&ResponseEntry> {
        self.responses
            .values()
            .filter(|response| !response.result.is_void())
            .filter_map(|response| Some((response.numeric_code()?, response)))
            .filter(|&(code, _)| (200..300).contains(&code))
            .min_by_key(|&(code, _)| code)
            .map(|(_, response)| response)
    }
}
