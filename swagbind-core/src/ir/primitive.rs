use itertools::Itertools;
use tracing::{debug, trace};

use crate::parse::{AdditionalProperties, Document, RefOr, RefOrSchema, Schema};

use super::{
    error::IrError,
    registry::Registry,
    types::{Format, ObjectSchema, PrimitiveNode, PropertyField, SchemaKey, TypeKind},
};

/// Turns schema fragments into typed nodes, loading named
/// schemas into the registry as references are found.
#[derive(Debug)]
pub struct Resolver<'a> {
    doc: &'a Document,
    registry: Registry,
}

impl<'a> Resolver<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            registry: Registry::default(),
        }
    }

    #[inline]
    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Resolves a fragment that may be a reference.
    pub fn node(&mut self, schema: &RefOrSchema) -> Result<PrimitiveNode, IrError> {
        match schema {
            RefOr::Ref(r) => {
                let key = SchemaKey::new(r.path.as_str());
                self.schema(&key)?;
                Ok(PrimitiveNode::reference(key))
            }
            RefOr::Other(schema) => self.inline(schema),
        }
    }

    /// Resolves an inline fragment, using its `type` and `format`.
    /// A fragment without a `type` is void.
    pub fn inline(&mut self, schema: &Schema) -> Result<PrimitiveNode, IrError> {
        let Some(ty) = schema.ty.as_deref() else {
            return Ok(PrimitiveNode::none());
        };
        let kind = ty
            .parse::<TypeKind>()
            .map_err(|_| IrError::UnknownType(ty.to_owned()))?;
        let format = schema
            .format
            .as_deref()
            .map(|format| {
                format
                    .parse::<Format>()
                    .map_err(|_| IrError::UnknownFormat(format.to_owned()))
            })
            .transpose()?;

        Ok(match kind {
            TypeKind::Array => match &schema.items {
                Some(items) => PrimitiveNode::array(self.node(items).map(or_anonymous)?, format),
                None => PrimitiveNode::scalar(TypeKind::Array, format),
            },
            TypeKind::Object if schema.properties.is_empty() => {
                match &schema.additional_properties {
                    Some(AdditionalProperties::RefOrSchema(values)) => {
                        PrimitiveNode::map(self.node(values).map(or_anonymous)?)
                    }
                    Some(AdditionalProperties::Bool(true)) => {
                        PrimitiveNode::map(PrimitiveNode::anonymous())
                    }
                    _ => PrimitiveNode::anonymous(),
                }
            }
            kind => PrimitiveNode::scalar(kind, format),
        })
    }

    /// Resolves a named field.
    pub fn field(
        &mut self,
        name: &str,
        schema: &RefOrSchema,
        required: bool,
    ) -> Result<PropertyField, IrError> {
        let node = self.node(schema)?;
        let (description, enum_values) = match schema {
            RefOr::Other(schema) => (
                schema.description.clone(),
                enum_values(&node, schema),
            ),
            RefOr::Ref(_) => (None, None),
        };
        Ok(PropertyField {
            name: name.to_owned(),
            required,
            enum_values,
            node,
            description,
        })
    }

    /// Loads the named schema at `key` into the registry, if it's not
    /// there already.
    pub fn schema(&mut self, key: &SchemaKey) -> Result<(), IrError> {
        if !self.registry.reserve(key) {
            trace!(%key, "schema already registered");
            return Ok(());
        }

        let fragment: Schema = self.doc.resolve(key.as_str())?;
        let properties = fragment
            .properties
            .iter()
            .map(|(name, schema)| {
                let required = fragment.required.iter().any(|r| r == name);
                self.field(name, schema, required)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let schema = ObjectSchema {
            title: fragment.title.unwrap_or_else(|| key.last_segment()),
            description: fragment.description,
            properties,
        };

        debug!(
            %key,
            title = %schema.title,
            properties = schema.properties.len(),
            "resolved schema"
        );
        self.registry.fill(key.clone(), schema);
        Ok(())
    }
}

/// Collects the distinct string values of a string field's `enum`.
pub(super) fn enum_values(node: &PrimitiveNode, schema: &Schema) -> Option<Vec<String>> {
    if node.kind() != TypeKind::String {
        return None;
    }
    let values = schema
        .variants
        .as_ref()?
        .iter()
        .filter_map(|value| value.as_str())
        .unique()
        .map(str::to_owned)
        .collect_vec();
    (!values.is_empty()).then_some(values)
}

/// Arrays and maps of nothing hold anonymous objects instead.
fn or_anonymous(node: PrimitiveNode) -> PrimitiveNode {
    if node.is_void() {
        PrimitiveNode::anonymous()
    } else {
        node
    }
}
