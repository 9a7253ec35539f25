use std::collections::{BTreeMap, btree_map::Entry};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::parse::{
    self, Document, Method, Operation as OperationDef, Parameter as ParameterDef, RefOr,
    RefOrParameter, RefOrResponse, Response as ResponseDef,
};

use super::{
    error::IrError,
    primitive::{Resolver, enum_values},
    registry::Registry,
    types::{
        Operation, Parameter, ParameterPosition, PrimitiveNode, PropertyField, ResponseEntry,
    },
};

/// A fully processed document: the base URL, every named schema that
/// its operations reach, and its operations grouped by tag.
#[derive(Debug)]
pub struct IrSpec {
    pub base_url: String,
    pub registry: Registry,
    pub operations: Vec<Operation>,
    /// Indices into `operations` for each tag, sorted by operation ID.
    groups: BTreeMap<String, Vec<usize>>,
}

impl IrSpec {
    pub fn from_doc(doc: &Document) -> Result<Self, IrError> {
        let mut resolver = Resolver::new(doc);

        let mut ids = BTreeMap::new();
        let mut operations = Vec::new();
        for (path, item) in &doc.paths {
            for (method, op) in item.operations() {
                let operation = build_operation(&mut resolver, path, method, op, &item.parameters)?;
                match ids.entry(operation.id.clone()) {
                    Entry::Vacant(entry) => entry.insert(operations.len()),
                    Entry::Occupied(entry) => {
                        return Err(IrError::DuplicateOperationId(entry.key().clone()));
                    }
                };
                debug!(
                    id = %operation.id,
                    %method,
                    %path,
                    parameters = operation.parameters.len(),
                    "parsed operation"
                );
                operations.push(operation);
            }
        }

        let groups = group_by_tag(&operations);

        Ok(Self {
            base_url: base_url(doc),
            registry: resolver.into_registry(),
            operations,
            groups,
        })
    }

    /// Replaces the base URL derived from the document's
    /// `host` and `basePath`.
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }

    /// Returns the operation groups, sorted by tag.
    pub fn groups(&self) -> impl Iterator<Item = OperationGroup<'_>> {
        self.groups.iter().map(|(tag, indices)| OperationGroup {
            tag,
            operations: indices.iter().map(|&index| &self.operations[index]).collect(),
        })
    }

    /// Returns the operations for a single tag.
    pub fn group(&self, tag: &str) -> Option<OperationGroup<'_>> {
        let (tag, indices) = self.groups.get_key_value(tag)?;
        Some(OperationGroup {
            tag,
            operations: indices.iter().map(|&index| &self.operations[index]).collect(),
        })
    }
}

/// The operations that share a tag, sorted by ID.
#[derive(Clone, Debug)]
pub struct OperationGroup<'a> {
    pub tag: &'a str,
    pub operations: Vec<&'a Operation>,
}

fn base_url(doc: &Document) -> String {
    let host = doc.host.as_deref().unwrap_or_default();
    let base_path = doc.base_path.as_deref().unwrap_or_default();
    if host.is_empty() {
        warn!("document has no `host`; the base URL will have an empty authority");
    }
    format!("https://{host}{base_path}")
}

fn group_by_tag(operations: &[Operation]) -> BTreeMap<String, Vec<usize>> {
    let mut groups = BTreeMap::<_, Vec<_>>::new();
    for (index, op) in operations.iter().enumerate() {
        if op.tags.is_empty() {
            warn!(id = %op.id, "operation has no tags; it won't be generated");
        }
        for tag in &op.tags {
            groups.entry(tag.clone()).or_default().push(index);
        }
    }
    for indices in groups.values_mut() {
        indices.sort_by(|&a, &b| operations[a].id.cmp(&operations[b].id));
    }
    groups
}

fn build_operation(
    resolver: &mut Resolver<'_>,
    path: &str,
    method: Method,
    op: &OperationDef,
    shared: &[RefOrParameter],
) -> Result<Operation, IrError> {
    let id = op
        .operation_id
        .as_deref()
        .ok_or_else(|| IrError::NoOperationId {
            path: path.to_owned(),
            method,
        })?;

    let template = parse::path::parse(path)
        .map_err(|source| IrError::BadOperationPath {
            operation: id.to_owned(),
            source,
        })?
        .into_owned();

    // Operation parameters override path-level parameters
    // with the same name and position.
    let mut parameters = Vec::<Parameter>::new();
    for param in op.parameters.iter().chain(shared) {
        let param = build_parameter(resolver, id, param)?;
        let overridden = parameters
            .iter()
            .any(|p| p.name() == param.name() && p.position == param.position);
        if !overridden {
            parameters.push(param);
        }
    }
    parameters.sort_by(|a, b| (a.position, a.name()).cmp(&(b.position, b.name())));

    let responses = op
        .responses
        .iter()
        .map(|(code, response)| {
            let entry = build_response(resolver, code, response)?;
            Ok((code.clone(), entry))
        })
        .collect::<Result<_, IrError>>()?;

    Ok(Operation {
        id: id.to_owned(),
        path: path.to_owned(),
        template,
        method,
        description: op.description.clone(),
        summary: op.summary.clone(),
        tags: op.tags.iter().unique().cloned().collect(),
        parameters,
        responses,
        requires_auth: op.security.is_some(),
        consumes: op.consumes.clone(),
        produces: op.produces.clone(),
    })
}

fn build_parameter(
    resolver: &mut Resolver<'_>,
    operation: &str,
    param: &RefOrParameter,
) -> Result<Parameter, IrError> {
    let resolved;
    let param = match param {
        RefOr::Other(param) => param,
        RefOr::Ref(r) => {
            resolved = resolver.doc().resolve::<ParameterDef>(&r.path)?;
            &resolved
        }
    };

    let name = param
        .name
        .as_deref()
        .ok_or_else(|| IrError::NoParameterName {
            operation: operation.to_owned(),
        })?;
    let location = param
        .location
        .as_deref()
        .ok_or_else(|| IrError::NoParameterPosition {
            operation: operation.to_owned(),
            parameter: name.to_owned(),
        })?;
    let position = location
        .parse::<ParameterPosition>()
        .map_err(|_| IrError::UnknownPosition {
            operation: operation.to_owned(),
            parameter: name.to_owned(),
            position: location.to_owned(),
        })?;

    // Path parameters can't be left out.
    let required = param.required || position == ParameterPosition::Path;
    let mut field = match &param.schema {
        Some(schema) => resolver.field(name, schema, required)?,
        None => {
            let node = resolver.inline(&param.inline)?;
            let enum_values = enum_values(&node, &param.inline);
            PropertyField {
                name: name.to_owned(),
                required,
                enum_values,
                node,
                description: None,
            }
        }
    };
    // The parameter's own description wins over its schema's.
    if param.description.is_some() {
        field.description = param.description.clone();
    }

    Ok(Parameter { field, position })
}

fn build_response(
    resolver: &mut Resolver<'_>,
    code: &str,
    response: &RefOrResponse,
) -> Result<ResponseEntry, IrError> {
    let resolved;
    let response = match response {
        RefOr::Other(response) => response,
        RefOr::Ref(r) => {
            resolved = resolver.doc().resolve::<ResponseDef>(&r.path)?;
            &resolved
        }
    };
    let result = match &response.schema {
        Some(schema) => resolver.node(schema)?,
        None => PrimitiveNode::none(),
    };
    Ok(ResponseEntry {
        status_code: code.to_owned(),
        description: response.description.clone().unwrap_or_default(),
        result,
    })
}
