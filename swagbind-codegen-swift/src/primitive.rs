use std::fmt::{Display, Formatter, Result as FmtResult};

use swagbind_core::ir::{Format, PrimitiveNode, TypeKind};

use super::graph::CodegenGraph;

/// Where a type appears. Void and file types map differently
/// in responses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypePosition {
    /// A model field or an operation parameter.
    Field,
    /// The result of a response.
    Response,
}

/// Formats a node as a Swift type.
#[derive(Clone, Copy, Debug)]
pub struct SwiftType<'a> {
    graph: &'a CodegenGraph<'a>,
    node: &'a PrimitiveNode,
    position: TypePosition,
}

impl<'a> SwiftType<'a> {
    pub fn new(graph: &'a CodegenGraph<'a>, node: &'a PrimitiveNode, position: TypePosition) -> Self {
        Self {
            graph,
            node,
            position,
        }
    }

    /// Returns the same position for a nested node. Only the outermost
    /// type of a response can be `Void`.
    fn nested(self, node: &'a PrimitiveNode) -> Self {
        Self { node, ..self }
    }
}

impl Display for SwiftType<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        fmt_node(self, f, true)
    }
}

fn fmt_node(ty: &SwiftType<'_>, f: &mut Formatter<'_>, outermost: bool) -> FmtResult {
    let node = ty.node;
    match node.kind() {
        TypeKind::None if outermost && ty.position == TypePosition::Response => f.write_str("Void"),
        TypeKind::None => f.write_str("AnyObjectValue"),
        TypeKind::Integer => f.write_str(match node.format() {
            Some(Format::Int32) => "Int32",
            Some(Format::Int64) => "Int64",
            _ => "Int",
        }),
        TypeKind::Number => f.write_str(match node.format() {
            Some(Format::Float) => "Float",
            _ => "Double",
        }),
        TypeKind::String => f.write_str(match node.format() {
            Some(Format::Uuid) => "UUID",
            _ => "String",
        }),
        TypeKind::Boolean => f.write_str("Bool"),
        TypeKind::File => f.write_str(match ty.position {
            TypePosition::Field => "FileValue",
            TypePosition::Response => "Data",
        }),
        TypeKind::Array => match node.items() {
            Some(items) => {
                f.write_str("[")?;
                fmt_node(&ty.nested(items), f, false)?;
                f.write_str("]")
            }
            None => f.write_str("[AnyObjectValue]"),
        },
        TypeKind::Object => {
            if let Some(key) = node.schema_ref() {
                f.write_str(ty.graph.type_name(key).unwrap_or("AnyObjectValue"))
            } else if let Some(values) = node.values() {
                f.write_str("[String: ")?;
                fmt_node(&ty.nested(values), f, false)?;
                f.write_str("]")
            } else {
                f.write_str("AnyObjectValue")
            }
        }
    }
}
