use itertools::Itertools;
use swagbind_core::{
    codegen::{UniqueNames, UniqueNamesScope},
    ir::{Operation, Parameter, ParameterPosition},
    parse::path::PathFragment,
};

use super::{
    graph::CodegenGraph,
    naming::{escape, string_content, type_ident, value_ident},
    primitive::{SwiftType, TypePosition},
};

/// Members of `TargetType` and the other protocols that API enums
/// conform to. Cases can't have these names.
const TARGET_MEMBERS: &[&str] = &[
    "authorizationType",
    "baseURL",
    "decodeResponse",
    "headers",
    "method",
    "path",
    "responseTypes",
    "sampleData",
    "task",
    "validationType",
];

/// Server functions take a completion handler with this label.
const RESERVED_PARAMS: &[&str] = &["completion"];

/// An operation, with the Swift names of its case and parameters.
#[derive(Debug)]
pub struct CodegenOperation<'a> {
    pub op: &'a Operation,
    /// The unescaped case name.
    pub case: String,
    pub params: Vec<CodegenParameter<'a>>,
}

#[derive(Debug)]
pub struct CodegenParameter<'a> {
    pub param: &'a Parameter,
    /// The unescaped label and binding name.
    pub ident: String,
    /// The name of the enum nested in the API enum, for string
    /// parameters with values.
    pub enum_name: Option<String>,
    ty: String,
}

impl<'a> CodegenOperation<'a> {
    /// Names the operations of a group. Cases share one scope; each
    /// operation's parameters get their own; and nested enums share
    /// `types`.
    pub fn group(
        graph: &'a CodegenGraph<'a>,
        operations: &[&'a Operation],
        types: &mut UniqueNamesScope<'_>,
    ) -> Vec<Self> {
        let unique = UniqueNames::new();
        let mut cases = unique.scope_with_reserved(TARGET_MEMBERS);
        operations
            .iter()
            .map(|&op| {
                let case = cases.uniquify(&value_ident(&op.id)).into_owned();
                let mut idents = unique.scope_with_reserved(RESERVED_PARAMS);
                let params = op
                    .parameters
                    .iter()
                    .map(|param| CodegenParameter::new(graph, op, param, &mut idents, types))
                    .collect();
                Self { op, case, params }
            })
            .collect()
    }

    pub fn params_at(
        &self,
        position: ParameterPosition,
    ) -> impl Iterator<Item = &CodegenParameter<'a>> {
        self.params
            .iter()
            .filter(move |param| param.param.position == position)
    }

    /// Formats the case declaration: `listUsers(limit: Int?)`.
    pub fn declaration(&self) -> String {
        let case = escape(&self.case);
        if self.params.is_empty() {
            return case.into_owned();
        }
        let params = self
            .params
            .iter()
            .map(|param| format!("{}: {}", escape(&param.ident), param.ty(None)))
            .join(", ");
        format!("{case}({params})")
    }

    /// Formats a pattern that matches this case, binding only the
    /// parameters that `used` accepts: `.getUser(let id, _)`.
    pub fn pattern(&self, used: impl Fn(&CodegenParameter<'_>) -> bool) -> String {
        let case = escape(&self.case);
        if !self.params.iter().any(&used) {
            return format!(".{case}");
        }
        let bindings = self
            .params
            .iter()
            .map(|param| {
                if used(param) {
                    format!("let {}", escape(&param.ident))
                } else {
                    "_".to_owned()
                }
            })
            .join(", ");
        format!(".{case}({bindings})")
    }

    /// Formats a call that constructs this case, passing each
    /// parameter by name: `.getUser(id: id)`.
    pub fn construction(&self) -> String {
        let case = escape(&self.case);
        if self.params.is_empty() {
            return format!(".{case}");
        }
        let args = self
            .params
            .iter()
            .map(|param| {
                let ident = escape(&param.ident);
                format!("{ident}: {ident}")
            })
            .join(", ");
        format!(".{case}({args})")
    }

    /// Formats the path as a string literal, interpolating
    /// path parameters: `"/users/\(id)"`.
    pub fn path_literal(&self) -> String {
        let mut literal = String::from("\"");
        for segment in self.op.template.segments() {
            literal.push('/');
            for fragment in segment.fragments() {
                match fragment {
                    PathFragment::Literal(text) => {
                        literal.push_str(&string_content(text).to_string());
                    }
                    PathFragment::Param(name) => match self.path_param(name) {
                        Some(param) => literal.push_str(&format!("\\({})", param.value())),
                        None => literal.push_str(&format!("{{{}}}", string_content(name))),
                    },
                }
            }
        }
        literal.push('"');
        literal
    }

    /// Returns the path parameter that a template fragment names.
    pub fn path_param(&self, name: &str) -> Option<&CodegenParameter<'a>> {
        self.params_at(ParameterPosition::Path)
            .find(|param| param.param.name() == name)
    }

    /// Returns `true` if the path template interpolates `param`.
    pub fn interpolates(&self, param: &CodegenParameter<'_>) -> bool {
        param.param.position == ParameterPosition::Path
            && self.op.template.params().any(|name| name == param.param.name())
    }
}

impl<'a> CodegenParameter<'a> {
    fn new(
        graph: &'a CodegenGraph<'a>,
        op: &'a Operation,
        param: &'a Parameter,
        idents: &mut UniqueNamesScope<'_>,
        types: &mut UniqueNamesScope<'_>,
    ) -> Self {
        let ident = idents.uniquify(&value_ident(param.name())).into_owned();
        let enum_name = param.field.enum_values.as_ref().map(|_| {
            let name = format!("{}{}", type_ident(&op.id), type_ident(param.name()));
            types.uniquify(&name).into_owned()
        });
        let ty = SwiftType::new(graph, &param.field.node, TypePosition::Field).to_string();
        Self {
            param,
            ident,
            enum_name,
            ty,
        }
    }

    #[inline]
    pub fn required(&self) -> bool {
        self.param.field.required
    }

    /// Formats the parameter's type. Nested enum types are qualified
    /// with `owner`, if given.
    pub fn ty(&self, owner: Option<&str>) -> String {
        let ty = match (&self.enum_name, owner) {
            (Some(name), Some(owner)) => format!("{}.{}", escape(owner), escape(name)),
            (Some(name), None) => escape(name).into_owned(),
            (None, _) => self.ty.clone(),
        };
        if self.required() {
            ty
        } else {
            format!("{ty}?")
        }
    }

    /// Formats the parameter as a value for a request: its raw value
    /// if it's an enum, or itself otherwise.
    pub fn value(&self) -> String {
        let ident = escape(&self.ident);
        match (&self.enum_name, self.required()) {
            (Some(_), true) => format!("{ident}.rawValue"),
            (Some(_), false) => format!("{ident}?.rawValue"),
            (None, _) => ident.into_owned(),
        }
    }
}
