use itertools::Itertools;
use swagbind_core::{
    codegen::{SourceUnit, UniqueNames},
    ir::ParameterPosition,
};
use tracing::debug;

use super::{
    config::GeneratorConfig,
    graph::{CodegenGraph, CodegenGroup},
    model::string_enum,
    naming::{escape, string_literal},
    operation::{CodegenOperation, CodegenParameter},
    primitive::{SwiftType, TypePosition},
    server::server_extension,
    writer::SwiftWriter,
};

/// Generates the API enum for a tag group, and its conformances.
#[derive(Debug)]
pub struct CodegenApi<'a> {
    graph: &'a CodegenGraph<'a>,
    group: &'a CodegenGroup<'a>,
    config: &'a GeneratorConfig,
}

impl<'a> CodegenApi<'a> {
    pub fn new(
        graph: &'a CodegenGraph<'a>,
        group: &'a CodegenGroup<'a>,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            graph,
            group,
            config,
        }
    }

    pub fn into_unit(self) -> SourceUnit {
        let name = self.group.name;
        let unique = UniqueNames::new();
        let mut types = unique.scope_with_reserved(self.graph.top_level_names());
        let ops = CodegenOperation::group(self.graph, &self.group.group.operations, &mut types);

        let mut w = SwiftWriter::file(true);
        w.blank();
        self.write_enum(&mut w, &ops);
        w.blank();
        self.write_target_type(&mut w, &ops);
        if let Some(kind) = self.config.emit_auth_conformance {
            w.blank();
            w.block(
                format_args!("extension {}: AccessTokenAuthorizable", escape(name)),
                |w| {
                    self.switch(w, "var authorizationType: AuthorizationType?", &ops, |op| {
                        let marker = if op.op.requires_auth {
                            kind.marker()
                        } else {
                            ".none"
                        };
                        (op.pattern(|_| false), marker.to_owned())
                    });
                },
            );
        }
        if self.config.emit_response_decoding {
            w.blank();
            w.block(
                format_args!("extension {}: TargetTypeResponse", escape(name)),
                |w| {
                    self.switch(w, "var responseTypes: [Int: Decodable.Type]", &ops, |op| {
                        (op.pattern(|_| false), self.response_types(op))
                    });
                },
            );
        }
        if self.config.emit_server_wrapper {
            w.blank();
            server_extension(&mut w, self.graph, name, &ops, self.config);
        }

        debug!(name, operations = ops.len(), "generated API");
        SourceUnit::new(format!("APIs/{name}.swift"), w.finish())
    }

    fn write_enum(&self, w: &mut SwiftWriter, ops: &[CodegenOperation<'_>]) {
        let access = self.config.access_level.modifier();
        w.block(
            format_args!("{access} enum {}", escape(self.group.name)),
            |w| {
                for param in ops.iter().flat_map(|op| &op.params) {
                    if let (Some(name), Some(values)) =
                        (&param.enum_name, &param.param.field.enum_values)
                    {
                        string_enum(w, access, name, values);
                        w.blank();
                    }
                }
                for op in ops {
                    self.write_case_doc(w, op);
                    w.line(format_args!("case {}", op.declaration()));
                }
            },
        );
    }

    fn write_case_doc(&self, w: &mut SwiftWriter, op: &CodegenOperation<'_>) {
        if let Some(text) = op.op.description.as_ref().or(op.op.summary.as_ref()) {
            w.doc(text);
        }
        if op.op.responses.is_empty() {
            return;
        }
        w.line("/// - responses:");
        for (code, response) in &op.op.responses {
            let ty = SwiftType::new(self.graph, &response.result, TypePosition::Response);
            w.line(format_args!("///     - {code}: {ty}"));
        }
    }

    fn write_target_type(&self, w: &mut SwiftWriter, ops: &[CodegenOperation<'_>]) {
        let access = self.config.access_level.modifier();
        w.block(
            format_args!("extension {}: TargetType", escape(self.group.name)),
            |w| {
                w.line(format_args!(
                    "{access} var baseURL: URL {{ return URL(string: {})! }}",
                    string_literal(&self.graph.base_url)
                ));
                w.blank();

                self.switch(w, "var path: String", ops, |op| {
                    (op.pattern(|param| op.interpolates(param)), op.path_literal())
                });
                w.blank();

                self.switch(w, "var method: Moya.Method", ops, |op| {
                    (op.pattern(|_| false), format!(".{}", op.op.method.as_str()))
                });
                w.blank();

                if ops.iter().any(|op| headers(op).is_some()) {
                    self.switch(w, "var headers: [String: String]?", ops, |op| {
                        let pattern =
                            op.pattern(|param| param.param.position == ParameterPosition::Header);
                        let value = headers(op).unwrap_or_else(|| "nil".to_owned());
                        (pattern, value)
                    });
                } else {
                    w.line(format_args!(
                        "{access} var headers: [String: String]? {{ return nil }}"
                    ));
                }
                w.blank();

                self.switch(w, "var task: Moya.Task", ops, |op| {
                    let pattern = op.pattern(|param| {
                        matches!(
                            param.param.position,
                            ParameterPosition::Body
                                | ParameterPosition::Query
                                | ParameterPosition::FormData
                        )
                    });
                    (pattern, task(op))
                });
                w.blank();

                w.line(format_args!(
                    "{access} var sampleData: Data {{ return Data() }}"
                ));
            },
        );
    }

    /// Writes a computed property that switches on every case,
    /// returning the expression that `arm` gives for it.
    fn switch(
        &self,
        w: &mut SwiftWriter,
        property: &str,
        ops: &[CodegenOperation<'_>],
        arm: impl Fn(&CodegenOperation<'_>) -> (String, String),
    ) {
        let access = self.config.access_level.modifier();
        w.block(format_args!("{access} {property}"), |w| {
            // Swift doesn't indent `case`s under a `switch`.
            w.line("switch self {");
            for op in ops {
                let (pattern, value) = arm(op);
                w.line(format_args!("case {pattern}: return {value}"));
            }
            w.line("}");
        });
    }

    /// Formats the response types map: `[200: [User].self]`.
    fn response_types(&self, op: &CodegenOperation<'_>) -> String {
        let types = op
            .op
            .responses
            .values()
            .filter(|response| !response.result.is_void())
            .filter_map(|response| Some((response.numeric_code()?, response)))
            .sorted_by_key(|&(code, _)| code)
            .map(|(code, response)| {
                let ty = SwiftType::new(self.graph, &response.result, TypePosition::Response);
                format!("{code}: {ty}.self")
            })
            .collect_vec();
        if types.is_empty() {
            "[:]".to_owned()
        } else {
            format!("[{}]", types.join(", "))
        }
    }
}

/// Formats a `[String: Any?]` dictionary literal of parameter values.
fn dictionary<'p, 'a: 'p>(
    params: impl IntoIterator<Item = &'p CodegenParameter<'a>>,
    value: impl Fn(&CodegenParameter<'_>) -> String,
) -> Option<String> {
    let entries = params
        .into_iter()
        .map(|param| format!("{}: {}", string_literal(param.param.name()), value(param)))
        .collect_vec();
    if entries.is_empty() {
        None
    } else {
        Some(format!("([{}] as [String: Any?])", entries.join(", ")))
    }
}

/// Formats the headers for an operation, or `None` if it has no
/// header parameters and doesn't consume a media type.
fn headers(op: &CodegenOperation<'_>) -> Option<String> {
    let content_type = op
        .op
        .consumes
        .first()
        .map(|media| format!("\"Content-Type\": {}", string_literal(media)));
    let entries = content_type
        .into_iter()
        .chain(op.params_at(ParameterPosition::Header).map(|param| {
            format!("{}: {}", string_literal(param.param.name()), param.value())
        }))
        .collect_vec();
    if entries.is_empty() {
        None
    } else {
        Some(format!(
            "([{}] as [String: Any?]).unoptString()",
            entries.join(", ")
        ))
    }
}

/// Picks how an operation sends its parameters.
fn task(op: &CodegenOperation<'_>) -> String {
    let body = op.params_at(ParameterPosition::Body).collect_vec();
    let query = dictionary(op.params_at(ParameterPosition::Query), |param| param.value())
        .map(|dict| format!("{dict}.unopt()"));
    let form = dictionary(op.params_at(ParameterPosition::FormData), |param| {
        param.value()
    })
        .map(|dict| format!("{dict}.multipartFormData()"));

    match (form, query, &*body) {
        (Some(form), Some(query), _) => {
            format!(".uploadCompositeMultipart({form}, urlParameters: {query})")
        }
        (Some(form), None, _) => format!(".uploadMultipart({form})"),
        (None, None, []) => ".requestPlain".to_owned(),
        (None, None, [body]) => format!(".requestJSONEncodable({})", escape(&body.ident)),
        (None, query, body) => {
            let body = dictionary(body.iter().copied(), |param| {
                let ident = escape(&param.ident);
                if param.required() {
                    format!("{ident}.jsonObject()")
                } else {
                    format!("{ident}?.jsonObject()")
                }
            })
            .map(|dict| format!("{dict}.unopt()"))
            .unwrap_or_else(|| "[:]".to_owned());
            let query = query.unwrap_or_else(|| "[:]".to_owned());
            format!(
                ".requestCompositeParameters(bodyParameters: {body}, \
                 bodyEncoding: JSONEncoding(), urlParameters: {query})"
            )
        }
    }
}
