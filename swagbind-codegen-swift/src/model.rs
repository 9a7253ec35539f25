use itertools::Itertools;
use swagbind_core::{
    codegen::{SourceUnit, UniqueNames},
    ir::PropertyField,
};
use tracing::debug;

use super::{
    config::GeneratorConfig,
    graph::{CodegenGraph, CodegenSchema},
    naming::{escape, string_literal, type_ident, value_ident},
    primitive::{SwiftType, TypePosition},
    writer::SwiftWriter,
};

/// Generates a `Codable` struct for a named schema.
#[derive(Debug)]
pub struct CodegenModel<'a> {
    graph: &'a CodegenGraph<'a>,
    schema: CodegenSchema<'a>,
    config: &'a GeneratorConfig,
}

struct ModelField<'a> {
    field: &'a PropertyField,
    /// The unescaped Swift name.
    ident: String,
    /// The name of the nested enum, for string fields with values.
    enum_name: Option<String>,
    ty: String,
}

impl<'a> CodegenModel<'a> {
    pub fn new(
        graph: &'a CodegenGraph<'a>,
        schema: CodegenSchema<'a>,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            graph,
            schema,
            config,
        }
    }

    pub fn into_unit(self) -> SourceUnit {
        let access = self.config.access_level.modifier();
        let binding = if self.config.mutable_fields {
            "var"
        } else {
            "let"
        };

        let unique = UniqueNames::new();
        let mut field_names = unique.scope();
        let mut type_names = unique.scope_with_reserved(self.graph.top_level_names());
        let fields = self
            .schema
            .schema
            .properties
            .iter()
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .map(|field| {
                let ident = field_names.uniquify(&value_ident(&field.name)).into_owned();
                let enum_name = field
                    .enum_values
                    .as_ref()
                    .map(|_| type_names.uniquify(&type_ident(&field.name)).into_owned());
                let ty = match &enum_name {
                    Some(name) => escape(name).into_owned(),
                    None => SwiftType::new(self.graph, &field.node, TypePosition::Field).to_string(),
                };
                let ty = if field.required { ty } else { format!("{ty}?") };
                ModelField {
                    field,
                    ident,
                    enum_name,
                    ty,
                }
            })
            .collect_vec();

        let mut w = SwiftWriter::file(false);
        w.blank();
        if let Some(description) = &self.schema.schema.description {
            w.doc(description);
        }
        w.block(
            format_args!("{access} struct {}: Codable", escape(self.schema.name)),
            |w| {
                for field in &fields {
                    if let (Some(name), Some(values)) = (&field.enum_name, &field.field.enum_values)
                    {
                        string_enum(w, access, name, values);
                        w.blank();
                    }
                }

                for field in &fields {
                    if let Some(description) = &field.field.description {
                        w.doc(description);
                    }
                    w.line(format_args!(
                        "{access} {binding} {}: {}",
                        escape(&field.ident),
                        field.ty
                    ));
                }
                if !fields.is_empty() {
                    w.blank();
                }

                if fields.iter().any(|field| field.ident != field.field.name) {
                    w.block("enum CodingKeys: String, CodingKey", |w| {
                        for field in &fields {
                            if field.ident == field.field.name {
                                w.line(format_args!("case {}", escape(&field.ident)));
                            } else {
                                w.line(format_args!(
                                    "case {} = {}",
                                    escape(&field.ident),
                                    string_literal(&field.field.name)
                                ));
                            }
                        }
                    });
                    w.blank();
                }

                if fields.is_empty() {
                    w.line(format_args!("{access} init() {{}}"));
                    return;
                }
                let params = fields
                    .iter()
                    .map(|field| {
                        let default =
                            if !field.field.required && self.config.optional_field_defaults {
                                " = nil"
                            } else {
                                ""
                            };
                        format!("{}: {}{default}", escape(&field.ident), field.ty)
                    })
                    .join(", ");
                w.block(format_args!("{access} init({params})"), |w| {
                    for field in &fields {
                        let ident = escape(&field.ident);
                        w.line(format_args!("self.{ident} = {ident}"));
                    }
                });
            },
        );

        debug!(name = self.schema.name, fields = fields.len(), "generated model");
        SourceUnit::new(format!("Models/{}.swift", self.schema.name), w.finish())
    }
}

/// Writes a nested `String`-backed enum with one case per value,
/// sorted by value.
pub(crate) fn string_enum(w: &mut SwiftWriter, access: &str, name: &str, values: &[String]) {
    let unique = UniqueNames::new();
    let mut cases = unique.scope();
    w.block(
        format_args!("{access} enum {}: String, Codable", escape(name)),
        |w| {
            for value in values.iter().sorted() {
                let case = cases.uniquify(&value_ident(value)).into_owned();
                w.line(format_args!(
                    "case {} = {}",
                    escape(&case),
                    string_literal(value)
                ));
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use swagbind_core::{ir::IrSpec, parse::Document};

    use crate::config::AccessLevel;

    fn model(doc: &str, name: &str, config: &GeneratorConfig) -> String {
        let doc = Document::from_yaml(doc).unwrap();
        let spec = IrSpec::from_doc(&doc).unwrap();
        let graph = CodegenGraph::new(&spec);
        let schema = graph
            .schemas()
            .into_iter()
            .find(|schema| schema.name == name)
            .unwrap();
        CodegenModel::new(&graph, schema, config)
            .into_unit()
            .contents
    }

    const USER: &str = indoc::indoc! {"
        paths:
          /users:
            get:
              operationId: listUsers
              tags: [users]
              responses:
                '200':
                  description: ok
                  schema: { $ref: '#/definitions/User' }
        definitions:
          User:
            title: User
            description: A registered user.
            type: object
            required: [id]
            properties:
              name: { type: string, description: The display name. }
              id: { type: string, format: uuid }
              status: { type: string, enum: [inactive, active] }
              tags: { type: array, items: { type: string } }
    "};

    #[test]
    fn test_model_with_enum_and_optional_fields() {
        let code = model(USER, "User", &GeneratorConfig::default());

        assert_eq!(
            code,
            indoc::indoc! {r#"
                // swiftformat:disable all
                // swiftlint:disable all
                // Generated file

                import Foundation

                /// A registered user.
                public struct User: Codable {
                    public enum Status: String, Codable {
                        case active = "active"
                        case inactive = "inactive"
                    }

                    public let id: UUID
                    /// The display name.
                    public let name: String?
                    public let status: Status?
                    public let tags: [String]?

                    public init(id: UUID, name: String?, status: Status?, tags: [String]?) {
                        self.id = id
                        self.name = name
                        self.status = status
                        self.tags = tags
                    }
                }
            "#}
        );
    }

    #[test]
    fn test_model_options() {
        let config = GeneratorConfig {
            access_level: AccessLevel::Internal,
            optional_field_defaults: true,
            mutable_fields: true,
            ..Default::default()
        };

        let code = model(USER, "User", &config);

        assert!(code.contains("internal struct User: Codable {"));
        assert!(code.contains("    internal var id: UUID\n"));
        assert!(code.contains(
            "internal init(id: UUID, name: String? = nil, status: Status? = nil, tags: [String]? = nil) {"
        ));
    }

    #[test]
    fn test_coding_keys_for_renamed_and_escaped_fields() {
        let code = model(
            indoc::indoc! {"
                paths:
                  /a:
                    get:
                      operationId: a
                      tags: [a]
                      responses:
                        '200':
                          description: ok
                          schema: { $ref: '#/definitions/Thing' }
                definitions:
                  Thing:
                    type: object
                    required: [default, first-name]
                    properties:
                      default: { type: boolean }
                      first-name: { type: string }
                      Count: { type: integer, format: int64 }
            "},
            "Thing",
            &GeneratorConfig::default(),
        );

        assert_eq!(
            code,
            indoc::indoc! {r#"
                // swiftformat:disable all
                // swiftlint:disable all
                // Generated file

                import Foundation

                public struct Thing: Codable {
                    public let count: Int64?
                    public let `default`: Bool
                    public let firstname: String

                    enum CodingKeys: String, CodingKey {
                        case count = "Count"
                        case `default`
                        case firstname = "first-name"
                    }

                    public init(count: Int64?, `default`: Bool, firstname: String) {
                        self.count = count
                        self.`default` = `default`
                        self.firstname = firstname
                    }
                }
            "#}
        );
    }

    #[test]
    fn test_empty_model_and_shadowing_enum() {
        const DOC: &str = indoc::indoc! {"
                paths:
                  /a:
                    get:
                      operationId: a
                      tags: [a]
                      responses:
                        '200':
                          description: ok
                          schema: { $ref: '#/definitions/Wrapper' }
                        '201':
                          description: ok
                          schema: { $ref: '#/definitions/Empty' }
                definitions:
                  Empty:
                    type: object
                  Wrapper:
                    type: object
                    properties:
                      wrapper: { type: string, enum: [a, a-b, 'A'] }
        "};

        let code = model(DOC, "Wrapper", &GeneratorConfig::default());

        // The nested enum can't shadow its own struct.
        assert!(code.contains("public enum Wrapper2: String, Codable {"));
        assert!(code.contains(concat!(
            "        case a = \"A\"\n",
            "        case a2 = \"a\"\n",
            "        case ab = \"a-b\"\n",
        )));
        assert!(code.contains("public let wrapper: Wrapper2?"));

        let code = model(DOC, "Empty", &GeneratorConfig::default());

        assert!(code.ends_with(indoc::indoc! {"
            public struct Empty: Codable {
                public init() {}
            }
        "}));
    }
}
