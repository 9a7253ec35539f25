//! End-to-end tests for a whole set of generated units.

use itertools::Itertools;
use pretty_assertions::assert_eq;
use swagbind_core::{codegen::SourceUnit, ir::IrSpec, parse::Document};

use crate::{CodegenGraph, config::GeneratorConfig, synthesize};

const PETSTORE: &str = indoc::indoc! {"
    host: petstore.example.com
    basePath: /v2
    paths:
      /pets:
        get:
          operationId: listPets
          tags: [pets, store]
          responses:
            '200':
              description: ok
              schema:
                type: array
                items: { $ref: '#/definitions/Pet' }
      /users/{id}:
        get:
          operationId: getUser
          tags: [users]
          parameters:
            - { name: id, in: path, type: string, required: true }
          responses:
            '200':
              description: ok
              schema: { $ref: '#/definitions/User' }
    definitions:
      Pet:
        type: object
        required: [name]
        properties:
          name: { type: string }
          parent: { $ref: '#/definitions/Pet' }
      User:
        type: object
        required: [id]
        properties:
          id: { type: string }
          name: { type: string }
"};

fn units(doc: &str, config: &GeneratorConfig) -> Vec<SourceUnit> {
    let doc = Document::from_yaml(doc).unwrap();
    let spec = IrSpec::from_doc(&doc).unwrap();
    let graph = CodegenGraph::new(&spec);
    synthesize(&graph, config)
}

fn unit<'a>(units: &'a [SourceUnit], path: &str) -> &'a str {
    units
        .iter()
        .find(|unit| unit.path == path)
        .map(|unit| unit.contents.as_str())
        .unwrap_or_else(|| panic!("expected unit `{path}`"))
}

#[test]
fn test_unit_order() {
    let units = units(PETSTORE, &GeneratorConfig::default());

    let paths = units.iter().map(|unit| unit.path.as_str()).collect_vec();
    assert_eq!(
        paths,
        [
            "Models/Pet.swift",
            "Models/User.swift",
            "Utils.swift",
            "APIs/PetsAPI.swift",
            "APIs/StoreAPI.swift",
            "APIs/UsersAPI.swift",
        ]
    );
}

#[test]
fn test_server_unit_follows_utils() {
    let config = GeneratorConfig {
        emit_server_wrapper: true,
        ..Default::default()
    };

    let units = units(PETSTORE, &config);

    let paths = units.iter().map(|unit| unit.path.as_str()).collect_vec();
    assert_eq!(&paths[2..4], ["Utils.swift", "Server.swift"]);
    assert!(unit(&units, "APIs/UsersAPI.swift").contains("extension Server where Target == UsersAPI {"));
}

#[test]
fn test_output_is_deterministic() {
    let config = GeneratorConfig {
        emit_response_decoding: true,
        emit_server_wrapper: true,
        ..Default::default()
    };

    assert_eq!(units(PETSTORE, &config), units(PETSTORE, &config));
}

#[test]
fn test_output_ignores_document_order() {
    let forward = indoc::indoc! {"
        paths:
          /a:
            get:
              operationId: getA
              tags: [things]
              parameters:
                - { name: sort, in: query, type: string, enum: [desc, asc] }
              responses:
                '200':
                  description: ok
                  schema: { $ref: '#/definitions/A' }
          /b:
            get:
              operationId: getB
              tags: [things, other]
              responses:
                '200':
                  description: ok
                  schema: { $ref: '#/definitions/B' }
        definitions:
          A:
            title: Same
            type: object
            properties:
              b: { $ref: '#/definitions/B' }
          B:
            title: Same
            type: object
            properties:
              kind: { type: string, enum: [y, x] }
    "};
    let backward = indoc::indoc! {"
        paths:
          /b:
            get:
              operationId: getB
              tags: [things, other]
              responses:
                '200':
                  description: ok
                  schema: { $ref: '#/definitions/B' }
          /a:
            get:
              operationId: getA
              tags: [things]
              parameters:
                - { name: sort, in: query, type: string, enum: [desc, asc] }
              responses:
                '200':
                  description: ok
                  schema: { $ref: '#/definitions/A' }
        definitions:
          B:
            title: Same
            type: object
            properties:
              kind: { type: string, enum: [y, x] }
          A:
            title: Same
            type: object
            properties:
              b: { $ref: '#/definitions/B' }
    "};
    let config = GeneratorConfig {
        emit_response_decoding: true,
        emit_server_wrapper: true,
        ..Default::default()
    };

    let generated = units(forward, &config);

    assert_eq!(generated, units(backward, &config));
    let paths = generated.iter().map(|unit| unit.path.as_str()).collect_vec();
    assert_eq!(
        paths,
        [
            "Models/Same.swift",
            "Models/Same2.swift",
            "Utils.swift",
            "Server.swift",
            "APIs/OtherAPI.swift",
            "APIs/ThingsAPI.swift",
        ]
    );
    // Same titles are ordered by key, so `A` keeps the unsuffixed name.
    assert!(unit(&generated, "Models/Same.swift").contains("    public let b: Same2?\n"));
    assert!(unit(&generated, "APIs/ThingsAPI.swift").contains("    case getA(sort: GetASort?)\n"));
}

#[test]
fn test_required_and_optional_model_fields() {
    let units = units(PETSTORE, &GeneratorConfig::default());

    let user = unit(&units, "Models/User.swift");
    assert!(user.contains("    public let id: String\n"));
    assert!(user.contains("    public let name: String?\n"));
    assert!(user.contains("    public init(id: String, name: String?) {\n"));
}

#[test]
fn test_self_referencing_model() {
    let units = units(PETSTORE, &GeneratorConfig::default());

    let pet = unit(&units, "Models/Pet.swift");
    assert!(pet.contains("    public let parent: Pet?\n"));
}

#[test]
fn test_tag_fan_out() {
    let units = units(PETSTORE, &GeneratorConfig::default());

    for path in ["APIs/PetsAPI.swift", "APIs/StoreAPI.swift"] {
        let code = unit(&units, path);
        assert!(code.contains("    case listPets\n"), "missing case in `{path}`");
        assert!(code.contains("    case .listPets: return \"/pets\"\n"));
    }
    assert!(!unit(&units, "APIs/UsersAPI.swift").contains("listPets"));
}

#[test]
fn test_base_url_from_host_and_base_path() {
    let units = units(PETSTORE, &GeneratorConfig::default());

    assert!(unit(&units, "APIs/UsersAPI.swift").contains(
        r#"public var baseURL: URL { return URL(string: "https://petstore.example.com/v2")! }"#
    ));
}

#[test]
fn test_reserved_words_are_escaped() {
    let units = units(
        indoc::indoc! {"
            paths:
              /protocols:
                get:
                  operationId: default
                  tags: [protocols]
                  parameters:
                    - { name: in, in: query, type: string }
                  responses:
                    '200':
                      description: ok
                      schema: { $ref: '#/definitions/Protocol' }
            definitions:
              Protocol:
                type: object
                properties:
                  self: { type: boolean }
        "},
        &GeneratorConfig::default(),
    );

    let model = unit(&units, "Models/Protocol.swift");
    assert!(model.contains("    public let `self`: Bool?\n"));

    let api = unit(&units, "APIs/ProtocolsAPI.swift");
    assert!(api.contains("    case `default`(`in`: String?)\n"));
}

#[test]
fn test_no_operations() {
    let units = units("paths: {}", &GeneratorConfig::default());

    let paths = units.iter().map(|unit| unit.path.as_str()).collect_vec();
    assert_eq!(paths, ["Utils.swift"]);
}
