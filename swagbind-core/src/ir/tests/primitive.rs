//! Tests for resolving schema fragments into [`PrimitiveNode`]s.

use crate::{
    ir::{Format, IrError, PrimitiveNode, Resolver, SchemaKey, TypeKind},
    parse::{BadRef, Document, RefOrSchema},
    tests::assert_matches,
};

fn fragment(json: &str) -> RefOrSchema {
    serde_json::from_str(json).unwrap()
}

// MARK: Scalars

#[test]
fn test_scalar_types() {
    let doc = Document::from_json("{}").unwrap();
    let mut resolver = Resolver::new(&doc);

    let node = resolver.node(&fragment(r#"{ "type": "string" }"#)).unwrap();
    assert_eq!(node, PrimitiveNode::scalar(TypeKind::String, None));

    let node = resolver
        .node(&fragment(r#"{ "type": "integer", "format": "int64" }"#))
        .unwrap();
    assert_eq!(node.kind(), TypeKind::Integer);
    assert_eq!(node.format(), Some(Format::Int64));

    let node = resolver
        .node(&fragment(r#"{ "type": "string", "format": "uuid" }"#))
        .unwrap();
    assert_eq!(node.format(), Some(Format::Uuid));

    let node = resolver.node(&fragment(r#"{ "type": "file" }"#)).unwrap();
    assert_eq!(node.kind(), TypeKind::File);
}

#[test]
fn test_missing_type_is_void() {
    let doc = Document::from_json("{}").unwrap();
    let mut resolver = Resolver::new(&doc);

    let node = resolver.node(&fragment(r#"{ "description": "nothing" }"#)).unwrap();
    assert!(node.is_void());
}

#[test]
fn test_unknown_type_is_fatal() {
    let doc = Document::from_json("{}").unwrap();
    let mut resolver = Resolver::new(&doc);

    let result = resolver.node(&fragment(r#"{ "type": "strnig" }"#));
    assert_matches!(result, Err(IrError::UnknownType(ty)) if ty == "strnig");
}

#[test]
fn test_unknown_format_is_fatal() {
    let doc = Document::from_json("{}").unwrap();
    let mut resolver = Resolver::new(&doc);

    let result = resolver.node(&fragment(r#"{ "type": "integer", "format": "int128" }"#));
    assert_matches!(result, Err(IrError::UnknownFormat(format)) if format == "int128");
}

// MARK: Containers

#[test]
fn test_array_items() {
    let doc = Document::from_json("{}").unwrap();
    let mut resolver = Resolver::new(&doc);

    let node = resolver
        .node(&fragment(r#"{ "type": "array", "items": { "type": "array", "items": { "type": "boolean" } } }"#))
        .unwrap();
    assert_eq!(node.kind(), TypeKind::Array);
    let inner = node.items().unwrap();
    assert_eq!(inner.kind(), TypeKind::Array);
    assert_eq!(inner.items().unwrap().kind(), TypeKind::Boolean);
}

#[test]
fn test_array_without_items_holds_anonymous_objects() {
    let doc = Document::from_json("{}").unwrap();
    let mut resolver = Resolver::new(&doc);

    let node = resolver.node(&fragment(r#"{ "type": "array" }"#)).unwrap();
    assert_eq!(node.items(), Some(&PrimitiveNode::anonymous()));
}

#[test]
fn test_additional_properties() {
    let doc = Document::from_json("{}").unwrap();
    let mut resolver = Resolver::new(&doc);

    let node = resolver
        .node(&fragment(r#"{ "type": "object", "additionalProperties": { "type": "integer" } }"#))
        .unwrap();
    assert_eq!(node.kind(), TypeKind::Object);
    assert_eq!(node.schema_ref(), None);
    assert_eq!(
        node.values(),
        Some(&PrimitiveNode::scalar(TypeKind::Integer, None))
    );
}

#[test]
fn test_inline_object_is_anonymous() {
    let doc = Document::from_json("{}").unwrap();
    let mut resolver = Resolver::new(&doc);

    let node = resolver
        .node(&fragment(r#"{ "type": "object", "properties": { "a": { "type": "string" } } }"#))
        .unwrap();
    assert_eq!(node, PrimitiveNode::anonymous());
}

// MARK: References

#[test]
fn test_reference_loads_schema() {
    let doc = Document::from_json(indoc::indoc! {r#"
        {
            "definitions": {
                "Pet": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "status": { "type": "string", "enum": ["sold", "available", "sold"] }
                    }
                }
            }
        }
    "#})
    .unwrap();
    let mut resolver = Resolver::new(&doc);

    let node = resolver
        .node(&fragment(r##"{ "$ref": "#/definitions/Pet" }"##))
        .unwrap();
    let key = SchemaKey::new("#/definitions/Pet");
    assert_eq!(node, PrimitiveNode::reference(key.clone()));

    let registry = resolver.into_registry();
    let pet = registry.get(&key).unwrap();
    // Falls back to the last segment of the reference.
    assert_eq!(pet.title, "Pet");

    let id = pet.property("id").unwrap();
    assert!(id.required);
    assert_eq!(id.enum_values, None);

    let status = pet.property("status").unwrap();
    assert!(!status.required);
    assert_eq!(
        status.enum_values.as_deref(),
        Some(&["sold".to_owned(), "available".to_owned()][..])
    );
}

#[test]
fn test_self_reference_terminates() {
    let doc = Document::from_json(indoc::indoc! {r##"
        {
            "definitions": {
                "Node": {
                    "title": "Node",
                    "type": "object",
                    "properties": {
                        "children": { "type": "array", "items": { "$ref": "#/definitions/Node" } },
                        "parent": { "$ref": "#/definitions/Node" }
                    }
                }
            }
        }
    "##})
    .unwrap();
    let mut resolver = Resolver::new(&doc);
    let key = SchemaKey::new("#/definitions/Node");

    resolver.schema(&key).unwrap();

    let registry = resolver.into_registry();
    assert_eq!(registry.len(), 1);
    let node = registry.get(&key).unwrap();
    assert_eq!(
        node.property("parent").unwrap().node,
        PrimitiveNode::reference(key.clone())
    );
    assert_eq!(
        node.property("children").unwrap().node.items(),
        Some(&PrimitiveNode::reference(key.clone()))
    );
}

#[test]
fn test_mutual_reference_terminates() {
    let doc = Document::from_json(indoc::indoc! {r##"
        {
            "definitions": {
                "A": { "type": "object", "properties": { "b": { "$ref": "#/definitions/B" } } },
                "B": { "type": "object", "properties": { "a": { "$ref": "#/definitions/A" } } }
            }
        }
    "##})
    .unwrap();
    let mut resolver = Resolver::new(&doc);
    let a = SchemaKey::new("#/definitions/A");
    let b = SchemaKey::new("#/definitions/B");

    resolver.schema(&a).unwrap();

    let registry = resolver.into_registry();
    assert_eq!(
        registry.get(&a).unwrap().property("b").unwrap().node,
        PrimitiveNode::reference(b.clone())
    );
    assert_eq!(
        registry.get(&b).unwrap().property("a").unwrap().node,
        PrimitiveNode::reference(a.clone())
    );
    // `A` was touched first.
    let keys = registry.schemas().map(|(key, _)| key.clone()).collect::<Vec<_>>();
    assert_eq!(keys, [a, b]);
}

#[test]
fn test_dangling_reference_is_fatal() {
    let doc = Document::from_json(r#"{ "definitions": {} }"#).unwrap();
    let mut resolver = Resolver::new(&doc);

    let result = resolver.node(&fragment(r##"{ "$ref": "#/definitions/Missing" }"##));
    assert_matches!(result, Err(IrError::BadRef(BadRef::Dangling(_))));
}

#[test]
fn test_bad_property_type_aborts_schema() {
    let doc = Document::from_json(indoc::indoc! {r#"
        {
            "definitions": {
                "Bad": { "type": "object", "properties": { "x": { "type": "tuple" } } }
            }
        }
    "#})
    .unwrap();
    let mut resolver = Resolver::new(&doc);

    let result = resolver.schema(&SchemaKey::new("#/definitions/Bad"));
    assert_matches!(result, Err(IrError::UnknownType(_)));
}
