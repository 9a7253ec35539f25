use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::error::SerdeError;

/// A Swagger document.
///
/// Keeps the raw JSON tree around, so that `$ref`s can be resolved
/// lazily against it, alongside the typed top-level fields that
/// drive processing.
#[derive(Debug)]
pub struct Document {
    root: Value,
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub paths: IndexMap<String, PathItem>,
}

impl Document {
    /// Parses a Swagger document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SerdeError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let root: Value = serde_path_to_error::deserialize(&mut deserializer)?;
        Self::from_value(root)
    }

    /// Parses a Swagger document from a YAML or JSON string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SerdeError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml);
        let root: Value = serde_path_to_error::deserialize(deserializer)?;
        Self::from_value(root)
    }

    /// Builds a document from an already-parsed JSON tree.
    pub fn from_value(root: Value) -> Result<Self, SerdeError> {
        let top: TopLevel = serde_path_to_error::deserialize(&root)?;
        Ok(Self {
            host: top.host,
            base_path: top.base_path,
            paths: top.paths,
            root,
        })
    }

    /// Returns the raw fragment that a same-document reference
    /// (`#/definitions/Pet`) points to.
    pub fn fragment(&self, reference: &str) -> Result<&Value, BadRef> {
        let pointer = reference
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| BadRef::NotSameDocument(reference.to_owned()))?;
        self.root
            .pointer(pointer)
            .ok_or_else(|| BadRef::Dangling(reference.to_owned()))
    }

    /// Resolves a same-document reference, and deserializes the fragment
    /// it points to.
    pub fn resolve<T: DeserializeOwned>(&self, reference: &str) -> Result<T, BadRef> {
        let fragment = self.fragment(reference)?;
        serde_path_to_error::deserialize(fragment).map_err(|err| BadRef::Malformed {
            reference: reference.to_owned(),
            source: err.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopLevel {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    base_path: Option<String>,
    #[serde(default)]
    paths: IndexMap<String, PathItem>,
}

/// Operation definitions for a single path.
#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,
    #[serde(default)]
    pub options: Option<Operation>,
    #[serde(default)]
    pub head: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
    /// Parameters shared by every operation on this path.
    #[serde(default)]
    pub parameters: Vec<RefOrParameter>,
}

impl PathItem {
    /// Returns an iterator over the operations for each HTTP method.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        [
            (Method::Get, self.get.as_ref()),
            (Method::Put, self.put.as_ref()),
            (Method::Post, self.post.as_ref()),
            (Method::Delete, self.delete.as_ref()),
            (Method::Options, self.options.as_ref()),
            (Method::Head, self.head.as_ref()),
            (Method::Patch, self.patch.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl Method {
    /// The lowercase verb, as it appears in the path table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// An HTTP operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<RefOrParameter>,
    #[serde(default)]
    pub responses: IndexMap<String, RefOrResponse>,
    #[serde(default)]
    pub consumes: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
    /// The operation's security requirements. Only the presence of the key
    /// matters: even `"security": null` marks the operation as authorized.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub security: Option<Value>,
}

/// A body, query, header, form, or path parameter.
///
/// Swagger describes a parameter's type either inline, on the parameter
/// itself, or in a nested `schema` for body parameters. The inline
/// description is collected into [`Parameter::inline`].
#[derive(Clone, Debug, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "in", default)]
    pub location: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<RefOrSchema>,
    #[serde(flatten)]
    pub inline: Schema,
}

/// Response definition.
#[derive(Clone, Debug, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<RefOrSchema>,
}

/// Either a reference to a definition elsewhere in the document,
/// or an inline definition.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// A reference via `$ref`.
    Ref(Ref),
    /// An inline definition.
    Other(T),
}

/// Either a reference or a schema definition.
pub type RefOrSchema = RefOr<Box<Schema>>;

/// Either a reference or a parameter definition.
pub type RefOrParameter = RefOr<Parameter>;

/// Either a reference or a response definition.
pub type RefOrResponse = RefOr<Response>;

/// A same-document reference, like `#/definitions/Pet`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
pub struct Ref {
    #[serde(rename = "$ref")]
    pub path: String,
}

/// A JSON-Schema-like type fragment.
///
/// `type` and `format` are kept as strings here, and only checked
/// when the fragment is turned into a typed node, so that the error
/// can name the offending value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    // Object properties.
    #[serde(default)]
    pub properties: IndexMap<String, RefOrSchema>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub additional_properties: Option<AdditionalProperties>,

    // Array items.
    #[serde(default)]
    pub items: Option<RefOrSchema>,

    // Enum values.
    #[serde(rename = "enum", default)]
    pub variants: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    RefOrSchema(RefOrSchema),
}

#[derive(Debug, thiserror::Error)]
pub enum BadRef {
    #[error("reference `{0}` must start with `#`; external references aren't supported")]
    NotSameDocument(String),
    #[error("reference `{0}` doesn't point to anything in the document")]
    Dangling(String),
    #[error("reference `{reference}` points to a malformed definition")]
    Malformed {
        reference: String,
        #[source]
        source: SerdeError,
    },
}

fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::assert_matches;

    #[test]
    fn test_parses_host_and_base_path() {
        let doc = Document::from_json(indoc::indoc! {r#"
            {
                "host": "api.example.com",
                "basePath": "/v1",
                "paths": {}
            }
        "#})
        .unwrap();
        assert_eq!(doc.host.as_deref(), Some("api.example.com"));
        assert_eq!(doc.base_path.as_deref(), Some("/v1"));
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn test_parses_yaml() {
        let doc = Document::from_yaml(indoc::indoc! {"
            host: api.example.com
            paths:
              /pets:
                get:
                  operationId: listPets
                  tags: [pets]
        "})
        .unwrap();
        let item = &doc.paths["/pets"];
        let ops = item.operations().collect::<Vec<_>>();
        assert_matches!(&*ops, [(Method::Get, Operation { tags, .. })] if tags == &["pets"]);
    }

    #[test]
    fn test_security_presence_marks_operation() {
        let doc = Document::from_json(indoc::indoc! {r#"
            {
                "paths": {
                    "/a": {
                        "get": { "operationId": "a", "security": null },
                        "post": { "operationId": "b", "security": [] },
                        "put": { "operationId": "c" }
                    }
                }
            }
        "#})
        .unwrap();
        let item = &doc.paths["/a"];
        assert!(item.get.as_ref().unwrap().security.is_some());
        assert!(item.post.as_ref().unwrap().security.is_some());
        assert!(item.put.as_ref().unwrap().security.is_none());
    }

    #[test]
    fn test_parameter_collects_inline_type() {
        let doc = Document::from_json(indoc::indoc! {r#"
            {
                "paths": {
                    "/a": {
                        "get": {
                            "operationId": "a",
                            "parameters": [
                                { "name": "limit", "in": "query", "required": true, "type": "integer", "format": "int32" }
                            ]
                        }
                    }
                }
            }
        "#})
        .unwrap();
        let op = doc.paths["/a"].get.as_ref().unwrap();
        assert_matches!(
            &*op.parameters,
            [RefOr::Other(Parameter { required: true, inline: Schema { ty: Some(ty), format: Some(format), .. }, .. })]
                if ty == "integer" && format == "int32",
        );
    }

    #[test]
    fn test_resolves_same_document_reference() {
        let doc = Document::from_json(indoc::indoc! {r#"
            {
                "definitions": {
                    "Foo/Bar": { "title": "FooBar", "type": "object" }
                }
            }
        "#})
        .unwrap();
        let schema: Schema = doc.resolve("#/definitions/Foo~1Bar").unwrap();
        assert_eq!(schema.title.as_deref(), Some("FooBar"));
    }

    #[test]
    fn test_rejects_external_reference() {
        let doc = Document::from_json("{}").unwrap();
        let result = doc.resolve::<Schema>("other.json#/definitions/Pet");
        assert_matches!(result, Err(BadRef::NotSameDocument(_)));
    }

    #[test]
    fn test_rejects_dangling_reference() {
        let doc = Document::from_json("{}").unwrap();
        let result = doc.resolve::<Schema>("#/definitions/Missing");
        assert_matches!(result, Err(BadRef::Dangling(r)) if r == "#/definitions/Missing");
    }

    #[test]
    fn test_ref_takes_priority_over_inline_fields() {
        let schema: RefOrSchema =
            serde_json::from_str(r##"{ "$ref": "#/definitions/Pet", "type": "string" }"##).unwrap();
        assert_matches!(schema, RefOr::Ref(Ref { path }) if path == "#/definitions/Pet");
    }
}
