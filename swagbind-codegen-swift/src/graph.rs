use std::{collections::BTreeMap, ops::Deref};

use itertools::Itertools;
use swagbind_core::{
    codegen::UniqueNames,
    ir::{IrSpec, ObjectSchema, OperationGroup, SchemaKey},
};

use super::naming::{SUPPORT_TYPES, group_ident, type_ident};

/// Decorates an [`IrSpec`] with the unique Swift type names of its
/// schemas and tag groups.
#[derive(Debug)]
pub struct CodegenGraph<'a> {
    spec: &'a IrSpec,
    type_names: BTreeMap<&'a SchemaKey, String>,
    group_names: BTreeMap<&'a str, String>,
}

impl<'a> CodegenGraph<'a> {
    /// Assigns type names in a single scope: schemas first, ordered by
    /// title, then groups, ordered by tag.
    pub fn new(spec: &'a IrSpec) -> Self {
        let unique = UniqueNames::new();
        let mut scope = unique.scope_with_reserved(SUPPORT_TYPES);

        let type_names = spec
            .registry
            .schemas()
            .sorted_by(|(a, a_schema), (b, b_schema)| {
                (&a_schema.title, a).cmp(&(&b_schema.title, b))
            })
            .map(|(key, schema)| {
                let name = scope.uniquify(&type_ident(&schema.title)).into_owned();
                (key, name)
            })
            .collect();

        let group_names = spec
            .groups()
            .map(|group| {
                let name = scope.uniquify(&group_ident(group.tag)).into_owned();
                (group.tag, name)
            })
            .collect();

        Self {
            spec,
            type_names,
            group_names,
        }
    }

    /// Returns the type name of a schema.
    #[inline]
    pub fn type_name(&self, key: &SchemaKey) -> Option<&str> {
        self.type_names.get(key).map(String::as_str)
    }

    /// Returns every top-level type name that generated code declares
    /// or uses. Nested types can't shadow these.
    pub fn top_level_names(&self) -> impl Iterator<Item = &str> {
        SUPPORT_TYPES
            .iter()
            .copied()
            .chain(self.type_names.values().map(String::as_str))
            .chain(self.group_names.values().map(String::as_str))
    }

    /// Returns the schemas, sorted by type name.
    pub fn schemas(&self) -> Vec<CodegenSchema<'_>> {
        self.spec
            .registry
            .schemas()
            .filter_map(|(key, schema)| {
                Some(CodegenSchema {
                    key,
                    name: self.type_name(key)?,
                    schema,
                })
            })
            .sorted_by_key(|schema| schema.name)
            .collect()
    }

    /// Returns the tag groups, sorted by group name.
    pub fn groups(&self) -> Vec<CodegenGroup<'_>> {
        self.spec
            .groups()
            .filter_map(|group| {
                Some(CodegenGroup {
                    name: self.group_names.get(group.tag).map(String::as_str)?,
                    group,
                })
            })
            .sorted_by_key(|group| group.name)
            .collect()
    }
}

impl Deref for CodegenGraph<'_> {
    type Target = IrSpec;

    fn deref(&self) -> &Self::Target {
        self.spec
    }
}

/// A named schema, and its type name.
#[derive(Clone, Copy, Debug)]
pub struct CodegenSchema<'a> {
    pub key: &'a SchemaKey,
    pub name: &'a str,
    pub schema: &'a ObjectSchema,
}

/// A tag group, and its type name.
#[derive(Clone, Debug)]
pub struct CodegenGroup<'a> {
    pub name: &'a str,
    pub group: OperationGroup<'a>,
}
