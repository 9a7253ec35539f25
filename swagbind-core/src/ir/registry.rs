use indexmap::IndexMap;

use super::types::{ObjectSchema, SchemaKey};

/// Named schemas, keyed by reference path.
///
/// A key is reserved with a placeholder before its schema is built, so
/// that a reference back to it from inside its own definition finds
/// the key already present instead of building it again.
#[derive(Debug, Default)]
pub struct Registry {
    slots: IndexMap<SchemaKey, Slot>,
}

#[derive(Debug)]
enum Slot {
    Placeholder,
    Resolved(ObjectSchema),
}

impl Registry {
    /// Reserves a slot for `key`. Returns `true` if the key is new,
    /// and the caller should build and [`fill`](Self::fill) it;
    /// `false` if it's already being built, or already built.
    pub fn reserve(&mut self, key: &SchemaKey) -> bool {
        if self.slots.contains_key(key) {
            return false;
        }
        self.slots.insert(key.clone(), Slot::Placeholder);
        true
    }

    /// Replaces the placeholder for `key` with the built schema.
    /// The key keeps the position of its first reservation.
    pub fn fill(&mut self, key: SchemaKey, schema: ObjectSchema) {
        self.slots.insert(key, Slot::Resolved(schema));
    }

    /// Returns `true` if `key` has been reserved, whether or not
    /// its schema is built yet.
    #[inline]
    pub fn contains(&self, key: &SchemaKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Returns the built schema for `key`.
    pub fn get(&self, key: &SchemaKey) -> Option<&ObjectSchema> {
        match self.slots.get(key)? {
            Slot::Resolved(schema) => Some(schema),
            Slot::Placeholder => None,
        }
    }

    /// Returns all built schemas, in order of first reference.
    pub fn schemas(&self) -> impl Iterator<Item = (&SchemaKey, &ObjectSchema)> {
        self.slots.iter().filter_map(|(key, slot)| match slot {
            Slot::Resolved(schema) => Some((key, schema)),
            Slot::Placeholder => None,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
