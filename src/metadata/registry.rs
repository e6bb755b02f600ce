use indexmap::IndexMap;

use super::TypeMetadata;
use crate::error::MappingError;
use crate::model::{Model, TypeKey};

/// Type → metadata map. Entries are only ever added.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    types: IndexMap<TypeKey, TypeMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metadata of `M`, creating it from a fresh instance if needed.
    pub fn get_or_create<M: Model>(&mut self) -> &mut TypeMetadata {
        self.types
            .entry(TypeKey::of::<M>())
            .or_insert_with(TypeMetadata::from_instance::<M>)
    }

    /// Creates the metadata of `M`. Fails if it already exists.
    pub fn create<M: Model>(&mut self) -> Result<&mut TypeMetadata, MappingError> {
        let key = TypeKey::of::<M>();
        if self.types.contains_key(&key) {
            return Err(MappingError::AlreadyRegistered {
                type_name: key.name(),
            });
        }
        Ok(self
            .types
            .entry(key)
            .or_insert_with(TypeMetadata::from_instance::<M>))
    }

    pub fn get<M: Model>(&self) -> Result<&TypeMetadata, MappingError> {
        self.get_by_key(TypeKey::of::<M>())
    }

    pub fn get_by_key(&self, key: TypeKey) -> Result<&TypeMetadata, MappingError> {
        self.types.get(&key).ok_or(MappingError::NotFoundMetadata {
            type_name: key.name(),
        })
    }

    pub fn get_mut_by_key(&mut self, key: TypeKey) -> Option<&mut TypeMetadata> {
        self.types.get_mut(&key)
    }

    pub fn contains<M: Model>(&self) -> bool {
        self.contains_key(TypeKey::of::<M>())
    }

    pub fn contains_key(&self, key: TypeKey) -> bool {
        self.types.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeMetadata> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
