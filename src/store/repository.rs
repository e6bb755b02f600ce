//! Repository - Typed accessor for one collection of mapped documents.

use std::marker::PhantomData;

use tracing::debug;

use super::{DocumentStore, StoreError};
use crate::error::MappingError;
use crate::metadata::{MetadataStore, TypeMetadata};
use crate::model::{Model, PartialModel, TypeKey};
use crate::path::Path;
use crate::query::Query;
use crate::relationship::RelationshipKind;

/// Typed repository over the collection of `M` documents at `path`.
///
/// Conversions go through the metadata registered for `M`; relationship
/// locations are resolved against `path`.
pub struct Repository<'a, S, M> {
    store: &'a S,
    metadata: &'a MetadataStore,
    path: Path,
    _marker: PhantomData<fn() -> M>,
}

impl<'a, S: DocumentStore, M: Model> Repository<'a, S, M> {
    /// Repository over `M`'s own collection at the top level.
    pub fn new(store: &'a S, metadata: &'a MetadataStore) -> Result<Self, StoreError> {
        Self::at(store, metadata, Path::root())
    }

    /// Repository over `M`'s collection under `parent`.
    pub fn at(store: &'a S, metadata: &'a MetadataStore, parent: impl Into<Path>) -> Result<Self, StoreError> {
        let collection = metadata.get::<M>()?.collection_name()?;
        let path = Path::merge([parent.into(), Path::from(collection)]);
        Ok(Self::with_path(store, metadata, path))
    }

    /// Repository over the collection at exactly `path`.
    pub fn with_path(store: &'a S, metadata: &'a MetadataStore, path: Path) -> Self {
        Self {
            store,
            metadata,
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn type_metadata(&self) -> Result<&'a TypeMetadata, StoreError> {
        Ok(self.metadata.get::<M>()?)
    }

    /// Get a model by id.
    pub fn get(&self, id: &str) -> Result<Option<M>, StoreError> {
        let path = self.path.document(Some(id))?;
        match self.store.get_document(&path)? {
            Some(document) => Ok(Some(self.type_metadata()?.convert_document_to_model::<M>(&document)?)),
            None => Ok(None),
        }
    }

    /// Get a model by id and load the named relationship fields.
    pub fn get_with(&self, id: &str, includes: &[&str]) -> Result<Option<M>, StoreError> {
        let Some(mut model) = self.get(id)? else {
            return Ok(None);
        };
        self.include(&mut model, includes)?;
        Ok(Some(model))
    }

    /// Create or replace the model's document. The model must have an id.
    pub fn save(&self, model: &M) -> Result<(), StoreError> {
        let id = model.id().ok_or(MappingError::MissingIdentifier { context: "save" })?;
        let path = self.path.document(Some(id))?;
        let document = self.type_metadata()?.convert_model_to_document(model)?;
        self.store.set_document(&path, document)
    }

    /// Write only the fields present in `partial` to an existing document.
    pub fn update(&self, id: &str, partial: PartialModel) -> Result<(), StoreError> {
        let path = self.path.document(Some(id))?;
        let fields = self.type_metadata()?.convert_partial_to_document(partial)?;
        self.store.update_document(&path, fields)
    }

    /// Delete a model by id. Returns true if it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.path.document(Some(id))?;
        self.store.delete_document(&path)
    }

    /// Models matching `query`. Field names in the query are model field names.
    pub fn find<Q>(&self, query: &Query<Q>) -> Result<Vec<M>, StoreError> {
        let metadata = self.type_metadata()?;
        let constraints = query.to_constraints_for(metadata)?;
        self.store
            .query(&self.path, &constraints)?
            .into_iter()
            .map(|(_, document)| {
                metadata
                    .convert_document_to_model::<M>(&document)
                    .map_err(StoreError::from)
            })
            .collect()
    }

    /// Loads the targets of the named relationship fields onto `model`.
    ///
    /// Each relationship's location is merged onto this repository's path, the
    /// target documents are fetched by id, and missing targets are skipped.
    pub fn include(&self, model: &mut M, fields: &[&str]) -> Result<(), StoreError> {
        let metadata = self.type_metadata()?;

        for &field in fields {
            let relationship = metadata
                .property(field)
                .and_then(|property| property.relationship())
                .ok_or_else(|| StoreError::NotARelationship {
                    field: field.to_string(),
                })?;
            if relationship.kind() == RelationshipKind::Sub {
                debug!(field, "nested collections are not included, use `sub`");
                continue;
            }

            let value = model.field(field)?.ok_or_else(|| StoreError::NotARelationship {
                field: field.to_string(),
            })?;
            let binding = relationship.binding();
            let location = Path::merge([self.path.clone(), relationship.location().clone()]);

            let mut documents = Vec::new();
            for id in binding.ids(&value)? {
                let path = location.document(Some(&id))?;
                match self.store.get_document(&path)? {
                    Some(document) => documents.push(document),
                    None => debug!(field, %path, "included document not found"),
                }
            }

            let value = binding.attach(value, documents, self.metadata.registry())?;
            model.set_field(field, value).map_err(|err| err.in_field(field))?;
        }

        Ok(())
    }

    /// Repository over the nested collection declared by `field` under the
    /// document `id`.
    pub fn sub<U: Model>(&self, id: &str, field: &str) -> Result<Repository<'a, S, U>, StoreError> {
        let relationship = self
            .type_metadata()?
            .property(field)
            .and_then(|property| property.relationship())
            .filter(|relationship| relationship.kind() == RelationshipKind::Sub)
            .ok_or_else(|| StoreError::NotARelationship {
                field: field.to_string(),
            })?;
        if relationship.target() != TypeKey::of::<U>() {
            return Err(MappingError::TypeMismatch {
                expected: relationship.target().name(),
                found: std::any::type_name::<U>(),
            }
            .into());
        }

        let path = self.path.document(Some(id))?.join(relationship.location());
        Ok(Repository::with_path(self.store, self.metadata, path))
    }
}

/// Extension trait for typed collection access on any DocumentStore.
pub trait DocumentsExt: DocumentStore + Sized {
    /// Get a typed repository over `M`'s collection.
    fn collection<'a, M: Model>(&'a self, metadata: &'a MetadataStore) -> Result<Repository<'a, Self, M>, StoreError> {
        Repository::new(self, metadata)
    }
}

impl<S: DocumentStore> DocumentsExt for S {}
