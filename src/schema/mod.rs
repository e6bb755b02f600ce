//! Schema - the declaration API models use to describe their mapping.
//!
//! `Model::describe` receives a [`ModelSchema`] and records the collection name
//! and per-field intents through [`FieldSchema`]. Re-declaring something that
//! is already set is not an error: the new value replaces the old one and a
//! warning is logged.

use std::any::Any;
use std::marker::PhantomData;

use serde_json::Value;
use tracing::warn;

use crate::convert::{self, ToDocumentFn, ToModelFn};
use crate::error::MappingError;
use crate::metadata::{ForwardRef, MetadataStore, PropertyMetadata};
use crate::model::{Model, TypeKey};
use crate::path::Path;
use crate::relationship::Relationship;

/// Declarations for model type `M`.
pub struct ModelSchema<'a, M> {
    store: &'a mut MetadataStore,
    _marker: PhantomData<fn() -> M>,
}

impl<'a, M: Model> ModelSchema<'a, M> {
    pub(crate) fn new(store: &'a mut MetadataStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::of::<M>()
    }

    pub fn collection(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        let metadata = self.store.registry_mut().get_or_create::<M>();
        if let Some(previous) = metadata.set_collection_name(name.clone()) {
            if previous != name {
                warn!(
                    model = std::any::type_name::<M>(),
                    %previous,
                    %name,
                    "replacing collection name"
                );
            }
        }
        self
    }

    /// Starts declaring one field.
    pub fn field(&mut self, name: &str) -> FieldSchema<'_, M> {
        let metadata = self.store.registry_mut().get_or_create::<M>();
        if metadata.property(name).is_none() {
            tracing::debug!(
                model = std::any::type_name::<M>(),
                field = name,
                "declaring a field the model instance does not carry"
            );
        }
        FieldSchema {
            store: &mut *self.store,
            name: name.to_string(),
            _marker: PhantomData,
        }
    }
}

/// Declarations for one field of model type `M`.
pub struct FieldSchema<'s, M> {
    store: &'s mut MetadataStore,
    name: String,
    _marker: PhantomData<fn() -> M>,
}

impl<'s, M: Model> FieldSchema<'s, M> {
    fn property(&mut self) -> &mut PropertyMetadata {
        self.store
            .registry_mut()
            .get_or_create::<M>()
            .property_mut(&self.name)
    }

    /// Stores the field under `key` instead of its derived key.
    pub fn map_to(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if let Some(previous) = self.property().set_mapped_to(key.clone()) {
            if previous != key {
                warn!(field = %self.name, %previous, %key, "replacing document key mapping");
            }
        }
        self
    }

    /// Leaves the field out of both conversion directions.
    pub fn ignore(mut self) -> Self {
        self.property().set_ignored(true);
        self
    }

    /// Stores an `Option<DateTime<Utc>>` field as a timestamp pair.
    pub fn date(self) -> Self {
        self.converters(convert::date())
    }

    /// Converts a field of type `F` with the given functions.
    pub fn convert<F, TM, TD>(self, to_model: TM, to_document: TD) -> Self
    where
        F: Any + Send + Sync,
        TM: Fn(Option<&Value>) -> Result<F, MappingError> + Send + Sync + 'static,
        TD: Fn(&F) -> Result<Value, MappingError> + Send + Sync + 'static,
    {
        self.converters(convert::custom(to_model, to_document))
    }

    /// Converts a `Vec<F>` field element-wise with the given functions.
    pub fn convert_array<F, TM, TD>(self, to_model: TM, to_document: TD) -> Self
    where
        F: Any + Send + Sync,
        TM: Fn(Option<&Value>) -> Result<F, MappingError> + Send + Sync + 'static,
        TD: Fn(&F) -> Result<Value, MappingError> + Send + Sync + 'static,
    {
        self.converters(convert::custom_array(to_model, to_document))
    }

    /// Declares a `ToOne<T>` field whose targets live at `location`, relative to
    /// the owning repository's collection path.
    pub fn to_one<T: Model>(self, location: impl Into<Path>) -> Self {
        let relationship = Relationship::to_one::<T>(location.into());
        self.relate(relationship, Some(convert::to_one::<T>()))
    }

    /// Declares a `ToMany<T>` field whose targets live at `location`.
    pub fn to_many<T: Model>(self, location: impl Into<Path>) -> Self {
        let relationship = Relationship::to_many::<T>(location.into());
        self.relate(relationship, Some(convert::to_many::<T>()))
    }

    /// Declares a nested collection of `T` at `location` under each document.
    /// The field itself is never stored.
    pub fn sub<T: Model>(mut self, location: impl Into<Path>) -> Self {
        self.property().set_ignored(true);
        let relationship = Relationship::sub::<T>(location.into());
        self.relate(relationship, None)
    }

    fn converters(mut self, (to_model, to_document): (ToModelFn, ToDocumentFn)) -> Self {
        let name = self.name.clone();
        install_converters(&name, self.property(), to_model, to_document);
        self
    }

    /// Installs the converters now and the relationship descriptor once the
    /// target type has metadata, which may be right away.
    fn relate(mut self, relationship: Relationship, converters: Option<(ToModelFn, ToDocumentFn)>) -> Self {
        if let Some((to_model, to_document)) = converters {
            let name = self.name.clone();
            install_converters(&name, self.property(), to_model, to_document);
        }

        let owner = TypeKey::of::<M>();
        let field = self.name.clone();
        let label = format!("{}.{} -> {}", owner, field, relationship.target());

        let forward_ref = ForwardRef::to_type(label, relationship.target(), move |registry, _target| {
            let Some(metadata) = registry.get_mut_by_key(owner) else {
                return;
            };
            if let Some(previous) = metadata.property_mut(&field).set_relationship(relationship) {
                warn!(
                    %field,
                    previous = %previous.kind(),
                    "replacing relationship"
                );
            }
        });

        let report = self.store.register_forward_ref(forward_ref);
        if report.pending > 0 {
            tracing::debug!(
                field = %self.name,
                pending = report.pending,
                "relationship target not declared yet"
            );
        }
        self
    }
}

fn install_converters(
    field: &str,
    property: &mut PropertyMetadata,
    to_model: ToModelFn,
    to_document: ToDocumentFn,
) {
    if property.set_to_model_converter(to_model).is_some() {
        warn!(field, "replacing to-model converter");
    }
    if property.set_to_document_converter(to_document).is_some() {
        warn!(field, "replacing to-document converter");
    }
}
