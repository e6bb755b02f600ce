use indexmap::IndexMap;
use serde::Serialize;

use super::PropertyMetadata;
use crate::error::MappingError;
use crate::model::{Document, FieldValue, Model, PartialModel, TypeKey};

/// Mapping record for one model type: its collection and its fields.
#[derive(Debug, Clone)]
pub struct TypeMetadata {
    key: TypeKey,
    collection_name: Option<String>,
    properties: IndexMap<String, PropertyMetadata>,
}

/// Introspection entry of [`TypeMetadata::document_blueprint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlueprintEntry {
    pub default_document_key: String,
    pub document_key: String,
    pub ignored: bool,
    pub custom_conversion: bool,
}

impl TypeMetadata {
    pub fn new(key: TypeKey) -> Self {
        Self {
            key,
            collection_name: None,
            properties: IndexMap::new(),
        }
    }

    /// Metadata with one plain property per field of a fresh `M` instance.
    pub(crate) fn from_instance<M: Model>() -> Self {
        let mut metadata = Self::new(TypeKey::of::<M>());
        for name in M::default().field_names() {
            metadata.property_mut(name);
        }
        metadata
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The declared collection name.
    ///
    /// Never derived from the type name: type names are not a stable identifier
    /// for stored data.
    pub fn collection_name(&self) -> Result<&str, MappingError> {
        self.collection_name
            .as_deref()
            .ok_or(MappingError::MissingCollectionName {
                type_name: self.key.name(),
            })
    }

    pub fn set_collection_name(&mut self, name: impl Into<String>) -> Option<String> {
        self.collection_name.replace(name.into())
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.get(name)
    }

    /// Returns the property, creating a plain one if the field is unknown.
    pub fn property_mut(&mut self, name: &str) -> &mut PropertyMetadata {
        self.properties
            .entry(name.to_string())
            .or_insert_with(|| PropertyMetadata::new(name))
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyMetadata> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The document key of a model field, if the field is known.
    pub fn document_key_for(&self, name: &str) -> Option<&str> {
        self.property(name).map(PropertyMetadata::document_key)
    }

    fn ensure_declared(&self) -> Result<(), MappingError> {
        if self.properties.is_empty() {
            return Err(MappingError::EmptyMetadata {
                type_name: self.key.name(),
            });
        }
        Ok(())
    }

    fn ensure_type<M: Model>(&self) -> Result<(), MappingError> {
        if self.key != TypeKey::of::<M>() {
            return Err(MappingError::TypeMismatch {
                expected: self.key.name(),
                found: std::any::type_name::<M>(),
            });
        }
        Ok(())
    }

    /// Builds a model from a document.
    ///
    /// Fields the fresh instance does not carry are skipped. Absent document
    /// keys still go through the converter, which decides what absence means.
    pub fn convert_document_to_model<M: Model>(&self, document: &Document) -> Result<M, MappingError> {
        self.ensure_declared()?;
        self.ensure_type::<M>()?;

        let mut model = M::default();
        let fields = model.field_names();

        for property in self.properties.values() {
            if property.is_ignored() || !fields.iter().any(|field| *field == property.name()) {
                continue;
            }
            let value = property
                .convert_to_model(document.get(property.document_key()))
                .map_err(|err| err.in_field(property.name()))?;
            model
                .set_field(property.name(), value)
                .map_err(|err| err.in_field(property.name()))?;
        }

        Ok(model)
    }

    /// Builds a document from every non-ignored field of a model.
    pub fn convert_model_to_document<M: Model>(&self, model: &M) -> Result<Document, MappingError> {
        self.ensure_declared()?;
        self.ensure_type::<M>()?;

        self.write_document(|name| model.field(name))
    }

    /// Builds a document from the fields present in `partial` only.
    pub fn convert_partial_to_document(&self, mut partial: PartialModel) -> Result<Document, MappingError> {
        self.ensure_declared()?;

        self.write_document(|name| Ok(partial.take(name)))
    }

    fn write_document<F>(&self, mut read: F) -> Result<Document, MappingError>
    where
        F: FnMut(&str) -> Result<Option<FieldValue>, MappingError>,
    {
        let mut document = Document::new();

        for property in self.properties.values() {
            if property.is_ignored() {
                continue;
            }
            let value = match read(property.name()).map_err(|err| err.in_field(property.name()))? {
                Some(value) => value,
                None => continue,
            };
            let value = property
                .convert_to_document(value)
                .map_err(|err| err.in_field(property.name()))?;
            document.insert(property.document_key().to_string(), value);
        }

        Ok(document)
    }

    /// Describes how each model field maps onto the document. Diagnostic only.
    pub fn document_blueprint(&self) -> IndexMap<String, BlueprintEntry> {
        self.properties
            .values()
            .map(|property| {
                (
                    property.name().to_string(),
                    BlueprintEntry {
                        default_document_key: property.default_document_key().to_string(),
                        document_key: property.document_key().to_string(),
                        ignored: property.is_ignored(),
                        custom_conversion: property.has_custom_conversion(),
                    },
                )
            })
            .collect()
    }
}
