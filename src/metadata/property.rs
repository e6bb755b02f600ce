use std::fmt;

use serde_json::Value;

use crate::convert::{identity_to_document, identity_to_model, ToDocumentFn, ToModelFn};
use crate::error::MappingError;
use crate::model::FieldValue;
use crate::relationship::Relationship;

/// Derives the default document key of a field: every uppercase letter becomes
/// `_` followed by its lowercase form, without a leading underscore.
///
/// `createdOn` maps to `created_on`; snake_case names map to themselves.
pub fn default_document_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            if !key.is_empty() {
                key.push('_');
            }
            key.extend(ch.to_lowercase());
        } else {
            key.push(ch);
        }
    }
    key
}

/// Mapping record for one model field.
#[derive(Clone)]
pub struct PropertyMetadata {
    name: String,
    default_document_key: String,
    mapped_to: Option<String>,
    ignored: bool,
    relationship: Option<Relationship>,
    to_model: Option<ToModelFn>,
    to_document: Option<ToDocumentFn>,
}

impl PropertyMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            default_document_key: default_document_key(&name),
            name,
            mapped_to: None,
            ignored: false,
            relationship: None,
            to_model: None,
            to_document: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_document_key(&self) -> &str {
        &self.default_document_key
    }

    pub fn mapped_to(&self) -> Option<&str> {
        self.mapped_to.as_deref()
    }

    /// The key this field is stored under.
    pub fn document_key(&self) -> &str {
        self.mapped_to
            .as_deref()
            .unwrap_or(&self.default_document_key)
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn relationship(&self) -> Option<&Relationship> {
        self.relationship.as_ref()
    }

    pub fn has_custom_conversion(&self) -> bool {
        self.to_model.is_some() || self.to_document.is_some()
    }

    // The setters below hand back what they replaced; the schema API decides
    // whether that deserves a warning.

    pub fn set_mapped_to(&mut self, key: impl Into<String>) -> Option<String> {
        self.mapped_to.replace(key.into())
    }

    pub fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    pub fn set_relationship(&mut self, relationship: Relationship) -> Option<Relationship> {
        self.relationship.replace(relationship)
    }

    pub fn set_to_model_converter(&mut self, converter: ToModelFn) -> Option<ToModelFn> {
        self.to_model.replace(converter)
    }

    pub fn set_to_document_converter(&mut self, converter: ToDocumentFn) -> Option<ToDocumentFn> {
        self.to_document.replace(converter)
    }

    /// Runs the to-model converter. `None` means the document lacks the key.
    pub fn convert_to_model(&self, value: Option<&Value>) -> Result<FieldValue, MappingError> {
        match &self.to_model {
            Some(convert) => convert(value),
            None => identity_to_model(value),
        }
    }

    pub fn convert_to_document(&self, value: FieldValue) -> Result<Value, MappingError> {
        match &self.to_document {
            Some(convert) => convert(value),
            None => identity_to_document(value),
        }
    }
}

impl fmt::Debug for PropertyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("name", &self.name)
            .field("document_key", &self.document_key())
            .field("ignored", &self.ignored)
            .field("relationship", &self.relationship)
            .field("custom_conversion", &self.has_custom_conversion())
            .finish()
    }
}
