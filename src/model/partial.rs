use indexmap::IndexMap;
use serde::Serialize;

use super::FieldValue;
use crate::error::MappingError;

/// A subset of a model's fields, keyed by model field name.
///
/// Input of partial model → document conversion (updates that only touch some
/// fields).
#[derive(Debug, Default)]
pub struct PartialModel {
    fields: IndexMap<String, FieldValue>,
}

impl PartialModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a serde-convertible field.
    pub fn with_plain<T: Serialize>(
        mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, MappingError> {
        self.insert(name, FieldValue::Plain(serde_json::to_value(value)?));
        Ok(self)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn take(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
