use std::fmt;

use indexmap::IndexSet;

use crate::error::MappingError;
use crate::model::{Model, TypeKey};

/// Foreign-key references to many models of type `T`.
///
/// The ids are the persisted part. Resolved models are a cache filled by an
/// include pass and are not kept element-for-element in step with the ids:
/// removing an id leaves the models alone, and missing targets simply leave
/// fewer models than ids.
#[derive(Clone, PartialEq)]
pub struct ToMany<T> {
    ids: IndexSet<String>,
    models: Vec<T>,
}

impl<T> Default for ToMany<T> {
    fn default() -> Self {
        Self {
            ids: IndexSet::new(),
            models: Vec::new(),
        }
    }
}

impl<T: Model> ToMany<T> {
    /// Collects `ids` in order. Empty strings are not ids and are skipped.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| !id.is_empty())
            .collect();
        Self {
            ids,
            models: Vec::new(),
        }
    }

    pub fn target_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Adds an id. Returns false if it was already present.
    pub fn add_id(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id.is_empty() {
            return false;
        }
        self.ids.insert(id)
    }

    pub fn remove_id(&mut self, id: &str) -> bool {
        self.ids.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn models(&self) -> &[T] {
        &self.models
    }

    /// Caches a resolved model and records its id. Fails if the model has no id.
    pub fn add_model(&mut self, model: T) -> Result<(), MappingError> {
        let id = model.id().ok_or(MappingError::MissingIdentifier {
            context: "to-many relationship model",
        })?;
        self.ids.insert(id.to_string());
        self.models.push(model);
        Ok(())
    }

    pub fn clear_models(&mut self) {
        self.models.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for ToMany<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToMany")
            .field("ids", &self.ids)
            .field("models", &self.models)
            .finish()
    }
}
