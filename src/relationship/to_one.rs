use std::fmt;

use crate::error::MappingError;
use crate::model::{Model, TypeKey};

/// A foreign-key reference to one model of type `T`, optionally loaded.
///
/// Invariant: there is a model only if there is an id, and a loaded model
/// always carries that same id.
#[derive(Clone, PartialEq)]
pub struct ToOne<T> {
    id: Option<String>,
    model: Option<T>,
}

impl<T> Default for ToOne<T> {
    fn default() -> Self {
        Self {
            id: None,
            model: None,
        }
    }
}

impl<T: Model> ToOne<T> {
    pub fn new(id: Option<String>) -> Self {
        Self {
            id: id.filter(|id| !id.is_empty()),
            model: None,
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self::new(Some(id.into()))
    }

    /// Builds a loaded relationship from a model.
    pub fn from_model(model: T) -> Result<Self, MappingError> {
        let mut relationship = Self::default();
        relationship.set_model(model)?;
        Ok(relationship)
    }

    pub fn target_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Replaces the id. A loaded model that does not carry the new id is dropped.
    pub fn set_id(&mut self, id: Option<String>) {
        let id = id.filter(|id| !id.is_empty());
        let keeps_model = match (&id, &self.model) {
            (Some(id), Some(model)) => model.id() == Some(id.as_str()),
            _ => false,
        };
        if !keeps_model {
            self.model = None;
        }
        self.id = id;
    }

    pub fn model(&self) -> Option<&T> {
        self.model.as_ref()
    }

    /// Stores the model together with its id. Fails if the model has no id.
    pub fn set_model(&mut self, model: T) -> Result<(), MappingError> {
        let id = model
            .id()
            .map(str::to_string)
            .ok_or(MappingError::MissingIdentifier {
                context: "to-one relationship model",
            })?;
        self.id = Some(id);
        self.model = Some(model);
        Ok(())
    }

    /// Removes the loaded model and keeps the id. Hand an edited model back
    /// through [`ToOne::set_model`].
    pub fn take_model(&mut self) -> Option<T> {
        self.model.take()
    }

    pub fn clear(&mut self) {
        self.id = None;
        self.model = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn is_valid(&self) -> bool {
        match (&self.id, &self.model) {
            (None, None) => true,
            (None, Some(_)) => false,
            (Some(_), None) => true,
            (Some(id), Some(model)) => model.id() == Some(id.as_str()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ToOne<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToOne")
            .field("id", &self.id)
            .field("model", &self.model)
            .finish()
    }
}
