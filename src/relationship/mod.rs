//! Relationships - foreign-key fields that may carry their loaded target.
//!
//! The mapping engine never performs I/O. A relationship field stores ids in the
//! document; loading the targets is left to an include pass (see
//! `Repository::include`), which reads ids through a [`RelationshipBinding`],
//! fetches the documents, and hands them back for attaching.

mod sub_collection;
mod to_many;
mod to_one;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::MappingError;
use crate::metadata::MetadataRegistry;
use crate::model::{Document, FieldValue, Model, TypeKey};
use crate::path::Path;

pub use sub_collection::SubCollection;
pub use to_many::ToMany;
pub use to_one::ToOne;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    ToOne,
    ToMany,
    /// A nested collection stored under the owning document.
    Sub,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::ToOne => f.write_str("to-one"),
            RelationshipKind::ToMany => f.write_str("to-many"),
            RelationshipKind::Sub => f.write_str("sub"),
        }
    }
}

/// Describes a relationship field: its kind, target type and where the target
/// collection lives relative to the owning repository.
#[derive(Clone)]
pub struct Relationship {
    kind: RelationshipKind,
    target: TypeKey,
    location: Path,
    binding: Arc<dyn RelationshipBinding>,
}

impl Relationship {
    pub fn to_one<T: Model>(location: Path) -> Self {
        Self {
            kind: RelationshipKind::ToOne,
            target: TypeKey::of::<T>(),
            location,
            binding: Arc::new(ToOneBinding::<T>(PhantomData)),
        }
    }

    pub fn to_many<T: Model>(location: Path) -> Self {
        Self {
            kind: RelationshipKind::ToMany,
            target: TypeKey::of::<T>(),
            location,
            binding: Arc::new(ToManyBinding::<T>(PhantomData)),
        }
    }

    pub fn sub<T: Model>(location: Path) -> Self {
        Self {
            kind: RelationshipKind::Sub,
            target: TypeKey::of::<T>(),
            location,
            binding: Arc::new(SubBinding),
        }
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn binding(&self) -> &dyn RelationshipBinding {
        self.binding.as_ref()
    }
}

impl fmt::Debug for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("location", &self.location)
            .finish()
    }
}

/// Type-erased access to a relationship field's value.
pub trait RelationshipBinding: Send + Sync {
    /// Foreign ids held by the field value.
    fn ids(&self, value: &FieldValue) -> Result<Vec<String>, MappingError>;

    /// Converts fetched target documents and stores them on the field value.
    fn attach(
        &self,
        value: FieldValue,
        documents: Vec<Document>,
        registry: &MetadataRegistry,
    ) -> Result<FieldValue, MappingError>;
}

/// Field types that point at another model type.
pub trait RelationshipField {
    type Target: Model;
}

impl<T: Model> RelationshipField for ToOne<T> {
    type Target = T;
}

impl<T: Model> RelationshipField for ToMany<T> {
    type Target = T;
}

impl<T: Model> RelationshipField for SubCollection<T> {
    type Target = T;
}

struct ToOneBinding<T>(PhantomData<fn() -> T>);

impl<T: Model> RelationshipBinding for ToOneBinding<T> {
    fn ids(&self, value: &FieldValue) -> Result<Vec<String>, MappingError> {
        match value {
            FieldValue::Typed(boxed) => {
                let relationship =
                    boxed
                        .downcast_ref::<ToOne<T>>()
                        .ok_or(MappingError::TypeMismatch {
                            expected: std::any::type_name::<ToOne<T>>(),
                            found: "another typed value",
                        })?;
                Ok(relationship.id().map(str::to_string).into_iter().collect())
            }
            FieldValue::Plain(_) => Err(MappingError::TypeMismatch {
                expected: std::any::type_name::<ToOne<T>>(),
                found: "plain value",
            }),
        }
    }

    fn attach(
        &self,
        value: FieldValue,
        documents: Vec<Document>,
        registry: &MetadataRegistry,
    ) -> Result<FieldValue, MappingError> {
        let mut relationship = value.into_typed::<ToOne<T>>()?;
        if let Some(document) = documents.into_iter().next() {
            let model = registry.get::<T>()?.convert_document_to_model::<T>(&document)?;
            relationship.set_model(model)?;
        }
        Ok(FieldValue::typed(relationship))
    }
}

struct ToManyBinding<T>(PhantomData<fn() -> T>);

impl<T: Model> RelationshipBinding for ToManyBinding<T> {
    fn ids(&self, value: &FieldValue) -> Result<Vec<String>, MappingError> {
        match value {
            FieldValue::Typed(boxed) => {
                let relationship =
                    boxed
                        .downcast_ref::<ToMany<T>>()
                        .ok_or(MappingError::TypeMismatch {
                            expected: std::any::type_name::<ToMany<T>>(),
                            found: "another typed value",
                        })?;
                Ok(relationship.ids().map(str::to_string).collect())
            }
            FieldValue::Plain(_) => Err(MappingError::TypeMismatch {
                expected: std::any::type_name::<ToMany<T>>(),
                found: "plain value",
            }),
        }
    }

    fn attach(
        &self,
        value: FieldValue,
        documents: Vec<Document>,
        registry: &MetadataRegistry,
    ) -> Result<FieldValue, MappingError> {
        let mut relationship = value.into_typed::<ToMany<T>>()?;
        let metadata = registry.get::<T>()?;
        relationship.clear_models();
        for document in &documents {
            relationship.add_model(metadata.convert_document_to_model::<T>(document)?)?;
        }
        Ok(FieldValue::typed(relationship))
    }
}

/// Nested collections hold no ids; there is nothing to include.
struct SubBinding;

impl RelationshipBinding for SubBinding {
    fn ids(&self, _value: &FieldValue) -> Result<Vec<String>, MappingError> {
        Ok(Vec::new())
    }

    fn attach(
        &self,
        value: FieldValue,
        _documents: Vec<Document>,
        _registry: &MetadataRegistry,
    ) -> Result<FieldValue, MappingError> {
        Ok(value)
    }
}
