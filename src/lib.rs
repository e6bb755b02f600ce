//! docmap - metadata-driven mapping between typed models and schemaless documents.
//!
//! Models describe how their fields map onto document keys (remaps, ignored
//! fields, converters, relationships) through [`Model::describe`] or
//! `#[derive(Model)]`. A [`MetadataStore`] collects those declarations per
//! type, resolves references to types declared later, and converts in both
//! directions. [`Path`] and [`Query`] cover addressing and query building; the
//! `memory` feature adds a document store and typed [`Repository`].

pub mod convert;
mod error;
pub mod metadata;
mod model;
pub mod path;
pub mod query;
mod relationship;
mod schema;
#[cfg(feature = "memory")]
mod store;

pub use error::MappingError;
pub use metadata::{
    default_document_key, BlueprintEntry, DrainReport, ForwardRef, MetadataRegistry,
    MetadataStore, PropertyMetadata, TypeMetadata,
};
pub use model::{
    assign_plain, assign_typed, plain_value, typed_value, Document, FieldValue, Model, ModelId,
    PartialModel, TypeKey,
};
pub use path::Path;
pub use query::{Constraint, Direction, FilterOp, Query, QueryError, QueryNode};
pub use relationship::{
    Relationship, RelationshipBinding, RelationshipField, RelationshipKind, SubCollection, ToMany,
    ToOne,
};
pub use schema::{FieldSchema, ModelSchema};
#[cfg(feature = "memory")]
pub use store::{DocumentStore, DocumentsExt, InMemoryDocumentStore, Repository, StoreError};

// Derive macro shares its name with the trait, like serde's.
#[cfg(feature = "derive")]
pub use docmap_macros::Model;
