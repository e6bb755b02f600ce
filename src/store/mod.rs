//! Document stores - where mapped documents live, and typed access to them.
//!
//! The mapping engine itself never performs I/O. This module supplies the seam a
//! store client plugs into ([`DocumentStore`]), a HashMap-backed store for tests
//! and development, and the typed [`Repository`] that ties metadata, queries and
//! relationship includes together.
//!
//! ## Example
//!
//! ```ignore
//! use docmap::{DocumentsExt, InMemoryDocumentStore, MetadataStore, Query};
//!
//! let mut metadata = MetadataStore::new();
//! metadata.register::<User>()?;
//! metadata.register::<Post>()?;
//!
//! let store = InMemoryDocumentStore::new();
//! let posts = store.collection::<Post>(&metadata)?;
//! posts.save(&post)?;
//! let loaded = posts.get_with("p1", &["author"])?;
//! let recent = posts.find(&Query::new().order_by("title", Direction::Asc).limit(10))?;
//! ```

mod in_memory;
mod repository;

use std::fmt;

use crate::error::MappingError;
use crate::model::Document;
use crate::path::Path;
use crate::query::{Constraint, QueryError};

pub use in_memory::InMemoryDocumentStore;
pub use repository::{DocumentsExt, Repository};

/// Raw document storage addressed by [`Path`].
///
/// Document paths have an even number of segments, collection paths an odd one.
pub trait DocumentStore: Send + Sync {
    /// Get the document at `path`. Returns None if there is none.
    fn get_document(&self, path: &Path) -> Result<Option<Document>, StoreError>;

    /// Create or replace the document at `path`.
    fn set_document(&self, path: &Path, document: Document) -> Result<(), StoreError>;

    /// Merge `fields` into the existing document at `path`.
    fn update_document(&self, path: &Path, fields: Document) -> Result<(), StoreError>;

    /// Delete the document at `path`. Returns true if it existed.
    fn delete_document(&self, path: &Path) -> Result<bool, StoreError>;

    /// Documents directly inside `collection` that satisfy `constraints`,
    /// paired with their ids.
    fn query(
        &self,
        collection: &Path,
        constraints: &[Constraint],
    ) -> Result<Vec<(String, Document)>, StoreError>;
}

/// Error type for document store and repository operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Storage-level error.
    Storage(String),
    /// No document at the given path.
    NotFound { path: String },
    /// The named field carries no relationship to include.
    NotARelationship { field: String },
    Mapping(MappingError),
    Query(QueryError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Storage(msg) => write!(f, "document storage error: {}", msg),
            StoreError::NotFound { path } => write!(f, "document not found: {}", path),
            StoreError::NotARelationship { field } => {
                write!(f, "field `{}` is not a relationship", field)
            }
            StoreError::Mapping(err) => write!(f, "mapping error: {}", err),
            StoreError::Query(err) => write!(f, "query error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Mapping(err) => Some(err),
            StoreError::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MappingError> for StoreError {
    fn from(err: MappingError) -> Self {
        StoreError::Mapping(err)
    }
}

impl From<QueryError> for StoreError {
    fn from(err: QueryError) -> Self {
        StoreError::Query(err)
    }
}
