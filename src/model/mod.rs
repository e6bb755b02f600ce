//! Models - typed in-memory representations of single documents.
//!
//! Rust has no runtime reflection, so a model exposes its fields by name through
//! the [`Model`] trait. `#[derive(Model)]` writes the impl; hand-written impls
//! work just as well.
//!
//! ## Example
//!
//! ```ignore
//! use docmap::{Model, ToOne};
//!
//! #[derive(Clone, Default, Model)]
//! #[model(collection = "posts")]
//! struct Post {
//!     id: String,
//!     #[model(map_to = "headline")]
//!     title: String,
//!     #[model(date)]
//!     created_on: Option<chrono::DateTime<chrono::Utc>>,
//!     #[model(to_one = "../users")]
//!     author: ToOne<User>,
//!     #[model(ignore)]
//!     dirty: bool,
//! }
//! ```

mod field;
mod partial;

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::MappingError;
use crate::schema::ModelSchema;

pub use field::{assign_plain, assign_typed, plain_value, typed_value, FieldValue};
pub use partial::PartialModel;

/// A document: the store's flat key → value representation of one record.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Trait for types that map onto documents.
pub trait Model: Default + Clone + Send + Sync + 'static {
    /// Names of the fields an instance carries, in declaration order.
    fn field_names(&self) -> Vec<&'static str>;

    /// Reads a field. `Ok(None)` if the model has no readable field of that name.
    fn field(&self, name: &str) -> Result<Option<FieldValue>, MappingError>;

    /// Writes a field. `Ok(false)` if the model has no writable field of that name.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<bool, MappingError>;

    fn has_field(&self, name: &str) -> bool {
        self.field_names().iter().any(|field| *field == name)
    }

    /// The model's identifier, if it has a non-empty one.
    fn id(&self) -> Option<&str> {
        None
    }

    /// Declares collection name, key remaps, converters and relationships.
    ///
    /// Runs once, when the type is registered with a
    /// [`MetadataStore`](crate::MetadataStore).
    fn describe(_schema: &mut ModelSchema<'_, Self>) {}
}

/// Identity of a model type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<M: 'static>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Field types usable as a model id. Empty strings count as no id.
pub trait ModelId {
    fn model_id(&self) -> Option<&str>;
}

impl ModelId for String {
    fn model_id(&self) -> Option<&str> {
        non_empty(self)
    }
}

impl ModelId for Option<String> {
    fn model_id(&self) -> Option<&str> {
        self.as_deref().and_then(non_empty)
    }
}

impl ModelId for &'static str {
    fn model_id(&self) -> Option<&str> {
        non_empty(self)
    }
}

fn non_empty(id: &str) -> Option<&str> {
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
