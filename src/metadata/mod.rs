//! Metadata - what the engine knows about each model type and field.
//!
//! [`PropertyMetadata`] records how one field maps onto a document key,
//! [`TypeMetadata`] aggregates them per type and performs conversions, and the
//! [`MetadataStore`] owns every type's metadata plus the queue of forward
//! references that wait for types not declared yet.

mod forward_ref;
mod property;
mod registry;
mod store;
mod type_metadata;

pub use forward_ref::{DrainReport, ForwardRef};
pub use property::{default_document_key, PropertyMetadata};
pub use registry::MetadataRegistry;
pub use store::MetadataStore;
pub use type_metadata::{BlueprintEntry, TypeMetadata};
