mod model;

use proc_macro::TokenStream;

/// Derive macro for the `Model` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Default, Model)]
/// #[model(collection = "posts")]
/// struct Post {
///     id: String,
///     #[model(map_to = "headline")]
///     title: String,
///     #[model(date)]
///     published_on: Option<DateTime<Utc>>,
///     #[model(to_one = "../users")]
///     author: ToOne<User>,
///     #[model(to_many = "~/tags")]
///     tags: ToMany<Tag>,
///     #[model(sub = "comments")]
///     comments: SubCollection<Comment>,
///     #[model(convert = "crate::money")]
///     price: Money,
///     #[model(ignore)]
///     dirty: bool,
/// }
/// ```
///
/// - `#[model(collection = "...")]` sets the collection name. There is no
///   default; repositories need one.
/// - `#[model(id)]` marks the identifier field. If omitted, a field named `id`
///   is used when present.
/// - `#[model(map_to = "...")]` stores the field under another document key.
/// - `#[model(ignore)]` leaves the field out of documents entirely.
/// - `#[model(date)]` stores an `Option<DateTime<Utc>>` as a timestamp pair.
/// - `#[model(to_one = "...")]`, `#[model(to_many = "...")]` and
///   `#[model(sub = "...")]` declare relationships; the target type comes from
///   the field's `ToOne<T>`, `ToMany<T>` or `SubCollection<T>`.
/// - `#[model(convert = "module")]` and `#[model(convert_array = "module")]`
///   use the module's `to_model` and `to_document` functions, the latter
///   element-wise over a `Vec`.
///
/// Plain fields need `Serialize` and `DeserializeOwned`; converted and
/// relationship fields need `Clone`.
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    model::derive_model(input)
}
