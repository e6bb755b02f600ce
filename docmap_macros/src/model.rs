use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type};

pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

/// How a field moves between model and document.
enum Mapping {
    Plain,
    Date,
    ToOne(LitStr),
    ToMany(LitStr),
    Sub(LitStr),
    Convert(syn::Path),
    ConvertArray(syn::Path),
}

struct FieldSpec {
    ident: Ident,
    ty: Type,
    id: bool,
    ignore: bool,
    map_to: Option<LitStr>,
    mapping: Mapping,
}

impl FieldSpec {
    /// Stored through a converter as a concrete Rust value.
    fn is_typed(&self) -> bool {
        !matches!(self.mapping, Mapping::Plain)
    }

    /// Never read or written by conversions.
    fn is_skipped(&self) -> bool {
        self.ignore || matches!(self.mapping, Mapping::Sub(_))
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let collection = extract_collection(input)?;
    let fields = extract_fields(input)?;
    let id_field = find_id_field(&fields)?;

    let names: Vec<String> = fields.iter().map(|field| field.ident.to_string()).collect();

    let read_arms = fields.iter().filter(|field| !field.is_skipped()).map(|field| {
        let ident = &field.ident;
        let key = ident.to_string();
        if field.is_typed() {
            quote! {
                #key => ::std::result::Result::Ok(::std::option::Option::Some(::docmap::typed_value(&self.#ident))),
            }
        } else {
            quote! {
                #key => ::docmap::plain_value(&self.#ident).map(::std::option::Option::Some),
            }
        }
    });

    let write_arms = fields.iter().filter(|field| !field.is_skipped()).map(|field| {
        let ident = &field.ident;
        let key = ident.to_string();
        if field.is_typed() {
            quote! {
                #key => ::docmap::assign_typed(&mut self.#ident, value).map(|_| true),
            }
        } else {
            quote! {
                #key => ::docmap::assign_plain(&mut self.#ident, value).map(|_| true),
            }
        }
    });

    let id_method = id_field.map(|ident| {
        quote! {
            fn id(&self) -> ::std::option::Option<&str> {
                ::docmap::ModelId::model_id(&self.#ident)
            }
        }
    });

    let collection_decl = collection.map(|collection| {
        quote! { schema.collection(#collection); }
    });
    let field_decls = fields.iter().filter_map(field_declaration);

    Ok(quote! {
        impl #impl_generics ::docmap::Model for #name #ty_generics #where_clause {
            fn field_names(&self) -> ::std::vec::Vec<&'static str> {
                ::std::vec![#(#names),*]
            }

            fn field(
                &self,
                name: &str,
            ) -> ::std::result::Result<::std::option::Option<::docmap::FieldValue>, ::docmap::MappingError> {
                match name {
                    #(#read_arms)*
                    _ => ::std::result::Result::Ok(::std::option::Option::None),
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: ::docmap::FieldValue,
            ) -> ::std::result::Result<bool, ::docmap::MappingError> {
                let _ = &value;
                match name {
                    #(#write_arms)*
                    _ => ::std::result::Result::Ok(false),
                }
            }

            #id_method

            fn describe(schema: &mut ::docmap::ModelSchema<'_, Self>) {
                let _ = &schema;
                #collection_decl
                #(#field_decls)*
            }
        }
    })
}

/// The `schema.field(..)` chain for one field, if it declares anything.
fn field_declaration(field: &FieldSpec) -> Option<TokenStream2> {
    let key = field.ident.to_string();
    let ty = &field.ty;
    let mut calls = Vec::new();

    if let Some(map_to) = &field.map_to {
        calls.push(quote! { .map_to(#map_to) });
    }
    if field.ignore {
        calls.push(quote! { .ignore() });
    }
    match &field.mapping {
        Mapping::Plain => {}
        Mapping::Date => calls.push(quote! { .date() }),
        Mapping::ToOne(location) => calls.push(quote! {
            .to_one::<<#ty as ::docmap::RelationshipField>::Target>(#location)
        }),
        Mapping::ToMany(location) => calls.push(quote! {
            .to_many::<<#ty as ::docmap::RelationshipField>::Target>(#location)
        }),
        Mapping::Sub(location) => calls.push(quote! {
            .sub::<<#ty as ::docmap::RelationshipField>::Target>(#location)
        }),
        Mapping::Convert(module) => calls.push(quote! {
            .convert(#module::to_model, #module::to_document)
        }),
        Mapping::ConvertArray(module) => calls.push(quote! {
            .convert_array(#module::to_model, #module::to_document)
        }),
    }

    if calls.is_empty() {
        return None;
    }
    Some(quote! { schema.field(#key) #(#calls)*; })
}

fn extract_collection(input: &DeriveInput) -> syn::Result<Option<LitStr>> {
    let mut collection = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("model") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                collection = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported model attribute, expected `collection`"))
            }
        })?;
    }
    Ok(collection)
}

fn extract_fields(input: &DeriveInput) -> syn::Result<Vec<FieldSpec>> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Model derive needs a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Model derive only supports structs",
            ))
        }
    };

    named.iter().map(parse_field).collect()
}

fn parse_field(field: &syn::Field) -> syn::Result<FieldSpec> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

    let mut spec = FieldSpec {
        ident,
        ty: field.ty.clone(),
        id: false,
        ignore: false,
        map_to: None,
        mapping: Mapping::Plain,
    };

    for attr in &field.attrs {
        if !attr.path().is_ident("model") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let mapping = if meta.path.is_ident("id") {
                spec.id = true;
                return Ok(());
            } else if meta.path.is_ident("ignore") {
                spec.ignore = true;
                return Ok(());
            } else if meta.path.is_ident("map_to") {
                spec.map_to = Some(meta.value()?.parse()?);
                return Ok(());
            } else if meta.path.is_ident("date") {
                Mapping::Date
            } else if meta.path.is_ident("to_one") {
                Mapping::ToOne(meta.value()?.parse()?)
            } else if meta.path.is_ident("to_many") {
                Mapping::ToMany(meta.value()?.parse()?)
            } else if meta.path.is_ident("sub") {
                Mapping::Sub(meta.value()?.parse()?)
            } else if meta.path.is_ident("convert") {
                let module: LitStr = meta.value()?.parse()?;
                Mapping::Convert(module.parse()?)
            } else if meta.path.is_ident("convert_array") {
                let module: LitStr = meta.value()?.parse()?;
                Mapping::ConvertArray(module.parse()?)
            } else {
                return Err(meta.error("unsupported model field attribute"));
            };

            if !matches!(spec.mapping, Mapping::Plain) {
                return Err(meta.error("a field takes at most one of date, to_one, to_many, sub, convert, convert_array"));
            }
            spec.mapping = mapping;
            Ok(())
        })?;
    }

    Ok(spec)
}

/// The field marked `#[model(id)]`, else a field named `id`, else none.
fn find_id_field(fields: &[FieldSpec]) -> syn::Result<Option<&Ident>> {
    let mut marked = fields.iter().filter(|field| field.id);
    if let Some(field) = marked.next() {
        if let Some(extra) = marked.next() {
            return Err(syn::Error::new_spanned(&extra.ident, "only one field can be the model id"));
        }
        return Ok(Some(&field.ident));
    }

    Ok(fields
        .iter()
        .map(|field| &field.ident)
        .find(|ident| *ident == "id"))
}
