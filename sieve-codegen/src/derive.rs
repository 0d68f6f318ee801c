//! Implementation of the `#[derive(UpdateSet)]` macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Path, Type};

/// Field names that are never written unless marked otherwise.
const IMMUTABLE_NAMES: &[&str] = &["id", "created", "deleted"];

/// Field name treated as the modification timestamp.
const MODIFIED_NAME: &str = "modified";

/// Parse and generate code for the `#[derive(UpdateSet)]` macro.
pub fn derive_update_set_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "UpdateSet derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "UpdateSet derive only supports structs",
            ));
        }
    };

    let struct_attrs = parse_struct_attrs(input)?;
    let krate = struct_attrs
        .crate_path
        .unwrap_or_else(|| syn::parse_quote!(::sieve));

    let field_infos: Vec<FieldInfo> = fields.iter().map(parse_field).collect::<Result<_, _>>()?;

    let modified_count = field_infos
        .iter()
        .filter(|f| f.role == Role::Modified)
        .count();
    if modified_count > 1 {
        return Err(syn::Error::new_spanned(
            input,
            "UpdateSet allows at most one modified field",
        ));
    }

    let descriptors: Vec<_> = field_infos
        .iter()
        .filter_map(|f| generate_descriptor(f, &krate))
        .collect();

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::update::UpdateRecord for #name #ty_generics #where_clause {
            const FIELDS: &'static [#krate::update::FieldDescriptor<Self>] = &[
                #(#descriptors,)*
            ];
        }
    })
}

/// Struct-level attributes parsed from `#[sieve(...)]`.
#[derive(Default)]
struct StructAttrs {
    crate_path: Option<Path>,
}

/// Parse struct-level `#[sieve(...)]` attributes.
fn parse_struct_attrs(input: &DeriveInput) -> Result<StructAttrs, syn::Error> {
    let mut attrs = StructAttrs::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("sieve") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.crate_path = Some(value.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported sieve struct attribute"))
            }
        })?;
    }

    Ok(attrs)
}

/// How a field is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Mutable,
    Immutable,
    Modified,
    Skipped,
}

/// Information about a field.
#[derive(Debug)]
struct FieldInfo {
    ident: Ident,
    name: String,
    column: Option<String>,
    role: Role,
}

/// Parse a field and its `#[sieve(...)]` attributes.
fn parse_field(field: &syn::Field) -> Result<FieldInfo, syn::Error> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "Fields must be named"))?;
    let name = ident.unraw().to_string();

    let mut column = None;
    let mut explicit: Option<Role> = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("sieve") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let role = if meta.path.is_ident("immutable") {
                Role::Immutable
            } else if meta.path.is_ident("modified") {
                Role::Modified
            } else if meta.path.is_ident("skip") {
                Role::Skipped
            } else if meta.path.is_ident("column") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(syn::Error::new_spanned(value, "column name must not be empty"));
                }
                column = Some(value.value());
                return Ok(());
            } else {
                return Err(meta.error("unsupported sieve field attribute"));
            };

            match explicit {
                Some(prev) if prev != role => {
                    Err(meta.error("conflicting sieve field attributes"))
                }
                _ => {
                    explicit = Some(role);
                    Ok(())
                }
            }
        })?;
    }

    let role = match explicit {
        Some(role) => role,
        None if IMMUTABLE_NAMES.contains(&name.as_str()) => Role::Immutable,
        None if name == MODIFIED_NAME => Role::Modified,
        None if is_option_type(&field.ty) || is_vec_type(&field.ty) => Role::Mutable,
        None => Role::Skipped,
    };

    if role == Role::Skipped && column.is_some() {
        return Err(syn::Error::new_spanned(
            &field.ty,
            "column is only valid on Option<T> or Vec<T> fields",
        ));
    }

    Ok(FieldInfo {
        ident,
        name,
        column,
        role,
    })
}

/// Generate the descriptor expression for one field.
fn generate_descriptor(field: &FieldInfo, krate: &Path) -> Option<TokenStream> {
    let name = &field.name;
    let ident = &field.ident;

    let descriptor = match field.role {
        Role::Skipped => return None,
        Role::Immutable => quote! { #krate::update::FieldDescriptor::immutable(#name) },
        Role::Modified => quote! { #krate::update::FieldDescriptor::modified(#name) },
        Role::Mutable => quote! {
            #krate::update::FieldDescriptor::mutable(#name, |record: &Self| {
                #krate::update::Presence::present_value(&record.#ident)
            })
        },
    };

    Some(match &field.column {
        Some(column) => quote! { #descriptor.column(#column) },
        None => descriptor,
    })
}

/// Check if a type is `Option<T>`.
fn is_option_type(ty: &Type) -> bool {
    last_segment_is(ty, "Option")
}

/// Check if a type is `Vec<T>`.
fn is_vec_type(ty: &Type) -> bool {
    last_segment_is(ty, "Vec")
}

fn last_segment_is(ty: &Type, ident: &str) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == ident;
        }
    }
    false
}
