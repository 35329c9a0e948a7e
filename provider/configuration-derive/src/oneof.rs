use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{self, Data, Fields, Lit, Meta, NestedMeta, Type};

pub(crate) struct Variant {
    ident: Ident,
    key: String,
    ty: Type,
}

pub(crate) fn variants(ast: &syn::DeriveInput) -> Vec<Variant> {
    let data = match &ast.data {
        Data::Enum(data) => data,
        _ => panic!("OneOf can only be derived for enums"),
    };
    if !ast.generics.params.is_empty() {
        panic!("OneOf does not support generic enums");
    }
    data.variants
        .iter()
        .map(|variant| {
            let ty = match &variant.fields {
                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => fields.unnamed[0].ty.clone(),
                _ => panic!(
                    "OneOf variant '{}' must have exactly one unnamed field",
                    variant.ident
                ),
            };
            let key = rename(&variant.attrs).unwrap_or_else(|| snake_case(&variant.ident.to_string()));
            Variant {
                ident: variant.ident.clone(),
                key,
                ty,
            }
        })
        .collect()
}

fn rename(attrs: &[syn::Attribute]) -> Option<String> {
    attrs
        .iter()
        .filter(|attr| attr.path.is_ident("oneof"))
        .filter_map(|attr| match attr.parse_meta() {
            Ok(Meta::List(list)) => Some(list.nested),
            _ => None,
        })
        .flatten()
        .filter_map(|nested| match nested {
            NestedMeta::Meta(Meta::NameValue(nv)) if nv.path.is_ident("rename") => match nv.lit {
                Lit::Str(s) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .last()
}

fn snake_case(name: &str) -> String {
    let mut out = String::new();
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Every variant block is written, the populated one with a single element and the others empty,
/// so that each block's count is observable.
pub(crate) fn serialize_impl(ident: &Ident, variants: &[Variant]) -> TokenStream {
    let len = variants.len();
    let arms = variants.iter().map(|populated| {
        let variant_ident = &populated.ident;
        let entries = variants.iter().map(|variant| {
            let key = &variant.key;
            let ty = &variant.ty;
            if variant.ident == populated.ident {
                quote! { map.serialize_entry(#key, std::slice::from_ref(value))?; }
            } else {
                quote! { map.serialize_entry(#key, &[] as &[#ty])?; }
            }
        });
        quote! {
            #ident::#variant_ident(value) => {
                #(#entries)*
            }
        }
    });

    quote! {
        impl serde::Serialize for #ident {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(#len))?;
                match self {
                    #(#arms)*
                }
                map.end()
            }
        }
    }
}

pub(crate) fn deserialize_impl(ident: &Ident, variants: &[Variant]) -> TokenStream {
    let keys: Vec<&String> = variants.iter().map(|variant| &variant.key).collect();
    let all_keys = keys
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let fields: Vec<Ident> = (0..variants.len())
        .map(|i| Ident::new(&format!("block_{}", i), Span::call_site()))
        .collect();

    let repr_fields = variants.iter().zip(fields.iter()).map(|(variant, field)| {
        let key = &variant.key;
        let ty = &variant.ty;
        quote! {
            #[serde(rename = #key, default)]
            #field: std::vec::Vec<#ty>,
        }
    });

    let collect = variants.iter().zip(fields.iter()).map(|(variant, field)| {
        let key = &variant.key;
        let variant_ident = &variant.ident;
        quote! {
            if repr.#field.len() > 1 {
                return Err(serde::de::Error::custom(format!(
                    "at most one '{}' block may be given, found {}",
                    #key,
                    repr.#field.len()
                )));
            }
            if let Some(value) = repr.#field.pop() {
                populated.push(#key);
                found = Some(#ident::#variant_ident(value));
            }
        }
    });

    quote! {
        impl<'de> serde::Deserialize<'de> for #ident {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                #[derive(serde::Deserialize)]
                #[serde(deny_unknown_fields)]
                struct Repr {
                    #(#repr_fields)*
                }

                let mut repr = <Repr as serde::Deserialize>::deserialize(deserializer)?;
                let mut populated: std::vec::Vec<&str> = std::vec::Vec::new();
                let mut found: std::option::Option<#ident> = None;
                #(#collect)*

                match (found, populated.len()) {
                    (Some(value), 1) => Ok(value),
                    (_, 0) => Err(serde::de::Error::custom(concat!(
                        "exactly one of [", #all_keys, "] must be given"
                    ))),
                    _ => Err(serde::de::Error::custom(format!(
                        concat!("only one of [", #all_keys, "] may be given, found [{}]"),
                        populated.join(", ")
                    ))),
                }
            }
        }
    }
}
