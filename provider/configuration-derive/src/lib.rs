//! Derive macros for attribute tree types.
//!
//! - `Configuration` implements `provider_model::Configuration` for a plain old data struct.
//! - `OneOf` gives an enum of single-field variants the block representation of a oneof group:
//!   every variant is a block named after it, and exactly one of them must be populated.

mod oneof;

use proc_macro::{self, TokenStream};
use quote::quote;

#[proc_macro_derive(Configuration)]
pub fn derive_configuration(input: TokenStream) -> TokenStream {
    let ast: syn::DeriveInput = syn::parse(input).unwrap();
    let ident = ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    quote! {
       impl #impl_generics provider_model::Configuration for #ident #ty_generics #where_clause {}
    }
    .into()
}

/// The block name of each variant defaults to the snake case form of the variant name and can be
/// overridden with `#[oneof(rename = "...")]`.
#[proc_macro_derive(OneOf, attributes(oneof))]
pub fn derive_oneof(input: TokenStream) -> TokenStream {
    let ast: syn::DeriveInput = syn::parse(input).unwrap();
    let variants = oneof::variants(&ast);
    let serialize = oneof::serialize_impl(&ast.ident, &variants);
    let deserialize = oneof::deserialize_impl(&ast.ident, &variants);
    quote! {
        #serialize
        #deserialize
    }
    .into()
}
