//! Proc-macro providing the `#[derive(ColorGenerator)]` marker.
//!
//! The derive only implements the marker trait. The trait itself is not
//! defined here: `color-codegen` emits its declaration as
//! `color_generator.g.rs`, which the consuming crate includes at its root.
//! The generated code is produced in `build.rs` by `CodeGenerator`.
//!
//! # Example
//!
//! ```rust,ignore
//! use color_codegen::ColorGenerator;
//!
//! include!(concat!(env!("OUT_DIR"), "/color_generator.g.rs"));
//!
//! #[derive(ColorGenerator)]
//! pub struct Theme;
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

/// Marker derive for color code generation.
///
/// Expands to `impl crate::ColorGenerator for T {}`. Takes no arguments.
#[proc_macro_derive(ColorGenerator)]
pub fn derive_color_generator(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    TokenStream::from(quote! {
        impl #impl_generics crate::ColorGenerator for #ident #ty_generics #where_clause {}
    })
}
