//! Derive macro for error types.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations.
//! Replacement for the `thiserror` crate.
//!
//! # Usage
//!
//! ```ignore
//! use crowdfund_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum MyError {
//!     #[error("not found: {0}")]
//!     NotFound(String),
//!
//!     #[error("expected {expected}, got {actual}")]
//!     InvalidValue { expected: u32, actual: u32 },
//!
//!     #[error("decoding failed: {0}")]
//!     Decode(#[from] DecodeError),
//! }
//! ```
//!
//! # Supported Features
//!
//! - Unit variants: `#[error("message")]`
//! - Tuple variants with positional args: `#[error("error: {0}")]`
//! - Struct variants with named args: `#[error("expected {expected}")]`
//! - `#[from]` on the only field of a tuple variant: generates `From` and `source()`
//!
//! Fields the message does not mention are not bound, so a message may
//! describe a variant without interpolating every field.

use proc_macro::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Data, DeriveInput, Fields, Lit, Meta, parse_macro_input};

/// Derives `Display` and `Error` for an enum or struct.
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_error_derive(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_error_derive(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    match &input.data {
        Data::Enum(data_enum) => {
            let mut display_arms = Vec::new();
            let mut source_arms = Vec::new();
            let mut from_impls = Vec::new();

            for variant in &data_enum.variants {
                let variant_name = &variant.ident;
                let error_msg = extract_error_message(&variant.attrs, variant_name)?;

                let arm = match &variant.fields {
                    Fields::Unit => quote! {
                        Self::#variant_name => write!(f, #error_msg),
                    },
                    Fields::Unnamed(fields) => {
                        let format_str = convert_positional_to_named(&error_msg, fields.unnamed.len());
                        let mut patterns = Vec::new();
                        let mut used = Vec::new();
                        for i in 0..fields.unnamed.len() {
                            let ident = format_ident!("f{}", i);
                            if mentions(&format_str, &ident.to_string()) {
                                patterns.push(ident.to_token_stream());
                                used.push(ident);
                            } else {
                                patterns.push(quote! { _ });
                            }
                        }
                        quote! {
                            Self::#variant_name(#(#patterns),*) => write!(f, #format_str, #(#used = #used),*),
                        }
                    }
                    Fields::Named(fields) => {
                        let used: Vec<_> = fields
                            .named
                            .iter()
                            .filter_map(|field| field.ident.as_ref())
                            .filter(|ident| mentions(&error_msg, &ident.to_string()))
                            .collect();
                        quote! {
                            Self::#variant_name { #(#used,)* .. } => write!(f, #error_msg, #(#used = #used),*),
                        }
                    }
                };
                display_arms.push(arm);

                if let Fields::Unnamed(fields) = &variant.fields
                    && let Some(field) = fields.unnamed.first()
                    && field.attrs.iter().any(|attr| attr.path().is_ident("from"))
                {
                    if fields.unnamed.len() != 1 {
                        return Err(syn::Error::new_spanned(
                            variant,
                            "#[from] requires a variant with exactly one field",
                        ));
                    }
                    let ty = &field.ty;
                    from_impls.push(quote! {
                        impl #impl_generics ::std::convert::From<#ty> for #name #ty_generics #where_clause {
                            fn from(source: #ty) -> Self {
                                Self::#variant_name(source)
                            }
                        }
                    });
                    source_arms.push(quote! {
                        Self::#variant_name(source) => Some(source),
                    });
                }
            }

            let error_impl = if source_arms.is_empty() {
                quote! {
                    impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
                }
            } else {
                quote! {
                    impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {
                        fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                            match self {
                                #(#source_arms)*
                                _ => None,
                            }
                        }
                    }
                }
            };

            Ok(quote! {
                impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
                    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                        match self {
                            #(#display_arms)*
                        }
                    }
                }

                #error_impl

                #(#from_impls)*
            })
        }
        Data::Struct(data_struct) => {
            let error_msg = extract_error_message(&input.attrs, &input.ident)?;

            let display_body = match &data_struct.fields {
                Fields::Unit => quote! { write!(f, #error_msg) },
                Fields::Named(fields) => {
                    let used: Vec<_> = fields
                        .named
                        .iter()
                        .filter_map(|field| field.ident.as_ref())
                        .filter(|ident| mentions(&error_msg, &ident.to_string()))
                        .collect();
                    quote! { write!(f, #error_msg, #(#used = self.#used),*) }
                }
                Fields::Unnamed(fields) => {
                    let format_str = convert_positional_to_named(&error_msg, fields.unnamed.len());
                    let (idents, indices): (Vec<_>, Vec<_>) = (0..fields.unnamed.len())
                        .filter(|i| mentions(&format_str, &format!("f{i}")))
                        .map(|i| (format_ident!("f{}", i), syn::Index::from(i)))
                        .unzip();
                    quote! { write!(f, #format_str, #(#idents = self.#indices),*) }
                }
            };

            Ok(quote! {
                impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
                    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                        #display_body
                    }
                }

                impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
            })
        }
        Data::Union(_) => Err(syn::Error::new_spanned(
            input,
            "Error derive does not support unions",
        )),
    }
}

/// Extracts the message from an `#[error("...")]` attribute.
fn extract_error_message<T: ToTokens>(attrs: &[syn::Attribute], target: &T) -> syn::Result<String> {
    for attr in attrs {
        if !attr.path().is_ident("error") {
            continue;
        }
        let Meta::List(meta_list) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                &attr.meta,
                "invalid #[error] attribute; use #[error(\"message\")]",
            ));
        };
        return match syn::parse2::<Lit>(meta_list.tokens.clone()) {
            Ok(Lit::Str(lit_str)) => Ok(lit_str.value()),
            _ => Err(syn::Error::new_spanned(
                &attr.meta,
                "#[error] expects a string literal, e.g. #[error(\"invalid opcode: {0}\")]",
            )),
        };
    }

    Err(syn::Error::new_spanned(
        target,
        "missing #[error(\"...\")] attribute; every error must declare a display message",
    ))
}

/// Returns true if `format_str` interpolates `name` (`{name}` or `{name:...}`).
fn mentions(format_str: &str, name: &str) -> bool {
    format_str.contains(&format!("{{{name}}}")) || format_str.contains(&format!("{{{name}:"))
}

/// Converts positional format args `{0}`, `{1}` to named args `{f0}`, `{f1}`.
fn convert_positional_to_named(format_str: &str, field_count: usize) -> String {
    let mut result = format_str.to_string();
    for i in (0..field_count).rev() {
        result = result
            .replace(&format!("{{{i}}}"), &format!("{{f{i}}}"))
            .replace(&format!("{{{i}:"), &format!("{{f{i}:"));
    }
    result
}
