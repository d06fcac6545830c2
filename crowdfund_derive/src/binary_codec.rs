//! Derive macro for fixed-layout binary headers.
//!
//! Only structs are supported. Fields are written in declaration order using
//! their own `Encode` implementation, so the layout of the struct is the layout
//! on the wire. There is no length prefix and no padding.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives `Encode` and `Decode` for a struct.
///
/// ```ignore
/// #[derive(BinaryCodec)]
/// pub struct Header {
///     pub version: i16,
///     pub code_pages: i16,
/// }
/// ```
///
/// expands to an `Encode` impl writing `version` then `code_pages`, and a
/// `Decode` impl reading them back in the same order.
pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(&input, "BinaryCodec derive only supports structs")
            .to_compile_error()
            .into();
    };

    let expanded = match &data_struct.fields {
        Fields::Named(fields) => {
            let names: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
            quote! {
                impl #impl_generics crate::types::encoding::Encode for #name #ty_generics #where_clause {
                    fn encode<S: crate::types::encoding::EncodeSink>(&self, out: &mut S) {
                        #( crate::types::encoding::Encode::encode(&self.#names, out); )*
                    }
                }

                impl #impl_generics crate::types::encoding::Decode for #name #ty_generics #where_clause {
                    fn decode(input: &mut &[u8]) -> ::std::result::Result<Self, crate::types::encoding::DecodeError> {
                        Ok(Self {
                            #( #names: crate::types::encoding::Decode::decode(input)?, )*
                        })
                    }
                }
            }
        }
        Fields::Unnamed(fields) => {
            let indices: Vec<_> = (0..fields.unnamed.len()).map(syn::Index::from).collect();
            let decoders = indices.iter().map(|_| {
                quote! { crate::types::encoding::Decode::decode(input)?, }
            });
            quote! {
                impl #impl_generics crate::types::encoding::Encode for #name #ty_generics #where_clause {
                    fn encode<S: crate::types::encoding::EncodeSink>(&self, out: &mut S) {
                        #( crate::types::encoding::Encode::encode(&self.#indices, out); )*
                    }
                }

                impl #impl_generics crate::types::encoding::Decode for #name #ty_generics #where_clause {
                    fn decode(input: &mut &[u8]) -> ::std::result::Result<Self, crate::types::encoding::DecodeError> {
                        Ok(Self( #(#decoders)* ))
                    }
                }
            }
        }
        Fields::Unit => syn::Error::new_spanned(&input, "BinaryCodec derive needs at least one field")
            .to_compile_error(),
    };

    TokenStream::from(expanded)
}
