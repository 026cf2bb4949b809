//! Rust server module generation.
//!
//! Produces the `dispatch` entry point the host HTTP layer calls, plus one
//! `encode_<stem>` function per reachable shape.
//!
//! ## Generated Code Example
//!
//! ```ignore
//! use std::io::{self, Write};
//!
//! pub async fn dispatch<W: Write>(path: &str, out: &mut W) -> io::Result<bool> {
//!     match path {
//!         "/api/files" => {
//!             let result = crate::ExampleController::default().files().await;
//!             encode_list_of_string(out, &result)?;
//!             Ok(true)
//!         }
//!         _ => Ok(false),
//!     }
//! }
//!
//! pub fn encode_list_of_string<W: Write, S0: AsRef<str>>(
//!     out: &mut W,
//!     items: &[S0],
//! ) -> io::Result<()> {
//!     out.write_all(&wire_count(items.len())?.to_le_bytes())?;
//!     for item in items {
//!         encode_string(out, item.as_ref())?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! List encoders are generic over the element container, so `Vec<T>`,
//! `[T; N]`, `Box<[T]>` and `&'static [T]` results share one encoder.

use caefte_define::{PrimitiveKind, TypeDescriptor};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::naming::encoder_ident;
use crate::model::{BoundEndpoint, ServiceModel, ShapeVisitor, visit_shapes};

/// Assembles the complete server module.
///
/// `module_root` is prefixed to every handler type path.
pub fn assemble_server_module(model: &ServiceModel, module_root: &syn::Path) -> TokenStream {
    let docs = module_docs(model);
    let dispatch = generate_dispatch(model, module_root);
    let encoders = visit_shapes(&model.shapes, &mut EncoderEmitter);
    let wire_count = model.has_counted_shapes().then(generate_wire_count);

    quote! {
        #docs

        use std::io::{self, Write};

        #dispatch

        #(#encoders)*

        #wire_count
    }
}

fn module_docs(model: &ServiceModel) -> TokenStream {
    let mut lines = vec![
        " Request dispatcher and binary encoders for the service endpoints.".to_string(),
        String::new(),
    ];
    if model.endpoints.is_empty() {
        lines.push(" No endpoints were discovered; `dispatch` never matches.".to_string());
    } else {
        lines.push(" ## Routes".to_string());
        lines.push(String::new());
        for endpoint in &model.endpoints {
            lines.push(format!(
                " - `{}` calls `{}` and writes `{}`",
                endpoint.descriptor.route(),
                endpoint.binding.display_name(),
                endpoint.descriptor.result_type.stem()
            ));
        }
    }

    quote! {
        #(#![doc = #lines])*
    }
}

/// Generates `dispatch`, with one match arm per endpoint in declaration
/// order.
pub fn generate_dispatch(model: &ServiceModel, module_root: &syn::Path) -> TokenStream {
    let arms = model
        .endpoints
        .iter()
        .map(|endpoint| generate_arm(endpoint, module_root));
    let unused_out = model.endpoints.is_empty().then(|| quote!(let _ = out;));

    quote! {
        /// Writes the encoded result of the endpoint bound to `path`.
        ///
        /// Returns `Ok(false)` without writing anything when no endpoint
        /// matches, so the caller can fall through to other handlers.
        pub async fn dispatch<W: Write>(path: &str, out: &mut W) -> io::Result<bool> {
            #unused_out
            match path {
                #(#arms)*
                _ => Ok(false),
            }
        }
    }
}

fn generate_arm(endpoint: &BoundEndpoint, module_root: &syn::Path) -> TokenStream {
    let path = &endpoint.descriptor.path;
    let binding = &endpoint.binding;

    let modules = binding.module_path.iter().map(|m| format_ident!("{}", m));
    let owner = format_ident!("{}", binding.owner);
    let method = format_ident!("{}", binding.method);
    let handler = quote!(#module_root #(:: #modules)* :: #owner);

    let call = if binding.has_receiver {
        quote!(#handler::default().#method())
    } else {
        quote!(#handler::#method())
    };
    let call = if endpoint.descriptor.is_async {
        quote!(#call.await)
    } else {
        call
    };

    let shape = &endpoint.descriptor.result_type;
    let encoder = encoder_ident(shape);
    let argument = if shape.is_counted() {
        quote!(&result)
    } else {
        quote!(result)
    };

    quote! {
        #path => {
            let result = #call;
            #encoder(out, #argument)?;
            Ok(true)
        }
    }
}

fn generate_wire_count() -> TokenStream {
    quote! {
        fn wire_count(len: usize) -> io::Result<i32> {
            i32::try_from(len).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("length {len} does not fit the 4-byte count"),
                )
            })
        }
    }
}

fn rust_type(kind: PrimitiveKind) -> TokenStream {
    match kind {
        PrimitiveKind::Bool => quote!(bool),
        PrimitiveKind::Int8 => quote!(i8),
        PrimitiveKind::Uint8 => quote!(u8),
        PrimitiveKind::Int16 => quote!(i16),
        PrimitiveKind::Uint16 => quote!(u16),
        PrimitiveKind::Int32 => quote!(i32),
        PrimitiveKind::Uint32 => quote!(u32),
        PrimitiveKind::Utf16Char => quote!(char),
        PrimitiveKind::Float32 => quote!(f32),
        PrimitiveKind::Float64 => quote!(f64),
        PrimitiveKind::Utf8String => quote!(str),
    }
}

/// Element type and generic parameters for a list whose elements have
/// `shape`, nested `depth` lists deep.
///
/// Strings become `S{depth}: AsRef<str>` and lists `L{depth}: AsRef<[..]>`;
/// fixed-width elements stay concrete.
fn element_generics(shape: &TypeDescriptor, depth: usize) -> (TokenStream, Vec<TokenStream>) {
    match shape {
        TypeDescriptor::Primitive(PrimitiveKind::Utf8String) => {
            let param = format_ident!("S{}", depth);
            (quote!(#param), vec![quote!(#param: AsRef<str>)])
        }
        TypeDescriptor::Primitive(kind) => (rust_type(*kind), Vec::new()),
        TypeDescriptor::ListOf(inner) => {
            let param = format_ident!("L{}", depth);
            let (inner_ty, inner_generics) = element_generics(inner, depth + 1);
            let mut generics = vec![quote!(#param: AsRef<[#inner_ty]>)];
            generics.extend(inner_generics);
            (quote!(#param), generics)
        }
    }
}

/// Writes one encoder function per shape.
struct EncoderEmitter;

impl ShapeVisitor for EncoderEmitter {
    type Output = TokenStream;

    fn primitive(&mut self, kind: PrimitiveKind) -> TokenStream {
        let name = encoder_ident(&TypeDescriptor::Primitive(kind));
        let ty = rust_type(kind);

        match kind {
            PrimitiveKind::Bool => quote! {
                /// Writes `bool` as one byte, `0` or `1`.
                pub fn #name<W: Write>(out: &mut W, value: bool) -> io::Result<()> {
                    out.write_all(&[u8::from(value)])
                }
            },
            PrimitiveKind::Utf16Char => quote! {
                /// Writes `char` as one little-endian UTF-16 code unit.
                ///
                /// Characters outside the Basic Multilingual Plane are rejected.
                pub fn #name<W: Write>(out: &mut W, value: char) -> io::Result<()> {
                    let unit = u16::try_from(u32::from(value)).map_err(|_| {
                        io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("{value:?} does not fit one UTF-16 code unit"),
                        )
                    })?;
                    out.write_all(&unit.to_le_bytes())
                }
            },
            PrimitiveKind::Utf8String => quote! {
                /// Writes a 4-byte little-endian count followed by the UTF-8 bytes.
                pub fn #name<W: Write>(out: &mut W, value: &str) -> io::Result<()> {
                    let bytes = value.as_bytes();
                    out.write_all(&wire_count(bytes.len())?.to_le_bytes())?;
                    out.write_all(bytes)
                }
            },
            _ => {
                let width = kind.fixed_width().unwrap_or_default();
                let doc = format!(" Writes `{ty}` as {width} little-endian bytes.");
                quote! {
                    #[doc = #doc]
                    pub fn #name<W: Write>(out: &mut W, value: #ty) -> io::Result<()> {
                        out.write_all(&value.to_le_bytes())
                    }
                }
            }
        }
    }

    fn list(&mut self, shape: &TypeDescriptor, element: &TypeDescriptor) -> TokenStream {
        let name = encoder_ident(shape);
        let element_encoder = encoder_ident(element);
        let (element_ty, generics) = element_generics(element, 0);
        let params = std::iter::once(quote!(W: Write)).chain(generics);

        let item = if element.is_counted() {
            quote!(item.as_ref())
        } else {
            quote!(*item)
        };
        let doc = format!(
            " Writes a 4-byte little-endian count followed by each element via `{element_encoder}`."
        );

        quote! {
            #[doc = #doc]
            pub fn #name<#(#params),*>(out: &mut W, items: &[#element_ty]) -> io::Result<()> {
                out.write_all(&wire_count(items.len())?.to_le_bytes())?;
                for item in items {
                    #element_encoder(out, #item)?;
                }
                Ok(())
            }
        }
    }
}
