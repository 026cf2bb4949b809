//! Artifact emitters.
//!
//! Both emitters walk the same ordered shape set through
//! [`crate::model::ShapeVisitor`]; they differ only in what they write per
//! shape.
//!
//! ## Submodules
//!
//! - [`server`] - Rust `dispatch` function and `encode_<stem>` encoders,
//!   built as a `proc_macro2::TokenStream`
//! - [`client`] - Elm module with call stubs and `Bytes.Decode` decoders,
//!   built as text
//! - [`naming`] - identifier and literal rules shared by both
//! - [`code_writer`] - indentation-tracking writer used for the Elm text
//!
//! The server tokens are validated with `syn::parse2` and formatted with
//! `prettyplease`; see [`crate::output`].

pub mod client;
pub mod code_writer;
pub mod naming;
pub mod server;

pub use client::render_client;
pub use server::assemble_server_module;
