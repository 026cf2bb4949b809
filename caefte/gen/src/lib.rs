//! caefte contract compiler library.
//!
//! Reads a Rust service module, finds the methods carrying route markers
//! (`#[get("/path")]`, `#[post("/path")]`), maps their result types onto a
//! small set of wire shapes and emits one of two artifacts that agree on the
//! byte layout:
//!
//! - a Rust server module with an async `dispatch(path, out)` function and
//!   one binary encoder per shape
//! - an Elm client module with one `Http.task` call stub per endpoint and one
//!   `Bytes.Decode` decoder per shape
//!
//! ## Modules
//!
//! - [`config`] - Generator options and their defaults
//! - [`introspect`] - Route-marker discovery with `syn`
//! - [`model`] - Type mapping, reachable shapes and the shared shape traversal
//! - [`validation`] - Client-name and route checks before emission
//! - [`codegen`] - The server and client emitters
//! - [`output`] - Pipeline entry point, validation, formatting and writing
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use caefte_gen::config::GeneratorConfig;
//! use caefte_gen::output::generate_and_write;
//!
//! let config = GeneratorConfig::default();
//!
//! // Server side: the extension picks the artifact.
//! generate_and_write(Path::new("src/controllers.rs"), Path::new("src/api.rs"), &config, false)
//!     .unwrap();
//!
//! // Client side.
//! generate_and_write(Path::new("src/controllers.rs"), Path::new("client/Api.elm"), &config, false)
//!     .unwrap();
//! ```
//!
//! ## Supported Result Types
//!
//! | Rust | Shape | Elm |
//! |---|---|---|
//! | `bool` | `bool` | `Bool` |
//! | `i8` `u8` `i16` `u16` `i32` `u32` | `int8` .. `uint32` | `Int` |
//! | `char` (BMP only) | `char` | `Char` |
//! | `f32` `f64` | `float32` `float64` | `Float` |
//! | `String`, `&'static str` | `string` | `String` |
//! | `Vec<T>`, `[T; N]`, `Box<[T]>`, `&'static [T]` | `list_of_<T>` | `List T` |
//!
//! Anything else aborts generation with
//! [`GeneratorError::UnsupportedType`](errors::GeneratorError::UnsupportedType).

pub mod codegen;
pub mod config;
pub mod errors;
pub mod introspect;
pub mod model;
pub mod output;
pub mod validation;

pub use config::GeneratorConfig;
pub use errors::GeneratorError;
pub use model::{ServiceModel, ShapeVisitor};
pub use output::{ArtifactKind, generate_and_write};
