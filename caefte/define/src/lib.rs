//! Caefte Definition Library
//!
//! Shared vocabulary for the caefte contract compiler. The generator
//! (`caefte-gen`) discovers endpoints in a service module and describes them
//! with these types; the server and client artifacts it emits agree on the
//! wire layout implemented by [`wire`].
//!
//! ## Core Types
//!
//! - [`Verb`] - HTTP verbs a route marker can declare (GET, POST)
//! - [`EndpointDescriptor`] - One route-marked method: path, verb, result shape
//! - [`PrimitiveKind`] - The closed set of scalar wire kinds
//! - [`TypeDescriptor`] - Canonical result shape (primitive or list)
//! - [`WireValue`] - A value of some shape, ready to encode
//!
//! ## Examples
//!
//! ```
//! use caefte_define::{EndpointDescriptor, PrimitiveKind, TypeDescriptor, Verb};
//!
//! let endpoint = EndpointDescriptor {
//!     path: "/api/rng".to_string(),
//!     verb: Verb::Get,
//!     is_async: false,
//!     exposed_name: "Rng".to_string(),
//!     result_type: TypeDescriptor::Primitive(PrimitiveKind::Int32),
//! };
//!
//! assert_eq!(endpoint.verb.to_string(), "GET");
//! assert_eq!(endpoint.result_type.stem(), "int32");
//! ```

pub mod prelude;
pub mod shape;
pub mod types;
pub mod wire;

pub use shape::{PrimitiveKind, TypeDescriptor};
pub use types::{EndpointDescriptor, Verb};
pub use wire::{DecodeError, EncodeError, WireValue};
