//! Convenient re-exports for working with caefte definitions.
//!
//! ## Examples
//!
//! ```
//! use caefte_define::prelude::*;
//!
//! let shape = TypeDescriptor::list_of(TypeDescriptor::Primitive(PrimitiveKind::Utf8String));
//! let mut bytes = Vec::new();
//! encode(&WireValue::List(vec![WireValue::String("hi".into())]), &mut bytes).unwrap();
//!
//! let decoded = decode(&shape, &mut bytes.as_slice()).unwrap();
//! assert_eq!(decoded, WireValue::List(vec![WireValue::String("hi".into())]));
//! ```

pub use crate::shape::{PrimitiveKind, TypeDescriptor};
pub use crate::types::{EndpointDescriptor, Verb};
pub use crate::wire::{DecodeError, EncodeError, WireValue, decode, encode};
