//! Canonical result shapes.
//!
//! A [`TypeDescriptor`] is the structural key that drives code generation on
//! both sides of the wire. Equality and hashing are structural, so two
//! endpoints returning `Vec<String>` and `[String; 3]` share one key and get
//! one encoder and one decoder.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The closed set of scalar wire kinds.
///
/// The display form is the stem used to name generated functions
/// (`encode_int32`, `int32Decoder`).
///
/// ## Examples
///
/// ```
/// use caefte_define::PrimitiveKind;
///
/// assert_eq!(PrimitiveKind::Uint16.to_string(), "uint16");
/// assert_eq!(PrimitiveKind::Utf16Char.fixed_width(), Some(2));
/// assert_eq!(PrimitiveKind::Utf8String.fixed_width(), None);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PrimitiveKind {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    /// A single UTF-16 code unit.
    #[serde(rename = "char")]
    #[strum(serialize = "char")]
    Utf16Char,
    Float32,
    Float64,
    /// UTF-8 text, encoded as a counted byte blob.
    #[serde(rename = "string")]
    #[strum(serialize = "string")]
    Utf8String,
}

impl PrimitiveKind {
    /// Number of bytes the kind occupies on the wire, or `None` for the
    /// counted string kind.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::Int8 | PrimitiveKind::Uint8 => Some(1),
            PrimitiveKind::Int16 | PrimitiveKind::Uint16 | PrimitiveKind::Utf16Char => Some(2),
            PrimitiveKind::Int32 | PrimitiveKind::Uint32 | PrimitiveKind::Float32 => Some(4),
            PrimitiveKind::Float64 => Some(8),
            PrimitiveKind::Utf8String => None,
        }
    }
}

/// Structural description of a result type.
///
/// Only primitives and lists exist. There is no way to build a cycle, which
/// is how recursive result types are excluded.
///
/// ## Examples
///
/// ```
/// use caefte_define::{PrimitiveKind, TypeDescriptor};
///
/// let strings = TypeDescriptor::list_of(TypeDescriptor::Primitive(PrimitiveKind::Utf8String));
/// let nested = TypeDescriptor::list_of(strings.clone());
///
/// assert_eq!(nested.stem(), "list_of_list_of_string");
/// assert_eq!(nested.element(), Some(&strings));
/// assert_eq!(nested.depth(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    ListOf(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Wraps `element` in a list shape.
    pub fn list_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::ListOf(Box::new(element))
    }

    /// Snake-case name unique to this shape.
    pub fn stem(&self) -> String {
        match self {
            TypeDescriptor::Primitive(kind) => kind.to_string(),
            TypeDescriptor::ListOf(element) => format!("list_of_{}", element.stem()),
        }
    }

    /// Element shape of a list, `None` for primitives.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Primitive(_) => None,
            TypeDescriptor::ListOf(element) => Some(element),
        }
    }

    /// Number of list layers wrapped around the innermost primitive.
    pub fn depth(&self) -> usize {
        match self {
            TypeDescriptor::Primitive(_) => 0,
            TypeDescriptor::ListOf(element) => 1 + element.depth(),
        }
    }

    /// Whether the encoding starts with a 4-byte count (strings and lists).
    pub fn is_counted(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Primitive(PrimitiveKind::Utf8String) | TypeDescriptor::ListOf(_)
        )
    }
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(kind: PrimitiveKind) -> Self {
        TypeDescriptor::Primitive(kind)
    }
}
