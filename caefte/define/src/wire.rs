//! Reference implementation of the caefte wire format.
//!
//! The generated server and client modules carry their own copies of this
//! layout; this module is the executable statement of it, used to check
//! both sides against one another.
//!
//! | Kind | Layout |
//! |---|---|
//! | bool | 1 byte, `0x00`/`0x01` |
//! | int8 … uint32 | fixed width, little-endian |
//! | char | 2 bytes, little-endian UTF-16 code unit |
//! | float32 / float64 | IEEE-754 little-endian |
//! | string | 4-byte signed LE count, then UTF-8 bytes |
//! | list | 4-byte signed LE count, then each element in order |
//!
//! There are no tags and no header: the reader must already know the shape.

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::shape::{PrimitiveKind, TypeDescriptor};

/// Errors raised while encoding a value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A string or list is longer than a signed 32-bit count can express.
    #[error("sequence of {0} items does not fit a 32-bit count")]
    CountOverflow(usize),

    /// The value does not have the shape it was asked to be encoded as.
    #[error("value does not match shape '{expected}' (found {found})")]
    ShapeMismatch {
        /// Stem of the requested shape.
        expected: String,
        /// Name of the value variant that was supplied.
        found: &'static str,
    },
}

/// Errors raised while decoding bytes against a shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the shape was fully read.
    #[error("needed {needed} bytes but only {remaining} remain")]
    InsufficientBytes { needed: usize, remaining: usize },

    /// A string or list count was negative.
    #[error("malformed count {0}")]
    NegativeCount(i32),

    /// String bytes were not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
}

/// A value of some [`TypeDescriptor`] shape.
///
/// Closed over the wire kinds, so every encoder and decoder match is
/// exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Bool(bool),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    /// A UTF-16 code unit.
    Char(u16),
    Float32(f32),
    Float64(f64),
    String(String),
    List(Vec<WireValue>),
}

impl WireValue {
    /// Builds a [`WireValue::Char`] from a Rust `char`.
    ///
    /// Returns `None` for characters outside the Basic Multilingual Plane,
    /// which need two UTF-16 code units.
    ///
    /// ```
    /// use caefte_define::WireValue;
    ///
    /// assert_eq!(WireValue::from_char('é'), Some(WireValue::Char(0xE9)));
    /// assert_eq!(WireValue::from_char('🦀'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        u16::try_from(u32::from(c)).ok().map(WireValue::Char)
    }

    /// Variant name, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            WireValue::Bool(_) => "bool",
            WireValue::Int8(_) => "int8",
            WireValue::Uint8(_) => "uint8",
            WireValue::Int16(_) => "int16",
            WireValue::Uint16(_) => "uint16",
            WireValue::Int32(_) => "int32",
            WireValue::Uint32(_) => "uint32",
            WireValue::Char(_) => "char",
            WireValue::Float32(_) => "float32",
            WireValue::Float64(_) => "float64",
            WireValue::String(_) => "string",
            WireValue::List(_) => "list",
        }
    }

    /// Whether this value (recursively) has the given shape.
    ///
    /// An empty list conforms to every list shape.
    pub fn conforms_to(&self, shape: &TypeDescriptor) -> bool {
        match (self, shape) {
            (WireValue::List(items), TypeDescriptor::ListOf(element)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (WireValue::List(_), TypeDescriptor::Primitive(_)) => false,
            (_, TypeDescriptor::ListOf(_)) => false,
            (value, TypeDescriptor::Primitive(kind)) => value.primitive_kind() == Some(*kind),
        }
    }

    fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            WireValue::Bool(_) => PrimitiveKind::Bool,
            WireValue::Int8(_) => PrimitiveKind::Int8,
            WireValue::Uint8(_) => PrimitiveKind::Uint8,
            WireValue::Int16(_) => PrimitiveKind::Int16,
            WireValue::Uint16(_) => PrimitiveKind::Uint16,
            WireValue::Int32(_) => PrimitiveKind::Int32,
            WireValue::Uint32(_) => PrimitiveKind::Uint32,
            WireValue::Char(_) => PrimitiveKind::Utf16Char,
            WireValue::Float32(_) => PrimitiveKind::Float32,
            WireValue::Float64(_) => PrimitiveKind::Float64,
            WireValue::String(_) => PrimitiveKind::Utf8String,
            WireValue::List(_) => return None,
        })
    }
}

/// Encodes `value` into `out`.
///
/// ## Errors
///
/// Returns [`EncodeError::CountOverflow`] if a string or list has more than
/// `i32::MAX` items.
///
/// ## Examples
///
/// ```
/// use caefte_define::wire::{encode, WireValue};
///
/// let mut out = Vec::new();
/// encode(&WireValue::Int32(1), &mut out).unwrap();
/// assert_eq!(out, [1, 0, 0, 0]);
/// ```
pub fn encode<B: BufMut>(value: &WireValue, out: &mut B) -> Result<(), EncodeError> {
    match value {
        WireValue::Bool(v) => out.put_u8(u8::from(*v)),
        WireValue::Int8(v) => out.put_i8(*v),
        WireValue::Uint8(v) => out.put_u8(*v),
        WireValue::Int16(v) => out.put_i16_le(*v),
        WireValue::Uint16(v) => out.put_u16_le(*v),
        WireValue::Int32(v) => out.put_i32_le(*v),
        WireValue::Uint32(v) => out.put_u32_le(*v),
        WireValue::Char(v) => out.put_u16_le(*v),
        WireValue::Float32(v) => out.put_f32_le(*v),
        WireValue::Float64(v) => out.put_f64_le(*v),
        WireValue::String(v) => {
            let bytes = v.as_bytes();
            out.put_i32_le(wire_count(bytes.len())?);
            out.put_slice(bytes);
        }
        WireValue::List(items) => {
            out.put_i32_le(wire_count(items.len())?);
            for item in items {
                encode(item, out)?;
            }
        }
    }
    Ok(())
}

/// Encodes `value` after checking that it has the given shape.
///
/// ## Errors
///
/// Returns [`EncodeError::ShapeMismatch`] if the value does not conform,
/// otherwise the errors of [`encode`].
pub fn encode_as<B: BufMut>(
    shape: &TypeDescriptor,
    value: &WireValue,
    out: &mut B,
) -> Result<(), EncodeError> {
    if !value.conforms_to(shape) {
        return Err(EncodeError::ShapeMismatch {
            expected: shape.stem(),
            found: value.kind_name(),
        });
    }
    encode(value, out)
}

/// Decodes one value of the given shape from the front of `buf`.
///
/// Bytes after the value are left in the buffer, matching the generated
/// client which ignores trailing bytes.
///
/// ## Errors
///
/// - [`DecodeError::InsufficientBytes`] when the buffer runs out
/// - [`DecodeError::NegativeCount`] for a negative string or list count
/// - [`DecodeError::InvalidUtf8`] for malformed string payloads
///
/// ## Examples
///
/// ```
/// use caefte_define::{PrimitiveKind, TypeDescriptor};
/// use caefte_define::wire::{decode, WireValue};
///
/// let shape = TypeDescriptor::list_of(PrimitiveKind::Uint8.into());
/// let bytes = [2u8, 0, 0, 0, 7, 9];
///
/// let value = decode(&shape, &mut &bytes[..]).unwrap();
/// assert_eq!(value, WireValue::List(vec![WireValue::Uint8(7), WireValue::Uint8(9)]));
/// ```
pub fn decode<B: Buf>(shape: &TypeDescriptor, buf: &mut B) -> Result<WireValue, DecodeError> {
    match shape {
        TypeDescriptor::Primitive(kind) => decode_primitive(*kind, buf),
        TypeDescriptor::ListOf(element) => {
            let count = read_count(buf)?;
            let mut items = Vec::with_capacity(count.min(buf.remaining()));
            for _ in 0..count {
                items.push(decode(element, buf)?);
            }
            Ok(WireValue::List(items))
        }
    }
}

fn decode_primitive<B: Buf>(kind: PrimitiveKind, buf: &mut B) -> Result<WireValue, DecodeError> {
    if let Some(width) = kind.fixed_width() {
        need(buf, width)?;
    }
    Ok(match kind {
        PrimitiveKind::Bool => WireValue::Bool(buf.get_u8() != 0),
        PrimitiveKind::Int8 => WireValue::Int8(buf.get_i8()),
        PrimitiveKind::Uint8 => WireValue::Uint8(buf.get_u8()),
        PrimitiveKind::Int16 => WireValue::Int16(buf.get_i16_le()),
        PrimitiveKind::Uint16 => WireValue::Uint16(buf.get_u16_le()),
        PrimitiveKind::Int32 => WireValue::Int32(buf.get_i32_le()),
        PrimitiveKind::Uint32 => WireValue::Uint32(buf.get_u32_le()),
        PrimitiveKind::Utf16Char => WireValue::Char(buf.get_u16_le()),
        PrimitiveKind::Float32 => WireValue::Float32(buf.get_f32_le()),
        PrimitiveKind::Float64 => WireValue::Float64(buf.get_f64_le()),
        PrimitiveKind::Utf8String => {
            let len = read_count(buf)?;
            need(buf, len)?;
            let bytes = buf.copy_to_bytes(len);
            let text = std::str::from_utf8(&bytes).map_err(|_| DecodeError::InvalidUtf8)?;
            WireValue::String(text.to_owned())
        }
    })
}

fn read_count<B: Buf>(buf: &mut B) -> Result<usize, DecodeError> {
    need(buf, 4)?;
    let count = buf.get_i32_le();
    usize::try_from(count).map_err(|_| DecodeError::NegativeCount(count))
}

fn need<B: Buf>(buf: &B, needed: usize) -> Result<(), DecodeError> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(DecodeError::InsufficientBytes { needed, remaining });
    }
    Ok(())
}

fn wire_count(len: usize) -> Result<i32, EncodeError> {
    i32::try_from(len).map_err(|_| EncodeError::CountOverflow(len))
}
