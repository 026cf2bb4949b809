//! Identifier and literal rules shared by the emitters.

use caefte_define::{PrimitiveKind, TypeDescriptor};
use proc_macro2::Ident;
use quote::format_ident;

/// Reserved words of the client language.
pub const ELM_KEYWORDS: &[&str] = &[
    "alias", "as", "case", "else", "exposing", "if", "import", "in", "infix", "let", "module",
    "of", "port", "then", "type", "where",
];

/// Converts a snake_case or PascalCase name to lowerCamelCase.
///
/// Segments are split on `_`; the first keeps its case except for a lowered
/// first letter, later ones get an uppercase first letter.
///
/// ## Examples
///
/// ```
/// use caefte_gen::codegen::naming::lower_camel;
///
/// assert_eq!(lower_camel("async_rng"), "asyncRng");
/// assert_eq!(lower_camel("SlowerRng"), "slowerRng");
/// assert_eq!(lower_camel("list_of_list_of_string"), "listOfListOfString");
/// ```
pub fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (index, segment) in name.split('_').filter(|s| !s.is_empty()).enumerate() {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            if index == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Name of the client decoder for `shape`, e.g. `listOfStringDecoder`.
pub fn decoder_name(shape: &TypeDescriptor) -> String {
    format!("{}Decoder", lower_camel(&shape.stem()))
}

/// Name of the server encoder for `shape`, e.g. `encode_list_of_string`.
pub fn encoder_ident(shape: &TypeDescriptor) -> Ident {
    format_ident!("encode_{}", shape.stem())
}

/// Client type annotation for `shape`.
///
/// ```
/// use caefte_define::{PrimitiveKind, TypeDescriptor};
/// use caefte_gen::codegen::naming::elm_type;
///
/// let nested = TypeDescriptor::list_of(TypeDescriptor::list_of(PrimitiveKind::Int32.into()));
/// assert_eq!(elm_type(&nested), "List (List Int)");
/// ```
pub fn elm_type(shape: &TypeDescriptor) -> String {
    match shape {
        TypeDescriptor::Primitive(kind) => elm_primitive(*kind).to_string(),
        TypeDescriptor::ListOf(element) => {
            let inner = elm_type(element);
            if inner.contains(' ') {
                format!("List ({inner})")
            } else {
                format!("List {inner}")
            }
        }
    }
}

fn elm_primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Bool => "Bool",
        PrimitiveKind::Int8
        | PrimitiveKind::Uint8
        | PrimitiveKind::Int16
        | PrimitiveKind::Uint16
        | PrimitiveKind::Int32
        | PrimitiveKind::Uint32 => "Int",
        PrimitiveKind::Utf16Char => "Char",
        PrimitiveKind::Float32 | PrimitiveKind::Float64 => "Float",
        PrimitiveKind::Utf8String => "String",
    }
}

/// Quotes `value` as a client string literal.
///
/// ```
/// use caefte_gen::codegen::naming::elm_string_literal;
///
/// assert_eq!(elm_string_literal("/api/rng"), r#""/api/rng""#);
/// assert_eq!(elm_string_literal("a\"b\\c"), r#""a\"b\\c""#);
/// ```
pub fn elm_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:04X}}}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Why `name` cannot be a client value name, if it cannot.
pub fn elm_identifier_problem(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Some("it is empty"),
        Some(first) if !first.is_ascii_lowercase() => {
            return Some("it must start with a lowercase letter");
        }
        Some(_) => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some("it may only contain letters, digits and underscores");
    }
    if ELM_KEYWORDS.contains(&name) {
        return Some("it is a reserved word");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_camel_cases() {
        assert_eq!(lower_camel("rng"), "rng");
        assert_eq!(lower_camel("GetFiles"), "getFiles");
        assert_eq!(lower_camel("get_all_files"), "getAllFiles");
        assert_eq!(lower_camel("_private"), "private");
        assert_eq!(lower_camel("a__b"), "aB");
        assert_eq!(lower_camel(""), "");
    }

    #[test]
    fn decoder_and_encoder_names() {
        let shape = TypeDescriptor::list_of(PrimitiveKind::Utf16Char.into());
        assert_eq!(decoder_name(&shape), "listOfCharDecoder");
        assert_eq!(encoder_ident(&shape).to_string(), "encode_list_of_char");
        assert_eq!(
            decoder_name(&PrimitiveKind::Uint16.into()),
            "uint16Decoder"
        );
    }

    #[test]
    fn elm_types() {
        assert_eq!(elm_type(&PrimitiveKind::Uint8.into()), "Int");
        assert_eq!(elm_type(&PrimitiveKind::Float32.into()), "Float");
        assert_eq!(
            elm_type(&TypeDescriptor::list_of(PrimitiveKind::Utf8String.into())),
            "List String"
        );
    }

    #[test]
    fn escapes_control_characters() {
        assert_eq!(elm_string_literal("a\nb\u{1}"), "\"a\\nb\\u{0001}\"");
        assert_eq!(elm_string_literal("ü"), "\"ü\"");
    }

    #[test]
    fn identifier_problems() {
        assert_eq!(elm_identifier_problem("asyncRng"), None);
        assert!(elm_identifier_problem("").is_some());
        assert!(elm_identifier_problem("Rng").is_some());
        assert!(elm_identifier_problem("9lives").is_some());
        assert!(elm_identifier_problem("get-files").is_some());
        assert!(elm_identifier_problem("type").is_some());
    }
}
