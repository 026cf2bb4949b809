//! Elm client module generation.
//!
//! Produces a single Elm module with one `Http.task` stub per endpoint, a
//! `responseToResult` resolver and one `Bytes.Decode` decoder per reachable
//! shape. Decoders read exactly the layout the server encoders write.
//!
//! ## Generated Code Example
//!
//! ```text
//! module Api exposing (rng)
//!
//! rng : (Int -> msg) -> Task Http.Error msg
//! rng toMsg =
//!     Http.task
//!         { method = "GET"
//!         , headers = []
//!         , url = "/api/rng"
//!         , body = Http.emptyBody
//!         , resolver = Http.bytesResolver <| responseToResult int32Decoder toMsg
//!         , timeout = Nothing
//!         }
//!
//! int32Decoder : Decoder Int
//! int32Decoder =
//!     Decode.signedInt32 Bytes.LE
//! ```

use caefte_define::{EndpointDescriptor, PrimitiveKind, TypeDescriptor};

use super::code_writer::CodeWriter;
use super::naming::{decoder_name, elm_string_literal, elm_type, lower_camel};
use crate::model::{ServiceModel, ShapeVisitor, visit_shapes};

/// Top-level names the client module defines besides stubs and decoders.
pub const RESERVED_CLIENT_NAMES: &[&str] = &["responseToResult", "listDecoder", "listDecoderStep"];

/// Names bound by arguments, patterns and lambdas in the generated code.
///
/// Elm rejects shadowing, so no top-level stub may take one of these.
pub const CLIENT_LOCAL_NAMES: &[&str] = &[
    "toMsg",
    "decoder",
    "response",
    "url",
    "metadata",
    "body",
    "value",
    "byte",
    "length",
    "count",
    "element",
    "remaining",
    "items",
    "item",
];

const GENERATED_NOTICE: &str =
    "-- This code was automatically generated by caefte-gen. Do not edit manually.";

const INDENT: usize = 4;

/// Client identifier of the stub for `endpoint`.
pub fn stub_name(endpoint: &EndpointDescriptor) -> String {
    lower_camel(&endpoint.exposed_name)
}

/// Renders the complete client module named `module_name`.
///
/// ## Examples
///
/// ```
/// use caefte_gen::codegen::client::render_client;
/// use caefte_gen::model::ServiceModel;
///
/// let empty = ServiceModel { endpoints: vec![], shapes: Default::default() };
/// let module = render_client(&empty, "Api");
///
/// assert!(module.starts_with("module Api exposing (responseToResult)\n"));
/// assert!(!module.contains("listDecoder"));
/// ```
pub fn render_client(model: &ServiceModel, module_name: &str) -> String {
    let mut stubs: Vec<(String, &EndpointDescriptor)> = model
        .endpoints
        .iter()
        .map(|endpoint| (stub_name(&endpoint.descriptor), &endpoint.descriptor))
        .collect();
    stubs.sort_by(|a, b| a.0.cmp(&b.0));

    let exposing = if stubs.is_empty() {
        "responseToResult".to_string()
    } else {
        stubs
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sections = vec![header(module_name, &exposing), response_to_result()];
    sections.extend(stubs.iter().map(|(name, endpoint)| call_stub(name, endpoint)));
    sections.extend(visit_shapes(&model.shapes, &mut DecoderEmitter));
    if model.has_lists() {
        sections.push(list_helpers());
    }

    sections.join("\n\n")
}

fn header(module_name: &str, exposing: &str) -> String {
    let mut w = CodeWriter::with_indent_spaces(INDENT);
    w.writeln_fmt(format_args!("module {module_name} exposing ({exposing})"));
    w.blank_line();
    w.writeln(GENERATED_NOTICE);
    w.blank_line();
    w.writeln("import Bytes exposing (Bytes)");
    w.writeln("import Bytes.Decode as Decode exposing (Decoder)");
    w.writeln("import Http");
    w.writeln("import Task exposing (Task)");
    w.finish()
}

fn response_to_result() -> String {
    let mut w = CodeWriter::with_indent_spaces(INDENT);
    w.writeln(
        "responseToResult : Decoder a -> (a -> msg) -> Http.Response Bytes -> Result Http.Error msg",
    );
    w.writeln("responseToResult decoder toMsg response =");
    w.indented(|w| {
        w.writeln("case response of");
        w.indented(|w| {
            let arms = [
                ("Http.BadUrl_ url ->", "Err (Http.BadUrl url)"),
                ("Http.Timeout_ ->", "Err Http.Timeout"),
                ("Http.NetworkError_ ->", "Err Http.NetworkError"),
                (
                    "Http.BadStatus_ metadata _ ->",
                    "Err (Http.BadStatus metadata.statusCode)",
                ),
            ];
            for (pattern, result) in arms {
                w.writeln(pattern);
                w.indented(|w| w.writeln(result));
                w.blank_line();
            }
            w.writeln("Http.GoodStatus_ _ body ->");
            w.indented(|w| {
                w.writeln("case Decode.decode decoder body of");
                w.indented(|w| {
                    w.writeln("Just value ->");
                    w.indented(|w| w.writeln("Ok (toMsg value)"));
                    w.blank_line();
                    w.writeln("Nothing ->");
                    w.indented(|w| w.writeln("Err (Http.BadBody \"Decoding failed\")"));
                });
            });
        });
    });
    w.finish()
}

fn call_stub(name: &str, endpoint: &EndpointDescriptor) -> String {
    let shape = &endpoint.result_type;
    let mut w = CodeWriter::with_indent_spaces(INDENT);
    w.writeln_fmt(format_args!(
        "{name} : ({} -> msg) -> Task Http.Error msg",
        elm_type(shape)
    ));
    w.writeln_fmt(format_args!("{name} toMsg ="));
    w.indented(|w| {
        w.writeln("Http.task");
        w.indented(|w| {
            w.writeln_fmt(format_args!(
                "{{ method = {}",
                elm_string_literal(&endpoint.verb.to_string())
            ));
            w.writeln(", headers = []");
            w.writeln_fmt(format_args!(", url = {}", elm_string_literal(&endpoint.path)));
            w.writeln(", body = Http.emptyBody");
            w.writeln_fmt(format_args!(
                ", resolver = Http.bytesResolver <| responseToResult {} toMsg",
                decoder_name(shape)
            ));
            w.writeln(", timeout = Nothing");
            w.writeln("}");
        });
    });
    w.finish()
}

/// Writes one decoder definition per shape.
struct DecoderEmitter;

impl DecoderEmitter {
    fn definition(shape: &TypeDescriptor, body: impl FnOnce(&mut CodeWriter)) -> String {
        let name = decoder_name(shape);
        let ty = elm_type(shape);
        let mut w = CodeWriter::with_indent_spaces(INDENT);
        if ty.contains(' ') {
            w.writeln_fmt(format_args!("{name} : Decoder ({ty})"));
        } else {
            w.writeln_fmt(format_args!("{name} : Decoder {ty}"));
        }
        w.writeln_fmt(format_args!("{name} ="));
        w.indented(body);
        w.finish()
    }
}

impl ShapeVisitor for DecoderEmitter {
    type Output = String;

    fn primitive(&mut self, kind: PrimitiveKind) -> String {
        let shape = TypeDescriptor::Primitive(kind);
        Self::definition(&shape, |w| match kind {
            PrimitiveKind::Bool => {
                w.writeln("Decode.unsignedInt8");
                w.indented(|w| w.writeln("|> Decode.map (\\byte -> byte /= 0)"));
            }
            PrimitiveKind::Int8 => w.writeln("Decode.signedInt8"),
            PrimitiveKind::Uint8 => w.writeln("Decode.unsignedInt8"),
            PrimitiveKind::Int16 => w.writeln("Decode.signedInt16 Bytes.LE"),
            PrimitiveKind::Uint16 => w.writeln("Decode.unsignedInt16 Bytes.LE"),
            PrimitiveKind::Int32 => w.writeln("Decode.signedInt32 Bytes.LE"),
            PrimitiveKind::Uint32 => w.writeln("Decode.unsignedInt32 Bytes.LE"),
            PrimitiveKind::Utf16Char => {
                w.writeln("Decode.unsignedInt16 Bytes.LE");
                w.indented(|w| w.writeln("|> Decode.map Char.fromCode"));
            }
            PrimitiveKind::Float32 => w.writeln("Decode.float32 Bytes.LE"),
            PrimitiveKind::Float64 => w.writeln("Decode.float64 Bytes.LE"),
            PrimitiveKind::Utf8String => counted(w, "length", "Decode.string length"),
        })
    }

    fn list(&mut self, shape: &TypeDescriptor, element: &TypeDescriptor) -> String {
        Self::definition(shape, |w| {
            w.writeln_fmt(format_args!("listDecoder {}", decoder_name(element)));
        })
    }
}

/// Reads a signed 4-byte count, failing on negatives, then runs `then`.
fn counted(w: &mut CodeWriter, count: &str, then: &str) {
    w.writeln("Decode.signedInt32 Bytes.LE");
    w.indented(|w| {
        w.writeln("|> Decode.andThen");
        w.indented(|w| {
            w.writeln_fmt(format_args!("(\\{count} ->"));
            w.indented(|w| {
                w.writeln_fmt(format_args!("if {count} < 0 then"));
                w.indented(|w| w.writeln("Decode.fail"));
                w.blank_line();
                w.writeln("else");
                w.indented(|w| w.writeln(then));
            });
            w.writeln(")");
        });
    });
}

fn list_helpers() -> String {
    let mut w = CodeWriter::with_indent_spaces(INDENT);
    w.writeln("listDecoder : Decoder a -> Decoder (List a)");
    w.writeln("listDecoder element =");
    w.indented(|w| {
        counted(
            w,
            "count",
            "Decode.loop ( count, [] ) (listDecoderStep element)",
        )
    });
    w.blank_line();
    w.blank_line();
    w.writeln(
        "listDecoderStep : Decoder a -> ( Int, List a ) -> Decoder (Decode.Step ( Int, List a ) (List a))",
    );
    w.writeln("listDecoderStep element ( remaining, items ) =");
    w.indented(|w| {
        w.writeln("if remaining <= 0 then");
        w.indented(|w| w.writeln("Decode.succeed (Decode.Done (List.reverse items))"));
        w.blank_line();
        w.writeln("else");
        w.indented(|w| {
            w.writeln("Decode.map (\\item -> Decode.Loop ( remaining - 1, item :: items )) element")
        });
    });
    w.finish()
}
