//! Type model: maps Rust result types onto canonical shapes.
//!
//! [`build_model`] turns discovered endpoints into a [`ServiceModel`]: the
//! endpoints in declaration order, each with its [`TypeDescriptor`], plus the
//! ordered set of shapes reachable from them. Emitters walk that set through
//! a [`ShapeVisitor`], so both artifacts see the same shapes in the same
//! order.

use indexmap::IndexSet;
use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type, TypePath};
use tracing::debug;

use caefte_define::{EndpointDescriptor, PrimitiveKind, TypeDescriptor};

use crate::errors::GeneratorError;
use crate::introspect::{DiscoveredEndpoint, HandlerBinding};

/// An endpoint together with the handler the dispatcher calls for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundEndpoint {
    pub descriptor: EndpointDescriptor,
    pub binding: HandlerBinding,
}

/// Everything the emitters need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceModel {
    /// Endpoints in declaration order.
    pub endpoints: Vec<BoundEndpoint>,
    /// Distinct shapes reachable from the endpoints, in first-discovery order.
    pub shapes: IndexSet<TypeDescriptor>,
}

impl ServiceModel {
    /// Whether any list shape is reachable.
    pub fn has_lists(&self) -> bool {
        self.shapes
            .iter()
            .any(|shape| matches!(shape, TypeDescriptor::ListOf(_)))
    }

    /// Whether any shape starts with a 4-byte count.
    pub fn has_counted_shapes(&self) -> bool {
        self.shapes.iter().any(TypeDescriptor::is_counted)
    }
}

/// One emission strategy over the reachable shapes.
///
/// Each emitter implements this once; [`visit_shapes`] drives it so the
/// server and client walk the shape set identically.
pub trait ShapeVisitor {
    type Output;

    /// Called for a primitive shape.
    fn primitive(&mut self, kind: PrimitiveKind) -> Self::Output;

    /// Called for a list shape; `element` is the list's element shape.
    fn list(&mut self, shape: &TypeDescriptor, element: &TypeDescriptor) -> Self::Output;
}

/// Feeds every shape to `visitor`, in iteration order.
pub fn visit_shapes<'a, V, I>(shapes: I, visitor: &mut V) -> Vec<V::Output>
where
    V: ShapeVisitor,
    I: IntoIterator<Item = &'a TypeDescriptor>,
{
    shapes
        .into_iter()
        .map(|shape| match shape {
            TypeDescriptor::Primitive(kind) => visitor.primitive(*kind),
            TypeDescriptor::ListOf(element) => visitor.list(shape, element),
        })
        .collect()
}

/// Collects the distinct shapes reachable from `roots`.
///
/// Roots are walked in order, each container before its element; the first
/// occurrence of a shape fixes its position.
///
/// ## Examples
///
/// ```
/// use caefte_define::{PrimitiveKind, TypeDescriptor};
/// use caefte_gen::model::reachable_shapes;
///
/// let strings = TypeDescriptor::list_of(PrimitiveKind::Utf8String.into());
/// let int = TypeDescriptor::Primitive(PrimitiveKind::Int32);
///
/// let shapes = reachable_shapes([&int, &strings, &strings]);
/// let stems: Vec<String> = shapes.iter().map(TypeDescriptor::stem).collect();
/// assert_eq!(stems, ["int32", "list_of_string", "string"]);
/// ```
pub fn reachable_shapes<'a, I>(roots: I) -> IndexSet<TypeDescriptor>
where
    I: IntoIterator<Item = &'a TypeDescriptor>,
{
    let mut shapes = IndexSet::new();
    for root in roots {
        let mut current = Some(root);
        while let Some(shape) = current {
            // Everything below a known shape is already known.
            if !shapes.insert(shape.clone()) {
                break;
            }
            current = shape.element();
        }
    }
    shapes
}

/// Builds the service model from discovered endpoints.
///
/// ## Errors
///
/// Returns `GeneratorError::UnsupportedType` for the first result type that
/// is not a primitive or list. Generation cannot continue past it.
pub fn build_model(discovered: Vec<DiscoveredEndpoint>) -> Result<ServiceModel, GeneratorError> {
    let mut endpoints = Vec::with_capacity(discovered.len());

    for endpoint in discovered {
        let result_type = describe_type(&endpoint.result_type).map_err(|offending| {
            GeneratorError::UnsupportedType {
                type_name: render_type(offending),
                method: endpoint.binding.display_name(),
            }
        })?;

        let descriptor = EndpointDescriptor {
            exposed_name: endpoint.exposed_name().to_string(),
            path: endpoint.path,
            verb: endpoint.verb,
            is_async: endpoint.is_async,
            result_type,
        };
        endpoints.push(BoundEndpoint {
            descriptor,
            binding: endpoint.binding,
        });
    }

    let shapes = reachable_shapes(endpoints.iter().map(|e| &e.descriptor.result_type));
    debug!(
        endpoints = endpoints.len(),
        shapes = shapes.len(),
        "built type model"
    );

    Ok(ServiceModel { endpoints, shapes })
}

/// Maps a Rust type onto its shape.
///
/// On failure returns the innermost type that has no shape, so
/// `Vec<Tree>` reports `Tree`.
///
/// ## Examples
///
/// ```
/// use caefte_define::{PrimitiveKind, TypeDescriptor};
/// use caefte_gen::model::describe_type;
///
/// let ty: syn::Type = syn::parse_quote!(Vec<[String; 2]>);
/// assert_eq!(
///     describe_type(&ty).unwrap(),
///     TypeDescriptor::list_of(TypeDescriptor::list_of(PrimitiveKind::Utf8String.into()))
/// );
///
/// let ty: syn::Type = syn::parse_quote!(Vec<Option<u8>>);
/// assert!(describe_type(&ty).is_err());
/// ```
pub fn describe_type(ty: &Type) -> Result<TypeDescriptor, &Type> {
    match ty {
        Type::Paren(paren) => describe_type(&paren.elem),
        Type::Group(group) => describe_type(&group.elem),
        Type::Array(array) => Ok(TypeDescriptor::list_of(describe_type(&array.elem)?)),
        Type::Reference(reference)
            if reference.mutability.is_none()
                && reference
                    .lifetime
                    .as_ref()
                    .is_some_and(|lifetime| lifetime.ident == "static") =>
        {
            match &*reference.elem {
                Type::Path(path) if is_plain(path, &[], "str") => {
                    Ok(PrimitiveKind::Utf8String.into())
                }
                Type::Slice(slice) => Ok(TypeDescriptor::list_of(describe_type(&slice.elem)?)),
                _ => Err(ty),
            }
        }
        Type::Path(path) if path.qself.is_none() => describe_path(ty, path),
        _ => Err(ty),
    }
}

const PRIMITIVE_PREFIXES: &[&[&str]] = &[&[], &["core", "primitive"], &["std", "primitive"]];
const STRING_PREFIXES: &[&[&str]] = &[&[], &["std", "string"], &["alloc", "string"]];
const VEC_PREFIXES: &[&[&str]] = &[&[], &["std", "vec"], &["alloc", "vec"]];
const BOX_PREFIXES: &[&[&str]] = &[&[], &["std", "boxed"], &["alloc", "boxed"]];

fn describe_path<'a>(ty: &'a Type, path: &'a TypePath) -> Result<TypeDescriptor, &'a Type> {
    if let Some(kind) = primitive_kind(path) {
        return Ok(kind.into());
    }

    if let Some(element) = single_type_argument(path, VEC_PREFIXES, "Vec") {
        return Ok(TypeDescriptor::list_of(describe_type(element)?));
    }

    if let Some(Type::Slice(slice)) = single_type_argument(path, BOX_PREFIXES, "Box") {
        return Ok(TypeDescriptor::list_of(describe_type(&slice.elem)?));
    }

    Err(ty)
}

fn primitive_kind(path: &TypePath) -> Option<PrimitiveKind> {
    if STRING_PREFIXES
        .iter()
        .any(|prefix| is_plain(path, prefix, "String"))
    {
        return Some(PrimitiveKind::Utf8String);
    }

    let name = path.path.segments.last()?.ident.to_string();
    let kind = match name.as_str() {
        "bool" => PrimitiveKind::Bool,
        "i8" => PrimitiveKind::Int8,
        "u8" => PrimitiveKind::Uint8,
        "i16" => PrimitiveKind::Int16,
        "u16" => PrimitiveKind::Uint16,
        "i32" => PrimitiveKind::Int32,
        "u32" => PrimitiveKind::Uint32,
        "char" => PrimitiveKind::Utf16Char,
        "f32" => PrimitiveKind::Float32,
        "f64" => PrimitiveKind::Float64,
        _ => return None,
    };
    PRIMITIVE_PREFIXES
        .iter()
        .any(|prefix| is_plain(path, prefix, &name))
        .then_some(kind)
}

/// Whether `path` is exactly `prefix::name` with no generic arguments.
fn is_plain(path: &TypePath, prefix: &[&str], name: &str) -> bool {
    path.qself.is_none()
        && path.path.segments.len() == prefix.len() + 1
        && path
            .path
            .segments
            .iter()
            .zip(prefix.iter().chain(std::iter::once(&name)))
            .all(|(segment, expected)| segment.ident == expected && segment.arguments.is_none())
}

/// The single type argument of `prefix::name<T>`.
fn single_type_argument<'a>(
    path: &'a TypePath,
    prefixes: &[&[&str]],
    name: &str,
) -> Option<&'a Type> {
    let segments = &path.path.segments;
    let last = segments.last()?;
    if last.ident != name {
        return None;
    }

    let prefix: Vec<String> = segments
        .iter()
        .take(segments.len() - 1)
        .map(|segment| segment.ident.to_string())
        .collect();
    let prefix_ok = prefixes.iter().any(|expected| {
        expected.len() == prefix.len() && expected.iter().zip(&prefix).all(|(a, b)| a == b)
    });
    if !prefix_ok {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    let mut types = args.args.iter().filter_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });
    match (types.next(), types.next(), args.args.len()) {
        (Some(ty), None, 1) => Some(ty),
        _ => None,
    }
}

/// Renders a type as written, without the token spacing `quote` inserts.
pub fn render_type(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("& ", "&")
}
