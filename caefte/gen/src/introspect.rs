//! Route-marker discovery in a service module.
//!
//! The service module is a Rust source file. Endpoint methods are `pub`
//! methods in inherent `impl` blocks of `pub` types, carrying a route marker
//! attribute:
//!
//! ```ignore
//! #[derive(Default)]
//! pub struct ExampleController;
//!
//! impl ExampleController {
//!     #[get("/api/async_rng", api_name = "SlowerRng")]
//!     pub async fn async_rng(&self) -> i32 { 4 }
//!
//!     #[post(path = "/api/files")]
//!     pub fn files() -> Vec<String> { vec![] }
//! }
//! ```
//!
//! Markers are recognized by the last segment of the attribute path only, so
//! `#[get(..)]` and `#[routes::get(..)]` are the same marker no matter which
//! crate defines them. Nothing is resolved or executed.

use syn::punctuated::Punctuated;
use syn::{
    Attribute, Expr, ExprLit, GenericArgument, ImplItem, ImplItemFn, Item, ItemImpl, Lit, Meta,
    PathArguments, ReturnType, Token, Type, TypeParamBound, Visibility,
};
use tracing::debug;

use caefte_define::Verb;

use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;

/// How the generated dispatcher reaches a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerBinding {
    /// `pub mod` names between the service root and the owning type.
    pub module_path: Vec<String>,
    /// Name of the type whose `impl` block holds the method.
    pub owner: String,
    /// Method name.
    pub method: String,
    /// Whether the method takes `self`; the dispatcher then calls it on
    /// `Owner::default()`.
    pub has_receiver: bool,
}

impl HandlerBinding {
    /// `Owner::method`, used in diagnostics.
    pub fn display_name(&self) -> String {
        format!("{}::{}", self.owner, self.method)
    }
}

/// A route-marked method as written in the source.
#[derive(Debug, Clone)]
pub struct DiscoveredEndpoint {
    pub verb: Verb,
    pub path: String,
    /// `api_name` marker argument, if given.
    pub api_name: Option<String>,
    pub is_async: bool,
    /// Result type with any async wrapper removed.
    pub result_type: Type,
    pub binding: HandlerBinding,
}

impl DiscoveredEndpoint {
    /// The client binding name: `api_name` when set and non-empty, otherwise
    /// the method name.
    pub fn exposed_name(&self) -> &str {
        match self.api_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.binding.method,
        }
    }
}

/// Arguments read from a route marker.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MarkerArgs {
    path: String,
    api_name: Option<String>,
}

/// Parses `source` and returns every endpoint in declaration order.
///
/// `origin` names the source in parse errors.
///
/// ## Errors
///
/// - `GeneratorError::ParseError` if the source is not valid Rust
/// - `GeneratorError::UnsupportedSignature` if a marked method needs
///   arguments or generic parameters
///
/// ## Examples
///
/// ```
/// use caefte_gen::config::GeneratorConfig;
/// use caefte_gen::introspect::introspect_source;
///
/// let source = r#"
///     #[derive(Default)]
///     pub struct Service;
///
///     impl Service {
///         #[get("/api/rng")]
///         pub fn rng(&self) -> i32 { 4 }
///     }
/// "#;
///
/// let endpoints = introspect_source(source, "service.rs", &GeneratorConfig::default()).unwrap();
/// assert_eq!(endpoints.len(), 1);
/// assert_eq!(endpoints[0].path, "/api/rng");
/// assert_eq!(endpoints[0].exposed_name(), "rng");
/// ```
pub fn introspect_source(
    source: &str,
    origin: &str,
    config: &GeneratorConfig,
) -> Result<Vec<DiscoveredEndpoint>, GeneratorError> {
    let file = syn::parse_file(source).map_err(|source| GeneratorError::ParseError {
        path: origin.to_string(),
        source,
    })?;
    introspect_file(&file, config)
}

/// Walks an already parsed file. See [`introspect_source`].
///
/// ## Errors
///
/// Returns `GeneratorError::UnsupportedSignature` for marked methods the
/// dispatcher cannot call.
pub fn introspect_file(
    file: &syn::File,
    config: &GeneratorConfig,
) -> Result<Vec<DiscoveredEndpoint>, GeneratorError> {
    let mut found = Vec::new();
    let mut module_path = Vec::new();
    walk_items(&file.items, &mut module_path, config, &mut found)?;
    Ok(found)
}

fn walk_items(
    items: &[Item],
    module_path: &mut Vec<String>,
    config: &GeneratorConfig,
    found: &mut Vec<DiscoveredEndpoint>,
) -> Result<(), GeneratorError> {
    let exported: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Item::Struct(s) if is_public(&s.vis) => Some(s.ident.to_string()),
            Item::Enum(e) if is_public(&e.vis) => Some(e.ident.to_string()),
            _ => None,
        })
        .collect();

    for item in items {
        match item {
            Item::Impl(item_impl) => {
                if let Some(owner) = inherent_owner(item_impl)
                    && exported.contains(&owner)
                {
                    scan_impl(item_impl, owner, module_path, config, found)?;
                }
            }
            Item::Mod(module) if is_public(&module.vis) => {
                if let Some((_, inner)) = &module.content {
                    module_path.push(module.ident.to_string());
                    walk_items(inner, module_path, config, found)?;
                    module_path.pop();
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Name of the type an inherent, non-generic `impl` block is for.
fn inherent_owner(item_impl: &ItemImpl) -> Option<String> {
    if item_impl.trait_.is_some() || !item_impl.generics.params.is_empty() {
        return None;
    }
    match &*item_impl.self_ty {
        Type::Path(type_path) if type_path.qself.is_none() => {
            if type_path.path.segments.len() != 1 {
                return None;
            }
            let segment = type_path.path.segments.first()?;
            segment
                .arguments
                .is_none()
                .then(|| segment.ident.to_string())
        }
        _ => None,
    }
}

fn scan_impl(
    item_impl: &ItemImpl,
    owner: String,
    module_path: &[String],
    config: &GeneratorConfig,
    found: &mut Vec<DiscoveredEndpoint>,
) -> Result<(), GeneratorError> {
    for item in &item_impl.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        if !is_public(&method.vis) {
            continue;
        }

        for attr in &method.attrs {
            let Some(verb) = marker_name(attr).and_then(|name| config.marker_verb(&name)) else {
                continue;
            };

            let Some(args) = parse_marker_args(attr) else {
                debug!(
                    method = %format!("{}::{}", owner, method.sig.ident),
                    "skipping {} marker without a readable string path", verb
                );
                continue;
            };

            let binding = HandlerBinding {
                module_path: module_path.to_vec(),
                owner: owner.clone(),
                method: method.sig.ident.to_string(),
                has_receiver: method.sig.receiver().is_some(),
            };
            check_signature(method, &binding)?;

            let (is_async, result_type) = result_type(method);
            debug!(
                route = %format!("{} {}", verb, args.path),
                handler = %binding.display_name(),
                is_async,
                "discovered endpoint"
            );

            found.push(DiscoveredEndpoint {
                verb,
                path: args.path,
                api_name: args.api_name,
                is_async,
                result_type,
                binding,
            });
        }
    }
    Ok(())
}

fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

fn marker_name(attr: &Attribute) -> Option<String> {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
}

/// Reads `Path` and `ApiName` from a marker.
///
/// Returns `None` when the marker cannot be read: no arguments, unparseable
/// arguments, a path that is not a string literal, or an `api_name` that is
/// not a string literal.
fn parse_marker_args(attr: &Attribute) -> Option<MarkerArgs> {
    match &attr.meta {
        Meta::List(list) => {
            let args = list
                .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)
                .ok()?;

            let mut path = None;
            let mut api_name = None;
            for (index, arg) in args.iter().enumerate() {
                match arg {
                    Expr::Assign(assign) => match assigned_key(&assign.left)?.as_str() {
                        "path" => path = Some(string_literal(&assign.right)?),
                        "api_name" => api_name = Some(string_literal(&assign.right)?),
                        _ => {}
                    },
                    positional if index == 0 => path = string_literal(positional),
                    _ => {}
                }
            }

            Some(MarkerArgs {
                path: path?,
                api_name,
            })
        }
        Meta::NameValue(name_value) => Some(MarkerArgs {
            path: string_literal(&name_value.value)?,
            api_name: None,
        }),
        Meta::Path(_) => None,
    }
}

fn assigned_key(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Path(expr_path) => expr_path.path.get_ident().map(ToString::to_string),
        _ => None,
    }
}

fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(value),
            ..
        }) => Some(value.value()),
        Expr::Group(group) => string_literal(&group.expr),
        _ => None,
    }
}

fn check_signature(method: &ImplItemFn, binding: &HandlerBinding) -> Result<(), GeneratorError> {
    if !method.sig.generics.params.is_empty() {
        return Err(GeneratorError::UnsupportedSignature {
            method: binding.display_name(),
            reason: "endpoint methods cannot have generic parameters".to_string(),
        });
    }

    let arguments = method.sig.inputs.len() - usize::from(binding.has_receiver);
    if arguments > 0 {
        return Err(GeneratorError::UnsupportedSignature {
            method: binding.display_name(),
            reason: format!("endpoint methods take no request arguments, found {arguments}"),
        });
    }

    Ok(())
}

/// Splits a method's declared return into `(is_async, result type)`.
///
/// `async fn` and `impl Future<Output = T>` are both asynchronous; a missing
/// return type is the unit type.
fn result_type(method: &ImplItemFn) -> (bool, Type) {
    let declared: Type = match &method.sig.output {
        ReturnType::Default => syn::parse_quote!(()),
        ReturnType::Type(_, ty) => (**ty).clone(),
    };

    if method.sig.asyncness.is_some() {
        return (true, declared);
    }
    match future_output(&declared) {
        Some(inner) => (true, inner),
        None => (false, declared),
    }
}

/// `T` for `impl Future<Output = T>`.
fn future_output(ty: &Type) -> Option<Type> {
    let Type::ImplTrait(impl_trait) = ty else {
        return None;
    };
    impl_trait.bounds.iter().find_map(|bound| {
        let TypeParamBound::Trait(trait_bound) = bound else {
            return None;
        };
        let segment = trait_bound.path.segments.last()?;
        if segment.ident != "Future" {
            return None;
        }
        let PathArguments::AngleBracketed(args) = &segment.arguments else {
            return None;
        };
        args.args.iter().find_map(|arg| match arg {
            GenericArgument::AssocType(assoc) if assoc.ident == "Output" => Some(assoc.ty.clone()),
            _ => None,
        })
    })
}
