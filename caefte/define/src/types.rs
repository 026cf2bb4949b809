//! Core endpoint types.
//!
//! - [`Verb`] - HTTP verb declared by a route marker
//! - [`EndpointDescriptor`] - Metadata extracted for one route-marked method

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::shape::TypeDescriptor;

/// HTTP verbs a route marker can declare.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use caefte_define::Verb;
///
/// assert_eq!(Verb::from_str("POST").unwrap(), Verb::Post);
/// assert_eq!(Verb::Get.to_string(), "GET");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verb {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
}

/// One endpoint discovered in a service module.
///
/// Created once per generator run and never mutated afterwards. The
/// `(verb, path)` pair is expected to be unique within a module, and
/// `exposed_name` names the client binding generated for it.
///
/// ## Examples
///
/// ```
/// use caefte_define::{EndpointDescriptor, PrimitiveKind, TypeDescriptor, Verb};
///
/// let endpoint = EndpointDescriptor {
///     path: "/api/files".to_string(),
///     verb: Verb::Get,
///     is_async: true,
///     exposed_name: "files".to_string(),
///     result_type: TypeDescriptor::list_of(TypeDescriptor::Primitive(PrimitiveKind::Utf8String)),
/// };
///
/// assert!(endpoint.is_async);
/// assert_eq!(endpoint.route(), "GET /api/files");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Literal request path matched by the dispatcher (no parameters).
    pub path: String,
    /// HTTP verb used by the client stub.
    pub verb: Verb,
    /// Whether the handler must be awaited before its result is encoded.
    pub is_async: bool,
    /// Name of the generated client binding.
    pub exposed_name: String,
    /// Shape of the handler's result.
    pub result_type: TypeDescriptor,
}

impl EndpointDescriptor {
    /// Returns `"VERB /path"`, used in diagnostics.
    pub fn route(&self) -> String {
        format!("{} {}", self.verb, self.path)
    }
}
