//! Pre-emission checks on the service model.
//!
//! ## Validation Checks
//!
//! - **Client bindings**: every exposed name must become a distinct, legal
//!   client identifier that does not clash with generated helpers or with
//!   the local names the generated client binds
//! - **Routes**: duplicate paths and paths without a leading `/` are
//!   reported as warnings; the dispatcher matches the first declared arm

use std::collections::HashMap;

use tracing::warn;

use crate::codegen::client::{CLIENT_LOCAL_NAMES, RESERVED_CLIENT_NAMES, stub_name};
use crate::codegen::naming::{decoder_name, elm_identifier_problem};
use crate::errors::GeneratorError;
use crate::model::ServiceModel;

/// Validates a service model before any artifact is emitted.
///
/// ## Errors
///
/// - `GeneratorError::InvalidExposedName` if a client identifier is illegal
///   or collides with a generated helper or local binding
/// - `GeneratorError::DuplicateExposedName` if two endpoints produce the
///   same client identifier
pub fn validate_model(model: &ServiceModel) -> Result<(), GeneratorError> {
    let generated: Vec<String> = RESERVED_CLIENT_NAMES
        .iter()
        .map(|name| name.to_string())
        .chain(model.shapes.iter().map(decoder_name))
        .collect();

    let mut bindings: HashMap<String, String> = HashMap::new();
    let mut paths: HashMap<&str, String> = HashMap::new();

    for endpoint in &model.endpoints {
        let descriptor = &endpoint.descriptor;
        let route = descriptor.route();
        let identifier = stub_name(descriptor);

        if let Some(reason) = elm_identifier_problem(&identifier) {
            return Err(GeneratorError::InvalidExposedName {
                name: descriptor.exposed_name.clone(),
                route,
                reason: reason.to_string(),
            });
        }
        if generated.contains(&identifier) {
            return Err(GeneratorError::InvalidExposedName {
                name: descriptor.exposed_name.clone(),
                route,
                reason: format!("'{identifier}' is a generated helper name"),
            });
        }
        if CLIENT_LOCAL_NAMES.contains(&identifier.as_str()) {
            return Err(GeneratorError::InvalidExposedName {
                name: descriptor.exposed_name.clone(),
                route,
                reason: format!("'{identifier}' would be shadowed by a generated local binding"),
            });
        }
        if let Some(first) = bindings.get(&identifier) {
            return Err(GeneratorError::DuplicateExposedName {
                identifier,
                first: first.clone(),
                second: route,
            });
        }

        if !descriptor.path.starts_with('/') {
            warn!(route = %route, "endpoint path does not start with '/'");
        }
        if let Some(first) = paths.get(descriptor.path.as_str()) {
            warn!(
                route = %route,
                shadowed_by = %first,
                "duplicate endpoint path; the dispatcher only reaches the first"
            );
        } else {
            paths.insert(&descriptor.path, route.clone());
        }

        bindings.insert(identifier, route);
    }

    Ok(())
}
