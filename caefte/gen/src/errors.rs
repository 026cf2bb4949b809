//! Error types for the caefte generator.

use thiserror::Error;

/// Errors that can occur during code generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Failed to read the service module
    #[error("Failed to read service module '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The service module is not valid Rust
    #[error("Failed to parse service module '{path}': {source}")]
    ParseError {
        path: String,
        #[source]
        source: syn::Error,
    },

    /// A result type cannot be reduced to a primitive or list shape.
    ///
    /// This aborts generation; no artifact is written.
    #[error("Unsupported result type '{type_name}' returned by '{method}'")]
    UnsupportedType {
        /// The offending type as written in the source.
        type_name: String,
        /// `Type::method` that returns it.
        method: String,
    },

    /// A route-marked method cannot be invoked without arguments.
    #[error("Endpoint method '{method}' cannot be dispatched: {reason}")]
    UnsupportedSignature {
        /// `Type::method` carrying the marker.
        method: String,
        /// What about the signature is unsupported.
        reason: String,
    },

    /// Two endpoints map to the same client binding.
    #[error(
        "Client binding '{identifier}' is produced by both '{first}' and '{second}'. Set a distinct api_name on one of them"
    )]
    DuplicateExposedName {
        /// The generated client identifier.
        identifier: String,
        /// Route of the first endpoint.
        first: String,
        /// Route of the second endpoint.
        second: String,
    },

    /// An exposed name cannot become a client identifier.
    #[error("Exposed name '{name}' for '{route}' is not usable as a client binding: {reason}")]
    InvalidExposedName {
        name: String,
        route: String,
        reason: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to generate code
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
