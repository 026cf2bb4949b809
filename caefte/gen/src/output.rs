//! Artifact assembly and file writing.
//!
//! This module runs the whole pipeline: read the service module, build and
//! validate the model, render the artifact selected by the destination's
//! extension, then write it in one pass.
//!
//! ## Safety Guarantees
//!
//! - **Validation**: generated Rust is parsed with `syn` before writing
//! - **Formatting**: generated Rust is formatted with `prettyplease`
//! - **No partial runs**: the artifact is rendered in memory before the
//!   destination is opened, so a failed run leaves it untouched

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use proc_macro2::TokenStream;
use tracing::{debug, info};

use crate::codegen::{assemble_server_module, render_client};
use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::introspect::introspect_source;
use crate::model::{ServiceModel, build_model};
use crate::validation::validate_model;

/// Banner prepended to generated Rust.
pub const RUST_NOTICE: &str =
    "// This code was automatically generated by caefte-gen. Do not edit manually.\n\n";

/// Which artifact a destination receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Rust dispatcher and encoders.
    Server,
    /// Elm call stubs and decoders.
    Client,
}

impl ArtifactKind {
    /// Chooses by extension only: exactly `rs` is the server, anything else
    /// (including no extension) is the client.
    ///
    /// ```
    /// use std::path::Path;
    /// use caefte_gen::output::ArtifactKind;
    ///
    /// assert_eq!(ArtifactKind::for_destination(Path::new("src/api.rs")), ArtifactKind::Server);
    /// assert_eq!(ArtifactKind::for_destination(Path::new("src/Api.elm")), ArtifactKind::Client);
    /// assert_eq!(ArtifactKind::for_destination(Path::new("api.RS")), ArtifactKind::Client);
    /// ```
    pub fn for_destination(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext == "rs" => ArtifactKind::Server,
            _ => ArtifactKind::Client,
        }
    }
}

/// Reads, introspects, models and validates the service module at
/// `module_path`.
///
/// ## Errors
///
/// Any `GeneratorError` from configuration, reading, parsing, type mapping or
/// validation.
pub fn load_model(
    module_path: &Path,
    config: &GeneratorConfig,
) -> Result<ServiceModel, GeneratorError> {
    config.validate()?;

    let source = fs::read_to_string(module_path).map_err(|e| GeneratorError::ReadError {
        path: module_path.display().to_string(),
        source: e,
    })?;

    let discovered = introspect_source(&source, &module_path.display().to_string(), config)?;
    let model = build_model(discovered)?;
    validate_model(&model)?;

    info!(
        module = %module_path.display(),
        endpoints = model.endpoints.len(),
        shapes = model.shapes.len(),
        "loaded service model"
    );
    Ok(model)
}

/// Validates generated code by parsing it with syn.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if the code fails to parse.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", e)))
}

/// Formats generated code with prettyplease, behind the generated-file
/// banner.
pub fn format_code(file: &syn::File) -> String {
    format!("{}{}", RUST_NOTICE, prettyplease::unparse(file))
}

/// Renders the server module.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` for a bad module root and
/// `GeneratorError::CodeGenError` if the tokens do not form a Rust file.
pub fn render_server(
    model: &ServiceModel,
    config: &GeneratorConfig,
) -> Result<String, GeneratorError> {
    let module_root = config.module_root_path()?;
    let tokens = assemble_server_module(model, &module_root);
    let file = validate_code(&tokens)?;
    Ok(format_code(&file))
}

/// Renders the artifact of `kind`.
///
/// ## Errors
///
/// See [`render_server`]; the client renderer cannot fail.
pub fn render(
    kind: ArtifactKind,
    model: &ServiceModel,
    config: &GeneratorConfig,
) -> Result<String, GeneratorError> {
    match kind {
        ArtifactKind::Server => render_server(model, config),
        ArtifactKind::Client => Ok(render_client(model, &config.client_module)),
    }
}

/// Writes `content` to `path`, creating or truncating it.
///
/// Parent directories are created as needed.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if any step fails.
pub fn write_artifact(path: &Path, content: &str) -> Result<(), GeneratorError> {
    let write_error = |e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
    writer.write_all(content.as_bytes()).map_err(write_error)?;
    writer.flush().map_err(write_error)?;
    Ok(())
}

/// Generates the artifact for `destination` from the service module at
/// `module_path`.
///
/// With `dry_run` nothing is written. Either way the rendered artifact is
/// returned.
///
/// ## Errors
///
/// Any `GeneratorError`. Every error except `WriteError` is raised before the
/// destination is opened.
///
/// ## Examples
///
/// ```no_run
/// use std::path::Path;
/// use caefte_gen::config::GeneratorConfig;
/// use caefte_gen::output::generate_and_write;
///
/// let code = generate_and_write(
///     Path::new("src/controllers.rs"),
///     Path::new("src/generated_api.rs"),
///     &GeneratorConfig::default(),
///     false,
/// )
/// .unwrap();
/// assert!(code.contains("pub async fn dispatch"));
/// ```
pub fn generate_and_write(
    module_path: &Path,
    destination: &Path,
    config: &GeneratorConfig,
    dry_run: bool,
) -> Result<String, GeneratorError> {
    let kind = ArtifactKind::for_destination(destination);
    info!(
        source = %module_path.display(),
        destination = %destination.display(),
        ?kind,
        "generating"
    );

    let model = load_model(module_path, config)?;
    let code = render(kind, &model, config)?;

    if dry_run {
        debug!(bytes = code.len(), "dry run, skipping write");
    } else {
        write_artifact(destination, &code)?;
        info!(
            destination = %destination.display(),
            endpoints = model.endpoints.len(),
            "wrote artifact"
        );
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use tempfile::TempDir;

    const SERVICE: &str = r#"
        #[derive(Default)]
        pub struct Service;

        impl Service {
            #[get("/api/rng")]
            pub fn rng(&self) -> i32 { 4 }

            #[get("/api/files")]
            pub async fn files(&self) -> Vec<String> { vec![] }
        }
    "#;

    fn write_service(dir: &TempDir, source: &str) -> std::path::PathBuf {
        let path = dir.path().join("service.rs");
        fs::write(&path, source).unwrap();
        path
    }

    // === ArtifactKind tests ===

    #[test]
    fn extension_selects_artifact() {
        assert_eq!(ArtifactKind::for_destination(Path::new("a.rs")), ArtifactKind::Server);
        assert_eq!(ArtifactKind::for_destination(Path::new("a.elm")), ArtifactKind::Client);
        assert_eq!(ArtifactKind::for_destination(Path::new("api")), ArtifactKind::Client);
        assert_eq!(ArtifactKind::for_destination(Path::new("a.rs.txt")), ArtifactKind::Client);
    }

    // === validate_code / format_code tests ===

    #[test]
    fn validate_code_rejects_invalid_code() {
        let invalid_tokens = quote! {
            let x =
        };

        match validate_code(&invalid_tokens) {
            Err(GeneratorError::CodeGenError(_)) => {}
            Err(other) => panic!("Unexpected error type: {:?}", other),
            Ok(_) => panic!("Expected error but got success"),
        }
    }

    #[test]
    fn format_code_adds_banner() {
        let file = validate_code(&quote!(fn main() {})).unwrap();
        let formatted = format_code(&file);
        assert!(formatted.starts_with(RUST_NOTICE));
        assert!(formatted.contains("fn main() {}"));
    }

    // === load_model tests ===

    #[test]
    fn load_model_reports_missing_module() {
        let dir = TempDir::new().unwrap();
        let err = load_model(&dir.path().join("missing.rs"), &GeneratorConfig::default())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::ReadError { .. }));
    }

    #[test]
    fn load_model_rejects_bad_config_before_reading() {
        let config = GeneratorConfig {
            client_module: "api".to_string(),
            ..GeneratorConfig::default()
        };
        let err = load_model(Path::new("does/not/matter.rs"), &config).unwrap_err();
        assert!(matches!(err, GeneratorError::ConfigError(_)));
    }

    #[test]
    fn load_model_builds_endpoints_and_shapes() {
        let dir = TempDir::new().unwrap();
        let module = write_service(&dir, SERVICE);
        let model = load_model(&module, &GeneratorConfig::default()).unwrap();
        assert_eq!(model.endpoints.len(), 2);
        assert_eq!(model.shapes.len(), 3);
    }

    // === write_artifact tests ===

    #[test]
    fn write_artifact_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/api.rs");
        write_artifact(&path, "// generated").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "// generated");
    }

    #[test]
    fn write_artifact_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.elm");
        fs::write(&path, "a much longer previous content").unwrap();
        write_artifact(&path, "short").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    // === generate_and_write tests ===

    #[test]
    fn generates_server_for_rs_destination() {
        let dir = TempDir::new().unwrap();
        let module = write_service(&dir, SERVICE);
        let destination = dir.path().join("api.rs");

        let code =
            generate_and_write(&module, &destination, &GeneratorConfig::default(), false).unwrap();

        assert!(code.starts_with(RUST_NOTICE));
        assert!(code.contains("pub async fn dispatch"));
        assert_eq!(fs::read_to_string(&destination).unwrap(), code);
    }

    #[test]
    fn generates_client_for_other_destinations() {
        let dir = TempDir::new().unwrap();
        let module = write_service(&dir, SERVICE);
        let destination = dir.path().join("Api.elm");

        let code =
            generate_and_write(&module, &destination, &GeneratorConfig::default(), false).unwrap();

        assert!(code.starts_with("module Api exposing (files, rng)"));
        assert_eq!(fs::read_to_string(&destination).unwrap(), code);
    }

    #[test]
    fn dry_run_does_not_create_destination() {
        let dir = TempDir::new().unwrap();
        let module = write_service(&dir, SERVICE);
        let destination = dir.path().join("api.rs");

        let code =
            generate_and_write(&module, &destination, &GeneratorConfig::default(), true).unwrap();

        assert!(!code.is_empty());
        assert!(!destination.exists());
    }

    #[test]
    fn generation_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let module = write_service(&dir, SERVICE);
        let config = GeneratorConfig::default();

        for name in ["api.rs", "Api.elm"] {
            let destination = dir.path().join(name);
            let first = generate_and_write(&module, &destination, &config, false).unwrap();
            let second = generate_and_write(&module, &destination, &config, false).unwrap();
            assert_eq!(first, second, "{name}");
        }
    }

    #[test]
    fn custom_client_module_name() {
        let dir = TempDir::new().unwrap();
        let module = write_service(&dir, SERVICE);
        let config = GeneratorConfig {
            client_module: "Generated.Api".to_string(),
            ..GeneratorConfig::default()
        };

        let code = generate_and_write(&module, &dir.path().join("Api.elm"), &config, true).unwrap();
        assert!(code.starts_with("module Generated.Api exposing"));
    }
}
