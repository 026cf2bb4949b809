//! Generator configuration.
//!
//! The CLI maps its flags onto [`GeneratorConfig`]; library callers can start
//! from [`GeneratorConfig::default`] and override single fields.

use caefte_define::Verb;

use crate::errors::GeneratorError;

/// Default attribute name for GET route markers.
pub const DEFAULT_GET_MARKER: &str = "get";
/// Default attribute name for POST route markers.
pub const DEFAULT_POST_MARKER: &str = "post";
/// Default path prefix for handler types in the generated dispatcher.
pub const DEFAULT_MODULE_ROOT: &str = "crate";
/// Default name of the generated client module.
pub const DEFAULT_CLIENT_MODULE: &str = "Api";

/// Options controlling discovery and emission.
///
/// ## Examples
///
/// ```
/// use caefte_define::Verb;
/// use caefte_gen::config::GeneratorConfig;
///
/// let config = GeneratorConfig {
///     module_root: "crate::controllers".to_string(),
///     ..GeneratorConfig::default()
/// };
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.marker_verb("Get"), Some(Verb::Get));
/// assert_eq!(config.marker_verb("route"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Attribute name recognized as a GET marker (last path segment,
    /// ASCII case-insensitive).
    pub get_marker: String,
    /// Attribute name recognized as a POST marker.
    pub post_marker: String,
    /// Rust path under which the service module's top-level items live, as
    /// seen from the generated server module.
    pub module_root: String,
    /// Name of the generated Elm module.
    pub client_module: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            get_marker: DEFAULT_GET_MARKER.to_string(),
            post_marker: DEFAULT_POST_MARKER.to_string(),
            module_root: DEFAULT_MODULE_ROOT.to_string(),
            client_module: DEFAULT_CLIENT_MODULE.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Returns the verb declared by an attribute named `name`, if it is a
    /// recognized route marker.
    pub fn marker_verb(&self, name: &str) -> Option<Verb> {
        if name.eq_ignore_ascii_case(&self.get_marker) {
            Some(Verb::Get)
        } else if name.eq_ignore_ascii_case(&self.post_marker) {
            Some(Verb::Post)
        } else {
            None
        }
    }

    /// Parses [`module_root`](Self::module_root) as a Rust path.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` if it is not a valid path.
    pub fn module_root_path(&self) -> Result<syn::Path, GeneratorError> {
        syn::parse_str::<syn::Path>(&self.module_root).map_err(|e| {
            GeneratorError::ConfigError(format!(
                "module root '{}' is not a Rust path: {}",
                self.module_root, e
            ))
        })
    }

    /// Checks every field before any work is done.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` describing the first bad field.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        for (label, marker) in [("GET", &self.get_marker), ("POST", &self.post_marker)] {
            if syn::parse_str::<syn::Ident>(marker).is_err() {
                return Err(GeneratorError::ConfigError(format!(
                    "{label} marker '{marker}' is not an identifier"
                )));
            }
        }
        if self.get_marker.eq_ignore_ascii_case(&self.post_marker) {
            return Err(GeneratorError::ConfigError(format!(
                "GET and POST markers are both '{}'",
                self.get_marker
            )));
        }

        self.module_root_path()?;

        if !is_elm_module_name(&self.client_module) {
            return Err(GeneratorError::ConfigError(format!(
                "client module '{}' must be dot-separated capitalized names (e.g. 'Api' or 'Generated.Api')",
                self.client_module
            )));
        }

        Ok(())
    }
}

fn is_elm_module_name(name: &str) -> bool {
    name.split('.').all(|part| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
