//! Generator configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! marker = "color_codegen::ColorGenerator"
//! reference_type = "color_codegen::Color"
//! probes = ["RED", "REBECCA_PURPLE"]
//! output_key = "colors.g.rs"
//! container = "GeneratedCode"
//! operation = "print_color"
//! ```

use crate::error::{Error, Result};
use crate::registry::MARKER_OUTPUT_KEY;
use crate::types::DEFAULT_MARKER;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Qualified path of the marker annotation.
    pub marker: String,
    /// Output key of the marker unit.
    pub marker_output_key: String,
    /// Qualified path of the type whose named constants are probed.
    pub reference_type: String,
    /// Candidate constant names, probed and emitted in this order.
    pub probes: Vec<String>,
    /// Output key of the synthesized unit.
    pub output_key: String,
    /// Name of the generated struct.
    pub container: String,
    /// Name of the generated associated function.
    pub operation: String,
    /// Header comment for the synthesized unit.
    pub header: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            marker_output_key: MARKER_OUTPUT_KEY.to_string(),
            reference_type: "color_codegen::Color".to_string(),
            probes: vec!["RED".to_string(), "REBECCA_PURPLE".to_string()],
            output_key: "colors.g.rs".to_string(),
            container: "GeneratedCode".to_string(),
            operation: "print_color".to_string(),
            header: None,
        }
    }
}

impl GeneratorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check that every name ends up as valid Rust in the generated text.
    pub fn validate(&self) -> Result<()> {
        validate_path("marker", &self.marker)?;
        validate_path("reference_type", &self.reference_type)?;
        validate_ident("container", &self.container)?;
        validate_ident("operation", &self.operation)?;
        validate_key("output_key", &self.output_key)?;
        validate_key("marker_output_key", &self.marker_output_key)?;
        if self.output_key == self.marker_output_key {
            return Err(Error::Config(format!(
                "output_key and marker_output_key are both `{}`",
                self.output_key
            )));
        }
        Ok(())
    }
}

fn validate_ident(field: &str, value: &str) -> Result<()> {
    syn::parse_str::<syn::Ident>(value)
        .map(|_| ())
        .map_err(|e| Error::Config(format!("{field} `{value}` is not an identifier: {e}")))
}

fn validate_path(field: &str, value: &str) -> Result<()> {
    syn::parse_str::<syn::Path>(value)
        .map(|_| ())
        .map_err(|e| Error::Config(format!("{field} `{value}` is not a path: {e}")))
}

fn validate_key(field: &str, value: &str) -> Result<()> {
    let file_name_only = Path::new(value)
        .file_name()
        .is_some_and(|name| name == value);
    if file_name_only {
        Ok(())
    } else {
        Err(Error::Config(format!("{field} `{value}` must be a bare file name")))
    }
}
