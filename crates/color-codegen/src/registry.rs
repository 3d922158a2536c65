//! Marker registry: owns the marker's declaration source.
//!
//! The registry hands the marker source to every session as its own
//! generated unit, independent of how many declarations use the marker. The
//! text ships compiled in; hosts that vendor their own copy can load it from
//! disk instead.

use crate::error::{Error, Result};
use crate::types::{GeneratedUnit, Marker};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Output key of the marker unit.
pub const MARKER_OUTPUT_KEY: &str = "color_generator.g.rs";

/// Compiled-in declaration of the default marker.
const EMBEDDED_MARKER_SOURCE: &str = include_str!("../assets/color_generator.rs");

/// The marker identity plus the source text that declares it.
///
/// Construction validates that the source parses and declares an item named
/// after the marker, so a registry that exists can always emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRegistry {
    marker: Marker,
    source: Cow<'static, str>,
    output_key: String,
}

impl MarkerRegistry {
    /// Registry for the default marker, backed by the compiled-in source.
    pub fn embedded() -> Result<Self> {
        Self::embedded_for(Marker::default())
    }

    /// Registry for `marker`, backed by the compiled-in source.
    ///
    /// Fails with [`Error::InvalidMarkerSource`] unless `marker`'s name is the
    /// one the compiled-in source declares.
    pub fn embedded_for(marker: Marker) -> Result<Self> {
        Self::validated(
            marker,
            Cow::Borrowed(EMBEDDED_MARKER_SOURCE),
            MARKER_OUTPUT_KEY.to_string(),
        )
    }

    /// Registry for `marker`, loading its declaration source from `path`.
    ///
    /// A missing or unreadable file is [`Error::MissingMarkerSource`].
    pub fn from_file(marker: Marker, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::MissingMarkerSource {
            key: path.display().to_string(),
            source,
        })?;
        Self::validated(marker, Cow::Owned(source), MARKER_OUTPUT_KEY.to_string())
    }

    /// Use a different output key for the marker unit.
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The marker unit for this session.
    pub fn emit_marker(&self) -> GeneratedUnit {
        GeneratedUnit::new(self.output_key.clone(), self.source.clone().into_owned())
    }

    fn validated(marker: Marker, source: Cow<'static, str>, output_key: String) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidMarkerSource {
            key: output_key.clone(),
            reason,
        };

        if source.trim().is_empty() {
            return Err(invalid("source is empty".to_string()));
        }
        let file = syn::parse_file(&source).map_err(|e| invalid(e.to_string()))?;
        if !file.items.iter().any(|item| declares(item, marker.name())) {
            return Err(invalid(format!(
                "no item named `{}` is declared",
                marker.name()
            )));
        }

        tracing::debug!(marker = %marker, key = %output_key, "marker source loaded");
        Ok(Self {
            marker,
            source,
            output_key,
        })
    }
}

fn declares(item: &syn::Item, name: &str) -> bool {
    let ident = match item {
        syn::Item::Trait(t) => &t.ident,
        syn::Item::Struct(s) => &s.ident,
        syn::Item::Enum(e) => &e.ident,
        syn::Item::Macro(m) => match &m.ident {
            Some(ident) => ident,
            None => return false,
        },
        _ => return false,
    };
    ident == name
}
