//! Error types for the generation pipeline.

use std::io;
use std::path::PathBuf;

/// Errors that abort a generation session.
///
/// Capability probing never produces one of these; metadata failures are
/// reported through [`MetadataError`] and degrade to "member absent".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("marker source `{key}` is missing: {source}")]
    MissingMarkerSource {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("marker source `{key}` is invalid: {reason}")]
    InvalidMarkerSource { key: String, reason: String },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: syn::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Errors raised by a [`TypeMetadataSource`](crate::TypeMetadataSource).
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("type `{0}` is not known to this metadata source")]
    UnknownType(String),

    #[error("failed to parse type metadata from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: syn::Error,
    },

    #[error("failed to read type metadata from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
