//! # color-codegen
//!
//! Build-time code generator driven by a marker derive and a static metadata
//! probe. A session:
//!
//! 1. emits the marker's declaration source as its own unit,
//! 2. selects declarations annotated with `#[derive(ColorGenerator)]`,
//! 3. probes the reference type ([`Color`] by default) for public associated
//!    constants of its own type, by name,
//! 4. synthesizes one unit whose body prints a line for every constant found.
//!
//! Nothing is generated beyond the marker unit unless some declaration
//! carries the marker.
//!
//! ## Usage
//!
//! ### 1. Annotate a declaration
//!
//! ```rust,ignore
//! use color_codegen::ColorGenerator;
//!
//! include!(concat!(env!("OUT_DIR"), "/color_generator.g.rs"));
//!
//! #[derive(ColorGenerator)]
//! pub struct Theme;
//!
//! include!(concat!(env!("OUT_DIR"), "/colors.g.rs"));
//! ```
//!
//! ### 2. Generate in build.rs
//!
//! ```no_run
//! use color_codegen::CodeGenerator;
//!
//! fn main() {
//!     let out_dir = std::env::var("OUT_DIR").unwrap();
//!     CodeGenerator::new()
//!         .add_source_file("src/lib.rs").unwrap()
//!         .write_to_dir(out_dir).unwrap();
//!
//!     println!("cargo:rerun-if-changed=src/lib.rs");
//! }
//! ```
//!
//! ### Custom hosts
//!
//! The pipeline only needs a [`DeclarationSource`] and a
//! [`TypeMetadataSource`]; hosts that already hold resolved declarations or
//! type metadata can call [`CodeGenerator::run`] directly.
//!
//! ```
//! use color_codegen::{CodeGenerator, MemberInfo, SourceDeclarations, TypeTable};
//!
//! let mut codegen = CodeGenerator::new();
//! codegen.set_reference_type("Color").set_probes(&["Red", "RebeccaPurple"]);
//!
//! let metadata = TypeTable::new().with_type("Color", [
//!     MemberInfo::public_static("Red", "Color"),
//!     MemberInfo::public_static("Blue", "Color"),
//! ]);
//! let mut sources = SourceDeclarations::new();
//! sources.add_source_str("#[derive(color_codegen::ColorGenerator)] struct Theme;").unwrap();
//!
//! let output = codegen.run(&sources, &metadata).unwrap();
//! let found: Vec<_> = output.outcomes.iter().map(|o| o.found).collect();
//! assert_eq!(found, [true, false]);
//! ```

mod color;
mod config;
mod error;
mod extractor;
mod generator;
mod metadata;
mod prober;
pub mod registry;
mod selector;
mod synthesizer;
mod types;

pub use color::Color;
pub use config::GeneratorConfig;
pub use error::{Error, MetadataError, Result};
pub use extractor::SourceDeclarations;
pub use generator::{CodeGenerator, SessionOutput};
pub use metadata::{SourceTypeMetadata, TypeMetadataSource, TypeTable};
pub use prober::Prober;
pub use registry::MarkerRegistry;
pub use selector::{DeclarationSource, select_declarations};
pub use synthesizer::{GeneratedBody, SynthesisOptions, synthesize};
pub use types::{
    ConsumerSignal, DEFAULT_MARKER, Declaration, DeclarationId, DeclarationKind, GeneratedUnit,
    Marker, MemberInfo, ProbeOutcome, UnitSet, Visibility,
};

#[cfg(feature = "derive")]
pub use color_codegen_derive::ColorGenerator;
