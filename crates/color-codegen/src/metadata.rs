//! Static type metadata sources.
//!
//! A [`TypeMetadataSource`] answers one question: which members does a named
//! type expose, and what are their visibility, storage and declared value
//! type. Nothing is ever instantiated; the answers come from source text or
//! from a table the host fills in.

use crate::error::MetadataError;
use crate::extractor::{ScopeChain, impl_target};
use crate::types::{MemberInfo, Visibility};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use syn::{Fields, ImplItem, Item, Type, TypePath};

/// Module path the embedded reference type lives at.
const EMBEDDED_MODULE: &str = "color_codegen";

/// Source text of the embedded reference type.
const EMBEDDED_SOURCE: &str = include_str!("color.rs");

/// Anything that can enumerate a named type's members from static metadata.
pub trait TypeMetadataSource {
    /// Every known member of `type_path`, static and instance alike.
    ///
    /// Returns [`MetadataError::UnknownType`] when the type cannot be resolved.
    fn members(&self, type_path: &str) -> Result<Vec<MemberInfo>, MetadataError>;
}

impl<T: TypeMetadataSource + ?Sized> TypeMetadataSource for &T {
    fn members(&self, type_path: &str) -> Result<Vec<MemberInfo>, MetadataError> {
        (**self).members(type_path)
    }
}

/// In-memory metadata, filled in by the host or by tests.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: BTreeMap<String, Vec<MemberInfo>>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type with the given members, replacing any previous entry.
    pub fn with_type(
        mut self,
        type_path: impl Into<String>,
        members: impl IntoIterator<Item = MemberInfo>,
    ) -> Self {
        self.types
            .insert(type_path.into(), members.into_iter().collect());
        self
    }

    /// Append a member to a type, declaring the type if needed.
    pub fn add_member(&mut self, type_path: impl Into<String>, member: MemberInfo) -> &mut Self {
        self.types.entry(type_path.into()).or_default().push(member);
        self
    }
}

impl TypeMetadataSource for TypeTable {
    fn members(&self, type_path: &str) -> Result<Vec<MemberInfo>, MetadataError> {
        self.types
            .get(type_path)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownType(type_path.to_string()))
    }
}

/// Metadata indexed from Rust source with `syn`.
///
/// Recorded members:
///
/// - associated consts of inherent `impl` blocks (static)
/// - unit variants of enums (static, with the enum's visibility)
/// - struct fields (instance)
///
/// Type keys are qualified with the module path the source was added under,
/// so `struct Color` added under `color_codegen` is found as
/// `color_codegen::Color`.
#[derive(Debug, Clone, Default)]
pub struct SourceTypeMetadata {
    types: BTreeMap<String, Vec<MemberInfo>>,
}

impl SourceTypeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for the crate's own [`Color`](crate::Color) type.
    pub fn embedded() -> Result<Self, MetadataError> {
        let mut metadata = Self::new();
        metadata.add_source_str(EMBEDDED_MODULE, EMBEDDED_SOURCE)?;
        Ok(metadata)
    }

    /// Index the types declared in `source`, which lives at module path `module`.
    pub fn add_source_str(&mut self, module: &str, source: &str) -> Result<&mut Self, MetadataError> {
        self.add_source(module, "<string>", source)
    }

    /// Index the types declared in a Rust source file.
    pub fn add_source_file(
        &mut self,
        module: &str,
        path: impl AsRef<Path>,
    ) -> Result<&mut Self, MetadataError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| MetadataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_source(module, &path.display().to_string(), &source)
    }

    /// Qualified paths of every indexed type.
    pub fn type_paths(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    fn add_source(
        &mut self,
        module: &str,
        origin: &str,
        source: &str,
    ) -> Result<&mut Self, MetadataError> {
        let file = syn::parse_file(source).map_err(|source| MetadataError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        let root: Vec<String> = module
            .split("::")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let mut indexer = Indexer {
            scopes: ScopeChain::new(root.iter().take(1).cloned().collect()),
            types: &mut self.types,
        };
        indexer.index_items(&file.items, &root);

        tracing::debug!(origin, module, types = self.types.len(), "indexed type metadata");
        Ok(self)
    }
}

impl TypeMetadataSource for SourceTypeMetadata {
    fn members(&self, type_path: &str) -> Result<Vec<MemberInfo>, MetadataError> {
        self.types
            .get(type_path.trim_start_matches("::"))
            .cloned()
            .ok_or_else(|| MetadataError::UnknownType(type_path.to_string()))
    }
}

struct Indexer<'a> {
    scopes: ScopeChain,
    types: &'a mut BTreeMap<String, Vec<MemberInfo>>,
}

impl Indexer<'_> {
    fn index_items(&mut self, items: &[Item], path: &[String]) {
        self.scopes.enter(path, items);

        for item in items {
            match item {
                Item::Struct(s) => {
                    let owner = self.scopes.qualify(&s.ident.to_string());
                    let fields: Vec<MemberInfo> = match &s.fields {
                        Fields::Named(named) => named
                            .named
                            .iter()
                            .filter_map(|f| {
                                let name = f.ident.as_ref()?.to_string();
                                Some(self.instance_member(name, &f.vis, &f.ty, &owner))
                            })
                            .collect(),
                        Fields::Unnamed(unnamed) => unnamed
                            .unnamed
                            .iter()
                            .enumerate()
                            .map(|(i, f)| self.instance_member(i.to_string(), &f.vis, &f.ty, &owner))
                            .collect(),
                        Fields::Unit => Vec::new(),
                    };
                    self.types.entry(owner).or_default().extend(fields);
                }
                Item::Enum(e) => {
                    let owner = self.scopes.qualify(&e.ident.to_string());
                    let visibility = Visibility::from(&e.vis);
                    let variants: Vec<MemberInfo> = e
                        .variants
                        .iter()
                        .filter(|v| matches!(v.fields, Fields::Unit))
                        .map(|v| MemberInfo::new(v.ident.to_string(), visibility, true, owner.clone()))
                        .collect();
                    self.types.entry(owner).or_default().extend(variants);
                }
                Item::Union(u) => {
                    let owner = self.scopes.qualify(&u.ident.to_string());
                    self.types.entry(owner).or_default();
                }
                // Trait impl consts are reached through the trait, not the type
                Item::Impl(imp) if imp.trait_.is_none() => {
                    let Some(owner) = impl_target(&imp.self_ty, &self.scopes) else {
                        continue;
                    };
                    let consts: Vec<MemberInfo> = imp
                        .items
                        .iter()
                        .filter_map(|impl_item| match impl_item {
                            ImplItem::Const(c) => Some(MemberInfo::new(
                                c.ident.to_string(),
                                Visibility::from(&c.vis),
                                true,
                                self.resolve_type(&c.ty, &owner),
                            )),
                            _ => None,
                        })
                        .collect();
                    self.types.entry(owner).or_default().extend(consts);
                }
                Item::Mod(m) => {
                    if let Some((_, content)) = &m.content {
                        let mut inner = path.to_vec();
                        inner.push(m.ident.to_string());
                        self.index_items(content, &inner);
                    }
                }
                _ => {}
            }
        }
        self.scopes.leave();
    }

    fn instance_member(
        &self,
        name: String,
        vis: &syn::Visibility,
        ty: &Type,
        owner: &str,
    ) -> MemberInfo {
        MemberInfo::new(name, Visibility::from(vis), false, self.resolve_type(ty, owner))
    }

    /// Render a declared type as a comparable, fully-qualified string.
    ///
    /// Paths with generic arguments get a `<..>` suffix so they never compare
    /// equal to a plain type path. Types with no path form render as `_`.
    fn resolve_type(&self, ty: &Type, owner: &str) -> String {
        match ty {
            Type::Path(TypePath { qself: None, path }) => {
                if path.is_ident("Self") {
                    return owner.to_string();
                }
                let resolved = self.scopes.resolve(path);
                let has_args = path
                    .segments
                    .iter()
                    .any(|s| !matches!(s.arguments, syn::PathArguments::None));
                if has_args {
                    format!("{resolved}<..>")
                } else {
                    resolved
                }
            }
            Type::Reference(r) => format!("&{}", self.resolve_type(&r.elem, owner)),
            Type::Paren(p) => self.resolve_type(&p.elem, owner),
            Type::Group(g) => self.resolve_type(&g.elem, owner),
            _ => "_".to_string(),
        }
    }
}
