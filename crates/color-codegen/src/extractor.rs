//! Source file parser that records declarations and their annotations.
//!
//! The extractor walks parsed Rust items and records, for every declaration,
//! the resolved paths of the attributes attached to it. The selector then
//! filters those records by marker identity without re-parsing.
//!
//! ## Use-item analysis
//!
//! Each module scope gets its own import map built from its `use` items:
//!
//! - `use color_codegen::ColorGenerator` maps `"ColorGenerator"` to
//!   `"color_codegen::ColorGenerator"`
//! - `use color_codegen::ColorGenerator as Cg` maps `"Cg"` to the same path
//! - `use color_codegen as cg` lets `cg::ColorGenerator` resolve as well
//!
//! A name that is declared in the scope itself resolves to that item. A name
//! that is neither imported nor declared falls back to a glob import when the
//! scope has exactly one; otherwise it is left as written.
//!
//! Paths starting with `self`, `super` or `crate` are rebased onto the module
//! they name, and their next segment is looked up in that module's imports,
//! so `use super::*` picks up whatever the parent module imported. Glob
//! imports of the parent are not followed.

use crate::error::{Error, Result};
use crate::selector::DeclarationSource;
use crate::types::{Declaration, DeclarationId, DeclarationKind};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use syn::{Attribute, ImplItem, Item, TraitItem, Type, TypePath, UseTree};
use walkdir::WalkDir;

/// Origin label for source handed in as a string.
const STRING_ORIGIN: &str = "<string>";

/// Per-scope context built from `use` items.
#[derive(Debug, Default)]
struct SourceContext {
    /// Maps local name -> fully-qualified path.
    imports: HashMap<String, String>,
    /// Prefixes of `use prefix::*` items, in source order.
    globs: Vec<String>,
    /// Names of items declared directly in the scope.
    locals: HashSet<String>,
}

impl SourceContext {
    /// Build the context for one module scope from its items.
    fn from_items(items: &[Item]) -> Self {
        let mut ctx = Self::default();
        for item in items {
            if let Item::Use(item_use) = item {
                collect_imports(&item_use.tree, &[], &mut ctx);
            } else if let Some(name) = item_name(item) {
                ctx.locals.insert(name);
            }
        }
        ctx
    }

    /// Resolve a path as written in this scope, substituting imports.
    fn resolve(&self, path: &syn::Path) -> String {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let Some((first, rest)) = segments.split_first() else {
            return String::new();
        };

        if path.leading_colon.is_some() {
            return segments.join("::");
        }
        if let Some(full) = self.imports.get(first) {
            return make_full_path(&[full.clone()], &rest.join("::"));
        }
        if rest.is_empty() && !self.locals.contains(first) && self.globs.len() == 1 {
            return make_full_path(&self.globs, first);
        }
        segments.join("::")
    }
}

/// Module scopes enclosing the items being walked, outermost first.
#[derive(Debug, Default)]
pub(crate) struct ScopeChain {
    /// Module path that `crate::` refers to.
    crate_root: Vec<String>,
    scopes: Vec<(Vec<String>, SourceContext)>,
}

impl ScopeChain {
    pub(crate) fn new(crate_root: Vec<String>) -> Self {
        Self {
            crate_root,
            scopes: Vec::new(),
        }
    }

    /// Enter module `module`, whose body is `items`.
    pub(crate) fn enter(&mut self, module: &[String], items: &[Item]) {
        self.scopes
            .push((module.to_vec(), SourceContext::from_items(items)));
    }

    pub(crate) fn leave(&mut self) {
        self.scopes.pop();
    }

    /// Path of the innermost module.
    pub(crate) fn module(&self) -> &[String] {
        self.scopes
            .last()
            .map_or(self.crate_root.as_slice(), |(module, _)| module.as_slice())
    }

    /// Qualify a name declared in the innermost module.
    pub(crate) fn qualify(&self, name: &str) -> String {
        make_full_path(self.module(), name)
    }

    /// Resolve a path written in the innermost module to its fully-qualified
    /// form.
    pub(crate) fn resolve(&self, path: &syn::Path) -> String {
        let Some((module, ctx)) = self.scopes.last() else {
            return SourceContext::default().resolve(path);
        };
        let mut written = ctx.resolve(path);
        if path.leading_colon.is_some() {
            return written;
        }

        let mut module = module.clone();
        // One iteration per import followed; the bound stops import cycles
        for _ in 0..=self.scopes.len() {
            let segments: Vec<&str> = written.split("::").collect();
            let rest = match segments.first().copied() {
                Some("crate") => {
                    module = self.crate_root.clone();
                    &segments[1..]
                }
                Some("self") => &segments[1..],
                Some("super") => {
                    let supers = segments.iter().take_while(|s| **s == "super").count();
                    module.truncate(module.len().saturating_sub(supers));
                    &segments[supers..]
                }
                Some(first) => {
                    return match self.context_of(&module) {
                        Some(ctx) if ctx.locals.contains(first) => make_full_path(&module, &written),
                        _ => written,
                    };
                }
                None => return written,
            };

            let Some((first, tail)) = rest.split_first() else {
                return module.join("::");
            };
            match self.context_of(&module).and_then(|ctx| ctx.imports.get(*first)) {
                // The import target is written relative to `module`
                Some(full) => written = make_full_path(&[full.clone()], &tail.join("::")),
                None => return make_full_path(&module, &rest.join("::")),
            }
        }
        written
    }

    fn context_of(&self, module: &[String]) -> Option<&SourceContext> {
        self.scopes
            .iter()
            .find(|(path, _)| path.as_slice() == module)
            .map(|(_, ctx)| ctx)
    }
}

fn item_name(item: &Item) -> Option<String> {
    let ident = match item {
        Item::Struct(s) => &s.ident,
        Item::Enum(e) => &e.ident,
        Item::Union(u) => &u.ident,
        Item::Type(t) => &t.ident,
        Item::Trait(t) => &t.ident,
        Item::Fn(f) => &f.sig.ident,
        Item::Const(c) => &c.ident,
        Item::Static(s) => &s.ident,
        Item::Mod(m) => &m.ident,
        _ => return None,
    };
    Some(ident.to_string())
}

/// Recursively flatten a `UseTree` into import entries.
fn collect_imports(tree: &UseTree, prefix: &[String], ctx: &mut SourceContext) {
    match tree {
        UseTree::Path(p) => {
            let mut new_prefix = prefix.to_vec();
            new_prefix.push(p.ident.to_string());
            collect_imports(&p.tree, &new_prefix, ctx);
        }
        UseTree::Name(n) => {
            let name = n.ident.to_string();
            if name == "self" {
                // `use foo::{self}` imports `foo` itself
                if let Some((last, _)) = prefix.split_last() {
                    ctx.imports.insert(last.clone(), prefix.join("::"));
                }
                return;
            }
            let full_path = make_full_path(prefix, &name);
            ctx.imports.insert(name, full_path);
        }
        UseTree::Rename(r) => {
            let canonical = r.ident.to_string();
            let alias = r.rename.to_string();
            let full_path = if canonical == "self" {
                prefix.join("::")
            } else {
                make_full_path(prefix, &canonical)
            };
            if alias != "_" {
                ctx.imports.insert(alias, full_path);
            }
        }
        UseTree::Glob(_) => {
            if !prefix.is_empty() {
                ctx.globs.push(prefix.join("::"));
            }
        }
        UseTree::Group(g) => {
            for item in &g.items {
                collect_imports(item, prefix, ctx);
            }
        }
    }
}

/// Join prefix segments with the final name using `::`.
fn make_full_path(prefix: &[String], name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.join("::")
    } else {
        format!("{}::{}", prefix.join("::"), name)
    }
}

fn child_scope(scope: &[String], name: String) -> Vec<String> {
    let mut inner = scope.to_vec();
    inner.push(name);
    inner
}

/// Resolved paths of every annotation on an item.
///
/// Entries of `#[derive(...)]` lists count individually; every other outer
/// attribute contributes its own path.
fn annotations_of(attrs: &[Attribute], scopes: &ScopeChain) -> Vec<String> {
    let mut annotations = Vec::new();
    for attr in attrs {
        if !matches!(attr.style, syn::AttrStyle::Outer) {
            continue;
        }
        if attr.path().is_ident("derive") {
            if let Ok(nested) = attr.parse_args_with(
                syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
            ) {
                annotations.extend(nested.iter().map(|path| scopes.resolve(path)));
            }
        } else {
            annotations.push(scopes.resolve(attr.path()));
        }
    }
    annotations
}

/// Qualified path of the type an `impl` block targets, if it is a plain path.
///
/// `impl<T> Wrapper<T>` targets `Wrapper`.
pub(crate) fn impl_target(self_ty: &Type, scopes: &ScopeChain) -> Option<String> {
    match self_ty {
        Type::Path(TypePath { qself: None, path }) => Some(scopes.resolve(path)),
        _ => None,
    }
}

struct Walker<'a> {
    origin: &'a str,
    out: &'a mut Vec<Declaration>,
    scopes: ScopeChain,
}

impl Walker<'_> {
    fn record(
        &mut self,
        scope: &[String],
        name: &str,
        kind: DeclarationKind,
        attrs: &[Attribute],
    ) {
        self.out.push(Declaration {
            id: DeclarationId {
                origin: self.origin.to_string(),
                path: make_full_path(scope, name),
                kind,
            },
            annotations: annotations_of(attrs, &self.scopes),
        });
    }

    fn walk_items(&mut self, items: &[Item], scope: &[String]) {
        self.scopes.enter(scope, items);

        for item in items {
            match item {
                Item::Struct(s) => {
                    self.record(scope, &s.ident.to_string(), DeclarationKind::Struct, &s.attrs)
                }
                Item::Enum(e) => {
                    self.record(scope, &e.ident.to_string(), DeclarationKind::Enum, &e.attrs)
                }
                Item::Union(u) => {
                    self.record(scope, &u.ident.to_string(), DeclarationKind::Union, &u.attrs)
                }
                Item::Fn(f) => {
                    self.record(scope, &f.sig.ident.to_string(), DeclarationKind::Fn, &f.attrs)
                }
                Item::Const(c) => {
                    self.record(scope, &c.ident.to_string(), DeclarationKind::Const, &c.attrs)
                }
                Item::Static(s) => {
                    self.record(scope, &s.ident.to_string(), DeclarationKind::Static, &s.attrs)
                }
                Item::Type(t) => self.record(
                    scope,
                    &t.ident.to_string(),
                    DeclarationKind::TypeAlias,
                    &t.attrs,
                ),
                Item::Trait(t) => {
                    let name = t.ident.to_string();
                    self.record(scope, &name, DeclarationKind::Trait, &t.attrs);
                    let inner = child_scope(scope, name);
                    for trait_item in &t.items {
                        match trait_item {
                            TraitItem::Fn(f) => self.record(
                                &inner,
                                &f.sig.ident.to_string(),
                                DeclarationKind::Fn,
                                &f.attrs,
                            ),
                            TraitItem::Const(c) => self.record(
                                &inner,
                                &c.ident.to_string(),
                                DeclarationKind::Const,
                                &c.attrs,
                            ),
                            _ => {}
                        }
                    }
                }
                Item::Impl(imp) => {
                    let Some(target) = impl_target(&imp.self_ty, &self.scopes) else {
                        continue;
                    };
                    let inner: Vec<String> = target.split("::").map(str::to_string).collect();
                    for impl_item in &imp.items {
                        match impl_item {
                            ImplItem::Fn(f) => self.record(
                                &inner,
                                &f.sig.ident.to_string(),
                                DeclarationKind::Fn,
                                &f.attrs,
                            ),
                            ImplItem::Const(c) => self.record(
                                &inner,
                                &c.ident.to_string(),
                                DeclarationKind::Const,
                                &c.attrs,
                            ),
                            _ => {}
                        }
                    }
                }
                Item::Mod(m) => {
                    let name = m.ident.to_string();
                    self.record(scope, &name, DeclarationKind::Mod, &m.attrs);
                    // `mod foo;` bodies live in their own files
                    if let Some((_, content)) = &m.content {
                        let inner = child_scope(scope, name);
                        self.walk_items(content, &inner);
                    }
                }
                _ => {}
            }
        }
        self.scopes.leave();
    }
}

/// Declarations read from Rust source with `syn`.
///
/// Declarations are kept in the order they were added: files in the order
/// they were passed in (directories in sorted file-name order), items in
/// source order, nested modules depth-first.
#[derive(Debug, Clone, Default)]
pub struct SourceDeclarations {
    declarations: Vec<Declaration>,
}

impl SourceDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse Rust source from a string and record its declarations.
    pub fn add_source_str(&mut self, source: &str) -> Result<&mut Self> {
        self.add_source(STRING_ORIGIN, source)
    }

    /// Parse a single Rust source file and record its declarations.
    pub fn add_source_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_source(&path.display().to_string(), &source)
    }

    /// Recursively scan a directory for `.rs` files and record their declarations.
    pub fn add_source_dir(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let root = path.as_ref();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| Error::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "rs") {
                self.add_source_file(path)?;
            }
        }
        Ok(self)
    }

    fn add_source(&mut self, origin: &str, source: &str) -> Result<&mut Self> {
        let file = syn::parse_file(source).map_err(|source| Error::Parse {
            origin: origin.to_string(),
            source,
        })?;

        let before = self.declarations.len();
        Walker {
            origin,
            out: &mut self.declarations,
            scopes: ScopeChain::default(),
        }
        .walk_items(&file.items, &[]);

        tracing::debug!(
            origin,
            declarations = self.declarations.len() - before,
            "parsed source"
        );
        Ok(self)
    }
}

impl DeclarationSource for SourceDeclarations {
    fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}
