//! Data model shared by the pipeline stages.

use std::fmt;

/// The qualified path of the default marker.
pub const DEFAULT_MARKER: &str = "color_codegen::ColorGenerator";

/// A zero-argument annotation that opts a declaration into generation.
///
/// Identified by its fully-qualified path, e.g. `color_codegen::ColorGenerator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    qualified_name: String,
}

impl Marker {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name: String = qualified_name.into();
        Self {
            qualified_name: qualified_name.trim_start_matches("::").to_string(),
        }
    }

    /// The fully-qualified path used for matching.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The last path segment (`ColorGenerator` for `color_codegen::ColorGenerator`).
    pub fn name(&self) -> &str {
        self.qualified_name
            .rsplit("::")
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Whether a resolved annotation path refers to this marker.
    pub fn matches(&self, annotation: &str) -> bool {
        annotation == self.qualified_name
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Struct,
    Enum,
    Union,
    Trait,
    Fn,
    Const,
    Static,
    TypeAlias,
    Mod,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Trait => "trait",
            Self::Fn => "fn",
            Self::Const => "const",
            Self::Static => "static",
            Self::TypeAlias => "type",
            Self::Mod => "mod",
        }
    }
}

/// Identity of a declaration, used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclarationId {
    /// Where the declaration was read from (a file path or `<string>`).
    pub origin: String,
    /// Item path within its origin, e.g. `palette::Theme` or `Theme::render`.
    pub path: String,
    pub kind: DeclarationKind,
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` in {}", self.kind.as_str(), self.path, self.origin)
    }
}

/// A declaration together with the resolved paths of its annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: DeclarationId,
    /// Fully-qualified where resolvable, otherwise as written.
    pub annotations: Vec<String>,
}

/// Evidence that a declaration carries the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerSignal {
    pub declaration: DeclarationId,
    /// Always `true` today. Only the existence of a signal drives generation.
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)`, `pub(super)`, `pub(in path)`
    Restricted,
    /// No visibility modifier.
    Private,
}

impl From<&syn::Visibility> for Visibility {
    fn from(vis: &syn::Visibility) -> Self {
        match vis {
            syn::Visibility::Public(_) => Self::Public,
            syn::Visibility::Restricted(_) => Self::Restricted,
            syn::Visibility::Inherited => Self::Private,
        }
    }
}

/// One member of a type as seen through its static metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: String,
    pub visibility: Visibility,
    /// Accessible through the type rather than through an instance.
    pub is_static: bool,
    /// Declared value type, fully-qualified where resolvable.
    pub value_type: String,
}

impl MemberInfo {
    pub fn new(
        name: impl Into<String>,
        visibility: Visibility,
        is_static: bool,
        value_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            visibility,
            is_static,
            value_type: value_type.into(),
        }
    }

    /// A `pub const` associated item.
    pub fn public_static(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self::new(name, Visibility::Public, true, value_type)
    }
}

/// The outcome of one probe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub name: String,
    pub found: bool,
}

/// Generated source text plus the stable key it is emitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Filename-like key, e.g. `colors.g.rs`.
    pub key: String,
    pub source: String,
}

impl GeneratedUnit {
    pub fn new(key: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: source.into(),
        }
    }
}

/// Ordered set of generated units keyed by output key.
///
/// Adding a unit under an existing key replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSet {
    units: Vec<GeneratedUnit>,
}

impl UnitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a unit, returning the one it replaced, if any.
    pub fn push(&mut self, unit: GeneratedUnit) -> Option<GeneratedUnit> {
        match self.units.iter_mut().find(|u| u.key == unit.key) {
            Some(existing) => Some(std::mem::replace(existing, unit)),
            None => {
                self.units.push(unit);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|u| u.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<'a> IntoIterator for &'a UnitSet {
    type Item = &'a GeneratedUnit;
    type IntoIter = std::slice::Iter<'a, GeneratedUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_name() {
        let marker = Marker::default();
        assert_eq!(marker.qualified_name(), "color_codegen::ColorGenerator");
        assert_eq!(marker.name(), "ColorGenerator");
        assert_eq!(Marker::new("::a::B").qualified_name(), "a::B");
        assert_eq!(Marker::new("Bare").name(), "Bare");
    }

    #[test]
    fn test_marker_matches_exactly() {
        let marker = Marker::default();
        assert!(marker.matches("color_codegen::ColorGenerator"));
        assert!(!marker.matches("ColorGenerator"));
        assert!(!marker.matches("other::ColorGenerator"));
        assert!(!marker.matches("color_codegen::colorgenerator"));
    }

    #[test]
    fn test_unit_set_replaces_same_key() {
        let mut units = UnitSet::new();
        assert!(units.push(GeneratedUnit::new("a.g.rs", "one")).is_none());
        units.push(GeneratedUnit::new("b.g.rs", "two"));
        let replaced = units.push(GeneratedUnit::new("a.g.rs", "three"));

        assert_eq!(replaced.map(|u| u.source), Some("one".to_string()));
        assert_eq!(units.len(), 2);
        assert_eq!(units.get("a.g.rs").map(|u| u.source.as_str()), Some("three"));
        let keys: Vec<_> = units.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, ["a.g.rs", "b.g.rs"]);
    }
}
