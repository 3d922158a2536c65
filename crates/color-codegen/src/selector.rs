//! Marker-based declaration selection.

use crate::types::{ConsumerSignal, Declaration, Marker};

/// Anything that can enumerate a compilation's declarations and their annotations.
///
/// [`SourceDeclarations`](crate::SourceDeclarations) is the `syn`-backed
/// implementation; hosts that already hold resolved declarations can
/// implement this directly.
pub trait DeclarationSource {
    /// All declarations, in the compilation's natural order.
    fn declarations(&self) -> &[Declaration];
}

impl DeclarationSource for [Declaration] {
    fn declarations(&self) -> &[Declaration] {
        self
    }
}

impl DeclarationSource for Vec<Declaration> {
    fn declarations(&self) -> &[Declaration] {
        self
    }
}

/// Lazily yield one [`ConsumerSignal`] per declaration carrying `marker`.
///
/// A declaration matches when one of its resolved annotations equals the
/// marker's qualified name exactly. Order follows the source's declaration
/// order, and a declaration is reported once even if annotated twice.
pub fn select_declarations<'a, S>(
    source: &'a S,
    marker: &'a Marker,
) -> impl Iterator<Item = ConsumerSignal> + 'a
where
    S: DeclarationSource + ?Sized,
{
    source
        .declarations()
        .iter()
        .filter(move |decl| decl.annotations.iter().any(|a| marker.matches(a)))
        .map(|decl| ConsumerSignal {
            declaration: decl.id.clone(),
            enabled: true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceDeclarations;
    use crate::types::{DeclarationId, DeclarationKind};

    fn declaration(path: &str, annotations: &[&str]) -> Declaration {
        Declaration {
            id: DeclarationId {
                origin: "<test>".to_string(),
                path: path.to_string(),
                kind: DeclarationKind::Struct,
            },
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_selects_in_declaration_order() {
        let decls = vec![
            declaration("B", &["color_codegen::ColorGenerator"]),
            declaration("Skipped", &["Debug"]),
            declaration("A", &["Clone", "color_codegen::ColorGenerator"]),
        ];
        let marker = Marker::default();

        let selected: Vec<_> = select_declarations(&decls, &marker)
            .map(|s| s.declaration.path)
            .collect();
        assert_eq!(selected, ["B", "A"]);
    }

    #[test]
    fn test_double_annotation_reports_once() {
        let decls = vec![declaration(
            "Twice",
            &["color_codegen::ColorGenerator", "color_codegen::ColorGenerator"],
        )];
        let marker = Marker::default();
        assert_eq!(select_declarations(&decls, &marker).count(), 1);
    }

    #[test]
    fn test_marker_identity_mismatch_yields_nothing() {
        let decls = vec![declaration("Theme", &["color_codegen::ColorGenerator"])];
        let marker = Marker::new("color_codegen::ColorGen");
        assert_eq!(select_declarations(&decls, &marker).count(), 0);
    }

    #[test]
    fn test_selects_from_parsed_source() {
        let source = r#"
            use color_codegen::ColorGenerator;

            #[derive(Debug)]
            struct NotMarked;

            #[derive(ColorGenerator)]
            struct Theme;

            #[derive(other_crate::ColorGenerator)]
            struct Foreign;

            mod nested {
                #[derive(ColorGenerator)]
                struct Unimported;

                #[derive(color_codegen::ColorGenerator)]
                struct Qualified;
            }
        "#;

        let mut decls = SourceDeclarations::new();
        decls.add_source_str(source).unwrap();
        let marker = Marker::default();

        let selected: Vec<_> = select_declarations(&decls, &marker).collect();
        let paths: Vec<_> = selected.iter().map(|s| s.declaration.path.as_str()).collect();
        assert_eq!(paths, ["Theme", "nested::Qualified"]);
        assert!(selected.iter().all(|s| s.enabled));
    }

    #[test]
    fn test_empty_source_selects_nothing() {
        let decls: Vec<Declaration> = Vec::new();
        let marker = Marker::default();
        assert!(select_declarations(&decls, &marker).next().is_none());
    }
}
