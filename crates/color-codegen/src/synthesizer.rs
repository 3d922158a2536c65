//! Rust source synthesis from probe outcomes.

use crate::types::{ConsumerSignal, GeneratedUnit, ProbeOutcome};

/// ANSI escape that switches the terminal foreground to magenta.
const FOREGROUND_MAGENTA: &str = "\\x1b[35m";

/// ANSI escape that restores the terminal's default attributes.
const RESET_ATTRIBUTES: &str = "\\x1b[0m";

const DEFAULT_HEADER: &str = "Auto-generated by color-codegen\nDO NOT EDIT MANUALLY";

/// What the synthesized unit is called and where its operation lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Output key of the generated unit.
    pub output_key: String,
    /// Header comment; `None` uses the default banner.
    pub header: Option<String>,
    /// Name of the generated unit struct that hosts the operation.
    pub container: String,
    /// Name of the generated associated function.
    pub operation: String,
    /// Qualified path of the probed type, used in the emitted messages.
    pub reference_type: String,
}

/// Ordered `(found, statement)` pairs, rendered once into the operation body.
#[derive(Debug, Clone, Default)]
pub struct GeneratedBody {
    statements: Vec<(bool, String)>,
}

impl GeneratedBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// One statement per outcome, in outcome order.
    pub fn from_outcomes(outcomes: &[ProbeOutcome], reference_type: &str) -> Self {
        let display = reference_type.rsplit("::").next().unwrap_or(reference_type);
        let mut body = Self::new();
        for outcome in outcomes {
            let message = format!("ColorGenerator found {display}::{}", outcome.name);
            body.push(outcome.found, format!("::std::println!(\"{{}}\", {message:?});"));
        }
        body
    }

    pub fn push(&mut self, include: bool, statement: impl Into<String>) -> &mut Self {
        self.statements.push((include, statement.into()));
        self
    }

    /// Number of statements that will be rendered.
    pub fn included(&self) -> usize {
        self.statements.iter().filter(|(include, _)| *include).count()
    }

    /// Render the included statements, one per line, at the given indent.
    pub fn render(&self, indent: &str) -> String {
        let mut output = String::new();
        for (_, statement) in self.statements.iter().filter(|(include, _)| *include) {
            output.push_str(indent);
            output.push_str(statement);
            output.push('\n');
        }
        output
    }
}

/// Produce the generated unit, or nothing when no declaration asked for it.
pub fn synthesize(
    signals: &[ConsumerSignal],
    outcomes: &[ProbeOutcome],
    options: &SynthesisOptions,
) -> Option<GeneratedUnit> {
    if signals.is_empty() {
        return None;
    }

    let body = GeneratedBody::from_outcomes(outcomes, &options.reference_type);
    let mut output = String::new();

    for line in options.header.as_deref().unwrap_or(DEFAULT_HEADER).lines() {
        output.push_str("//");
        if !line.is_empty() {
            output.push(' ');
            output.push_str(line);
        }
        output.push('\n');
    }
    output.push('\n');

    let container = &options.container;
    let operation = &options.operation;
    output.push_str(&format!("pub struct {container};\n"));
    output.push('\n');
    output.push_str(&format!("impl {container} {{\n"));
    output.push_str(&format!("    pub fn {operation}() {{\n"));

    // Scoped foreground color: the guard resets it on every exit path
    output.push_str("        struct ForegroundColor;\n\n");
    output.push_str("        impl Drop for ForegroundColor {\n");
    output.push_str("            fn drop(&mut self) {\n");
    output.push_str(&format!("                ::std::print!(\"{RESET_ATTRIBUTES}\");\n"));
    output.push_str("            }\n");
    output.push_str("        }\n\n");
    output.push_str(&format!("        ::std::print!(\"{FOREGROUND_MAGENTA}\");\n"));
    output.push_str("        let _foreground = ForegroundColor;\n");

    output.push_str(&body.render("        "));

    output.push_str("    }\n");
    output.push_str("}\n");

    tracing::debug!(
        key = %options.output_key,
        statements = body.included(),
        "synthesized unit"
    );
    Some(GeneratedUnit::new(options.output_key.clone(), output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeclarationId, DeclarationKind};

    fn options() -> SynthesisOptions {
        SynthesisOptions {
            output_key: "colors.g.rs".to_string(),
            header: None,
            container: "GeneratedCode".to_string(),
            operation: "print_color".to_string(),
            reference_type: "Color".to_string(),
        }
    }

    fn signal() -> ConsumerSignal {
        ConsumerSignal {
            declaration: DeclarationId {
                origin: "<test>".to_string(),
                path: "Theme".to_string(),
                kind: DeclarationKind::Struct,
            },
            enabled: true,
        }
    }

    fn outcome(name: &str, found: bool) -> ProbeOutcome {
        ProbeOutcome {
            name: name.to_string(),
            found,
        }
    }

    #[test]
    fn test_no_signals_no_unit() {
        let outcomes = [outcome("Red", true)];
        assert!(synthesize(&[], &outcomes, &options()).is_none());
    }

    #[test]
    fn test_only_found_names_are_emitted() {
        let outcomes = [outcome("Red", true), outcome("RebeccaPurple", false)];
        let unit = synthesize(&[signal()], &outcomes, &options()).unwrap();

        assert_eq!(unit.key, "colors.g.rs");
        assert!(unit.source.contains("ColorGenerator found Color::Red"));
        assert!(!unit.source.contains("RebeccaPurple"));
        assert_eq!(unit.source.matches("::std::println!").count(), 1);
    }

    #[test]
    fn test_statements_follow_request_order() {
        let outcomes = [outcome("Blue", true), outcome("Red", true)];
        let unit = synthesize(&[signal()], &outcomes, &options()).unwrap();

        let blue = unit.source.find("Color::Blue").unwrap();
        let red = unit.source.find("Color::Red").unwrap();
        assert!(blue < red);
    }

    #[test]
    fn test_layout() {
        let outcomes = [outcome("RED", true)];
        let mut opts = options();
        opts.reference_type = "color_codegen::Color".to_string();
        let unit = synthesize(&[signal()], &outcomes, &opts).unwrap();

        let expected = r#"// Auto-generated by color-codegen
// DO NOT EDIT MANUALLY

pub struct GeneratedCode;

impl GeneratedCode {
    pub fn print_color() {
        struct ForegroundColor;

        impl Drop for ForegroundColor {
            fn drop(&mut self) {
                ::std::print!("\x1b[0m");
            }
        }

        ::std::print!("\x1b[35m");
        let _foreground = ForegroundColor;
        ::std::println!("{}", "ColorGenerator found Color::RED");
    }
}
"#;
        assert_eq!(unit.source, expected);
    }

    #[test]
    fn test_prologue_and_epilogue_without_matches() {
        let outcomes = [outcome("Red", false)];
        let unit = synthesize(&[signal()], &outcomes, &options()).unwrap();

        assert!(unit.source.contains("::std::print!(\"\\x1b[35m\");"));
        assert!(unit.source.contains("::std::print!(\"\\x1b[0m\");"));
        assert!(!unit.source.contains("println!"));
    }

    #[test]
    fn test_custom_header_and_names() {
        let mut opts = options();
        opts.header = Some("Palette probes\n\nRegenerated by build.rs".to_string());
        opts.container = "Palette".to_string();
        opts.operation = "announce".to_string();

        let unit = synthesize(&[signal()], &[], &opts).unwrap();
        assert!(unit.source.starts_with("// Palette probes\n//\n// Regenerated by build.rs\n\n"));
        assert!(unit.source.contains("pub struct Palette;"));
        assert!(unit.source.contains("    pub fn announce() {"));
    }

    #[test]
    fn test_message_is_escaped() {
        let body = GeneratedBody::from_outcomes(&[outcome("Say \"hi\"", true)], "Color");
        assert_eq!(
            body.render(""),
            "::std::println!(\"{}\", \"ColorGenerator found Color::Say \\\"hi\\\"\");\n"
        );
    }
}
