//! Example crate demonstrating color-codegen usage.
//!
//! `build.rs` scans this file, finds the `#[derive(ColorGenerator)]` below
//! and writes two units to `OUT_DIR`: the marker trait the derive implements,
//! and `GeneratedCode`, whose `print_color` reports which named colors the
//! `Color` type provides.

use color_codegen::ColorGenerator;

include!(concat!(env!("OUT_DIR"), "/color_generator.g.rs"));

/// A theme that opts into color generation.
#[derive(ColorGenerator, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: color_codegen::Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: color_codegen::Color::REBECCA_PURPLE,
        }
    }
}

include!(concat!(env!("OUT_DIR"), "/colors.g.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_marked<T: ColorGenerator>() {}

    #[test]
    fn test_theme_carries_marker() {
        assert_marked::<Theme>();
    }

    #[test]
    fn test_generated_operation_runs() {
        GeneratedCode::print_color();
    }

    #[test]
    fn test_generated_unit_lists_found_colors() {
        let generated = include_str!(concat!(env!("OUT_DIR"), "/colors.g.rs"));
        assert!(generated.contains("ColorGenerator found Color::RED"));
        assert!(generated.contains("ColorGenerator found Color::REBECCA_PURPLE"));
    }

    #[test]
    fn test_default_accent() {
        assert_eq!(Theme::default().accent.to_string(), "#663399");
    }
}
