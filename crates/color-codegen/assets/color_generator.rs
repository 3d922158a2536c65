// Auto-generated by color-codegen
// DO NOT EDIT MANUALLY

/// Marks a declaration as a consumer of color code generation.
///
/// Implemented by `#[derive(ColorGenerator)]`. Include this file at the crate
/// root so the derive's expansion can name it.
#[allow(dead_code)]
pub trait ColorGenerator {}
