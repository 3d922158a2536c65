//! Print the colors the build-time probe found.

use color_codegen_example::{GeneratedCode, Theme};

fn main() {
    GeneratedCode::print_color();
    println!("default accent: {}", Theme::default().accent);
}
