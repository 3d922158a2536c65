use color_codegen::CodeGenerator;
use std::env;
use std::path::PathBuf;

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut codegen = CodeGenerator::new();

    codegen.set_header(
        "Generated color probes for color-codegen-example\n\
         Regenerated from src/lib.rs on every build",
    );

    // Pick up every declaration annotated with #[derive(ColorGenerator)]
    codegen
        .add_source_file(manifest_dir.join("src/lib.rs"))
        .expect("Failed to parse source file");

    // Write to OUT_DIR (standard cargo location)
    codegen
        .write_to_dir(&out_dir)
        .expect("Failed to write generated units");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=build.rs");
}
