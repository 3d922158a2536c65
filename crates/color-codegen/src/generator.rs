//! Session driver: marker emission, selection, probing and synthesis.

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::extractor::SourceDeclarations;
use crate::metadata::{SourceTypeMetadata, TypeMetadataSource, TypeTable};
use crate::prober::Prober;
use crate::registry::MarkerRegistry;
use crate::selector::{DeclarationSource, select_declarations};
use crate::synthesizer::{SynthesisOptions, synthesize};
use crate::types::{ConsumerSignal, GeneratedUnit, Marker, ProbeOutcome, UnitSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Everything one session produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOutput {
    /// Declarations that carry the marker, in declaration order.
    pub signals: Vec<ConsumerSignal>,
    /// Probe outcomes in request order. Empty when nothing was selected.
    pub outcomes: Vec<ProbeOutcome>,
    /// The marker unit, followed by the synthesized unit when there is one.
    pub units: UnitSet,
    /// Every key this session is responsible for, produced or not.
    pub owned_keys: Vec<String>,
}

impl SessionOutput {
    pub fn unit(&self, key: &str) -> Option<&GeneratedUnit> {
        self.units.get(key)
    }

    /// Write every unit to `dir/<key>`, creating `dir` if needed.
    ///
    /// Files whose content is already up to date are left untouched so their
    /// modification time does not trigger rebuilds. Files for owned keys the
    /// session did not produce are removed.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| Error::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        for unit in &self.units {
            let path = dir.join(&unit.key);
            if fs::read_to_string(&path).is_ok_and(|existing| existing == unit.source) {
                tracing::debug!(path = %path.display(), "unit unchanged");
                continue;
            }
            fs::write(&path, &unit.source).map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "wrote unit");
        }

        for key in &self.owned_keys {
            if self.units.get(key).is_some() {
                continue;
            }
            let path = dir.join(key);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed stale unit"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(Error::Write { path, source }),
            }
        }
        Ok(())
    }
}

/// Runs generation sessions.
///
/// Typical use is from `build.rs`:
///
/// ```no_run
/// use color_codegen::CodeGenerator;
///
/// let out_dir = std::env::var("OUT_DIR").unwrap();
/// CodeGenerator::new()
///     .add_source_file("src/lib.rs").unwrap()
///     .write_to_dir(out_dir).unwrap();
/// println!("cargo:rerun-if-changed=src/lib.rs");
/// ```
///
/// A session never mutates the generator, so the same generator yields the
/// same output for the same sources.
#[derive(Debug, Clone, Default)]
pub struct CodeGenerator {
    config: GeneratorConfig,

    /// Overrides the compiled-in marker source.
    marker_source: Option<PathBuf>,

    /// Declarations collected through the `add_source_*` methods.
    sources: SourceDeclarations,
}

impl CodeGenerator {
    /// Create a generator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator from a loaded configuration.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Set a custom header comment for the synthesized unit.
    pub fn set_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.config.header = Some(header.into());
        self
    }

    /// Set the qualified path of the type whose constants are probed.
    pub fn set_reference_type(&mut self, path: impl Into<String>) -> &mut Self {
        self.config.reference_type = path.into();
        self
    }

    /// Append a constant name to probe.
    pub fn add_probe(&mut self, name: impl Into<String>) -> &mut Self {
        self.config.probes.push(name.into());
        self
    }

    /// Replace the probed constant names.
    pub fn set_probes(&mut self, names: &[impl AsRef<str>]) -> &mut Self {
        self.config.probes = names.iter().map(|n| n.as_ref().to_string()).collect();
        self
    }

    /// Load the marker's declaration source from `path` instead of the
    /// compiled-in copy.
    pub fn set_marker_source(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.marker_source = Some(path.into());
        self
    }

    /// Parse Rust source from a string and collect its declarations.
    pub fn add_source_str(&mut self, source: &str) -> Result<&mut Self> {
        self.sources.add_source_str(source)?;
        Ok(self)
    }

    /// Parse a single Rust source file and collect its declarations.
    pub fn add_source_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        self.sources.add_source_file(path)?;
        Ok(self)
    }

    /// Recursively scan a directory for `.rs` files and collect their declarations.
    pub fn add_source_dir(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        self.sources.add_source_dir(path)?;
        Ok(self)
    }

    /// The marker registry this generator's sessions emit from.
    pub fn marker_registry(&self) -> Result<MarkerRegistry> {
        let marker = Marker::new(self.config.marker.as_str());
        let registry = match &self.marker_source {
            Some(path) => MarkerRegistry::from_file(marker, path)?,
            None => MarkerRegistry::embedded_for(marker)?,
        };
        Ok(registry.with_output_key(self.config.marker_output_key.as_str()))
    }

    /// Run one session over the collected sources and the embedded
    /// reference type metadata.
    pub fn generate(&self) -> Result<SessionOutput> {
        match SourceTypeMetadata::embedded() {
            Ok(metadata) => self.run(&self.sources, &metadata),
            Err(err) => {
                tracing::warn!(error = %err, "embedded type metadata unavailable");
                self.run(&self.sources, &TypeTable::new())
            }
        }
    }

    /// Run one session and write its units to `dir`.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<SessionOutput> {
        let output = self.generate()?;
        output.write_to_dir(dir)?;
        Ok(output)
    }

    /// Run one session against explicit declaration and metadata sources.
    ///
    /// Only marker loading and configuration errors abort the session;
    /// metadata problems make the affected probes report absent.
    pub fn run<D, M>(&self, declarations: &D, metadata: &M) -> Result<SessionOutput>
    where
        D: DeclarationSource + ?Sized,
        M: TypeMetadataSource + ?Sized,
    {
        let span = tracing::info_span!("color_codegen_session", marker = %self.config.marker);
        let _enter = span.enter();

        self.config.validate()?;
        let registry = self.marker_registry()?;

        let mut output = SessionOutput {
            owned_keys: vec![
                registry.output_key().to_string(),
                self.config.output_key.clone(),
            ],
            ..SessionOutput::default()
        };
        output.units.push(registry.emit_marker());

        output.signals = select_declarations(declarations, registry.marker()).collect();
        for signal in &output.signals {
            tracing::debug!(declaration = %signal.declaration, "declaration carries marker");
        }
        if output.signals.is_empty() {
            tracing::info!("no declaration carries the marker; skipping synthesis");
            return Ok(output);
        }

        let prober = Prober::new(metadata, self.config.reference_type.as_str());
        output.outcomes = prober.probe_all(self.config.probes.iter().map(String::as_str));

        if let Some(unit) = synthesize(&output.signals, &output.outcomes, &self.synthesis_options()) {
            output.units.push(unit);
        }

        tracing::info!(
            signals = output.signals.len(),
            found = output.outcomes.iter().filter(|o| o.found).count(),
            units = output.units.len(),
            "session complete"
        );
        Ok(output)
    }

    fn synthesis_options(&self) -> SynthesisOptions {
        SynthesisOptions {
            output_key: self.config.output_key.clone(),
            header: self.config.header.clone(),
            container: self.config.container.clone(),
            operation: self.config.operation.clone(),
            reference_type: self.config.reference_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemberInfo;

    const CONSUMER: &str = r#"
        use color_codegen::ColorGenerator;

        #[derive(ColorGenerator)]
        pub struct Theme;
    "#;

    fn color_table(names: &[&str]) -> TypeTable {
        TypeTable::new().with_type(
            "Color",
            names.iter().map(|n| MemberInfo::public_static(*n, "Color")),
        )
    }

    fn generator(probes: &[&str]) -> CodeGenerator {
        let mut codegen = CodeGenerator::new();
        codegen.set_reference_type("Color").set_probes(probes);
        codegen.add_source_str(CONSUMER).unwrap();
        codegen
    }

    fn conditional_lines(output: &SessionOutput) -> Vec<String> {
        output
            .unit("colors.g.rs")
            .unwrap()
            .source
            .lines()
            .filter(|l| l.contains("println!"))
            .map(|l| l.trim().to_string())
            .collect()
    }

    #[test]
    fn test_scenario_red_found_rebecca_purple_missing() {
        let codegen = generator(&["Red", "RebeccaPurple"]);
        let metadata = color_table(&["Red", "Blue"]);

        let output = codegen.run(&codegen.sources, &metadata).unwrap();

        let found: Vec<_> = output.outcomes.iter().map(|o| o.found).collect();
        assert_eq!(found, [true, false]);
        assert_eq!(
            conditional_lines(&output),
            [r#"::std::println!("{}", "ColorGenerator found Color::Red");"#]
        );
    }

    #[test]
    fn test_scenario_rebecca_purple_only() {
        let codegen = generator(&["RebeccaPurple"]);
        let metadata = color_table(&["RebeccaPurple"]);

        let output = codegen.run(&codegen.sources, &metadata).unwrap();

        let found: Vec<_> = output.outcomes.iter().map(|o| o.found).collect();
        assert_eq!(found, [true]);
        assert_eq!(
            conditional_lines(&output),
            [r#"::std::println!("{}", "ColorGenerator found Color::RebeccaPurple");"#]
        );
    }

    #[test]
    fn test_scenario_no_marker_emits_marker_unit_only() {
        let mut codegen = CodeGenerator::new();
        codegen
            .add_source_str("#[derive(Debug)] pub struct Plain;")
            .unwrap();

        let output = codegen.generate().unwrap();

        assert!(output.signals.is_empty());
        assert!(output.outcomes.is_empty());
        assert_eq!(output.units.len(), 1);
        assert!(output.unit("color_generator.g.rs").is_some());
        assert!(output.unit("colors.g.rs").is_none());
    }

    #[test]
    fn test_many_signals_one_unit() {
        let mut codegen = generator(&["Red"]);
        codegen
            .add_source_str(
                r#"
                #[derive(color_codegen::ColorGenerator)]
                struct Second;
                #[derive(color_codegen::ColorGenerator)]
                struct Third;
            "#,
            )
            .unwrap();

        let output = codegen.run(&codegen.sources, &color_table(&["Red"])).unwrap();
        assert_eq!(output.signals.len(), 3);
        assert_eq!(output.units.len(), 2);
        assert_eq!(conditional_lines(&output).len(), 1);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let mut codegen = CodeGenerator::new();
        codegen.add_source_str(CONSUMER).unwrap();

        let first = codegen.generate().unwrap();
        let second = codegen.generate().unwrap();
        assert_eq!(first, second);

        let keys: Vec<_> = first.units.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, ["color_generator.g.rs", "colors.g.rs"]);
    }

    #[test]
    fn test_generate_probes_embedded_color() {
        let mut codegen = CodeGenerator::new();
        codegen.add_source_str(CONSUMER).unwrap();
        codegen.add_probe("CORNFLOWER_BLUE");

        let output = codegen.generate().unwrap();
        let found: Vec<_> = output
            .outcomes
            .iter()
            .map(|o| (o.name.as_str(), o.found))
            .collect();
        assert_eq!(
            found,
            [("RED", true), ("REBECCA_PURPLE", true), ("CORNFLOWER_BLUE", false)]
        );

        let source = &output.unit("colors.g.rs").unwrap().source;
        assert!(source.contains("ColorGenerator found Color::RED"));
        assert!(source.contains("ColorGenerator found Color::REBECCA_PURPLE"));
        assert!(!source.contains("CORNFLOWER_BLUE"));
    }

    #[test]
    fn test_unknown_reference_type_degrades() {
        let mut codegen = CodeGenerator::new();
        codegen.add_source_str(CONSUMER).unwrap();
        codegen.set_reference_type("color_codegen::Colour");

        let output = codegen.generate().unwrap();
        assert!(output.outcomes.iter().all(|o| !o.found));
        assert!(conditional_lines(&output).is_empty());
    }

    #[test]
    fn test_missing_marker_source_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut codegen = CodeGenerator::new();
        codegen.add_source_str(CONSUMER).unwrap();
        codegen.set_marker_source(dir.path().join("missing.rs"));

        let err = codegen.generate().unwrap_err();
        assert!(matches!(err, Error::MissingMarkerSource { .. }));
    }

    #[test]
    fn test_marker_mismatch_with_embedded_source_aborts() {
        let config = GeneratorConfig {
            marker: "color_codegen::Palette".to_string(),
            ..GeneratorConfig::default()
        };
        let err = CodeGenerator::with_config(config).generate().unwrap_err();
        assert!(matches!(err, Error::InvalidMarkerSource { .. }));
    }

    #[test]
    fn test_invalid_config_aborts() {
        let mut codegen = CodeGenerator::new();
        codegen.set_reference_type("not a path");
        assert!(matches!(codegen.generate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut codegen = CodeGenerator::new();
        codegen.set_header("Palette probes");
        codegen.add_source_str(CONSUMER).unwrap();

        let output = codegen.write_to_dir(dir.path()).unwrap();
        let written = fs::read_to_string(dir.path().join("colors.g.rs")).unwrap();
        assert_eq!(written, output.unit("colors.g.rs").unwrap().source);
        assert!(written.starts_with("// Palette probes\n"));
        assert!(dir.path().join("color_generator.g.rs").exists());

        // Same key, new text: the file is replaced
        codegen.set_probes(&["BLUE"]);
        codegen.write_to_dir(dir.path()).unwrap();
        let rewritten = fs::read_to_string(dir.path().join("colors.g.rs")).unwrap();
        assert!(rewritten.contains("Color::BLUE"));
        assert!(!rewritten.contains("Color::RED"));
    }

    #[test]
    fn test_write_to_dir_removes_unit_when_marker_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let mut with_marker = CodeGenerator::new();
        with_marker.add_source_str(CONSUMER).unwrap();
        with_marker.write_to_dir(dir.path()).unwrap();
        assert!(dir.path().join("colors.g.rs").exists());

        let mut without_marker = CodeGenerator::new();
        without_marker
            .add_source_str("#[derive(Debug)] pub struct Theme;")
            .unwrap();
        let output = without_marker.write_to_dir(dir.path()).unwrap();

        assert!(output.unit("colors.g.rs").is_none());
        assert!(!dir.path().join("colors.g.rs").exists());
        assert!(dir.path().join("color_generator.g.rs").exists());

        // Nothing to remove the second time around
        without_marker.write_to_dir(dir.path()).unwrap();
    }
}
