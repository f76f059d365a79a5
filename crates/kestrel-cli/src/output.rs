//! Terminal output and writing emitted units

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use kestrel_codegen::{CodegenError, DiagnosticRenderer, OutputUnit, Program};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from the `--color` flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Write every unit under `out_dir`, returning the written paths
pub fn write_units(out_dir: &Path, units: &[OutputUnit]) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(units.len());
    for unit in units {
        let path = out_dir.join(&unit.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&path, &unit.text).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(module = %unit.module, path = %path.display(), "wrote unit");
        written.push(path);
    }
    Ok(written)
}

/// Diagnostic renderer preloaded with every readable module source
pub fn renderer_for(program: &Program, base: &Path) -> DiagnosticRenderer {
    let mut renderer = DiagnosticRenderer::new();
    for source in program.modules.iter().filter_map(|m| m.source.as_ref()) {
        if let Ok(text) = std::fs::read_to_string(base.join(source)) {
            renderer.add_source(source.clone(), text);
        }
    }
    renderer
}

/// Styled stderr reporter
pub struct Reporter {
    stderr: StandardStream,
}

impl Reporter {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stderr: StandardStream::stderr(choice),
        }
    }

    /// Print each error as a diagnostic
    pub fn errors<'e>(
        &mut self,
        renderer: &DiagnosticRenderer,
        errors: impl IntoIterator<Item = &'e CodegenError>,
    ) {
        for error in errors {
            if renderer.emit(&mut self.stderr, error).is_err() {
                let _ = writeln!(self.stderr, "error: {}", error);
            }
        }
    }

    /// Green status line
    pub fn success(&mut self, text: &str) {
        self.status(text, Color::Green);
    }

    /// Red status line
    pub fn failure(&mut self, text: &str) {
        self.status(text, Color::Red);
    }

    fn status(&mut self, text: &str, color: Color) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = writeln!(self.stderr, "{}", text);
        let _ = self.stderr.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_codegen::ir::QualifiedName;

    #[test]
    fn test_write_units_creates_package_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let unit = OutputUnit {
            module: QualifiedName::new("app.views.Main"),
            provide: "app.views.Main".into(),
            requires: Vec::new(),
            path: PathBuf::from("app/views/Main.js"),
            text: "goog.provide('app.views.Main');\n".into(),
        };
        let written = write_units(dir.path(), &[unit]).unwrap();
        assert_eq!(written, vec![dir.path().join("app/views/Main.js")]);
        assert_eq!(
            std::fs::read_to_string(&written[0]).unwrap(),
            "goog.provide('app.views.Main');\n"
        );
    }

    #[test]
    fn test_color_flag() {
        if std::env::var_os("NO_COLOR").is_none() {
            assert_eq!(resolve_color_choice(Some("never")), ColorChoice::Never);
            assert_eq!(resolve_color_choice(Some("always")), ColorChoice::Always);
        }
        assert_ne!(resolve_color_choice(Some("never")), ColorChoice::Always);
    }
}
