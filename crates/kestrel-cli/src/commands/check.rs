//! `kestrel check`: run code generation without writing anything

use std::path::{Path, PathBuf};

use kestrel_codegen::{CompileOutput, Compiler};

use super::{load_program, source_root};
use crate::config::Config;
use crate::output::{renderer_for, Reporter};

/// Compile `input` and report every error
pub fn execute(input: &Path, config: Option<PathBuf>, reporter: &mut Reporter) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::discover(config.as_deref(), &cwd)?;
    let program = load_program(input)?;
    let renderer = renderer_for(&program, source_root(input));

    match Compiler::new(config.emit).run(&program) {
        Ok(CompileOutput { units, errors, .. }) if errors.is_empty() => {
            reporter.success(&format!("{} module(s) OK", units.len()));
            Ok(())
        }
        Ok(CompileOutput { errors, .. }) => {
            reporter.errors(&renderer, &errors);
            anyhow::bail!("check failed: {} error(s)", errors.len())
        }
        Err(errors) => {
            reporter.errors(&renderer, errors.iter());
            anyhow::bail!("check failed: {} error(s)", errors.errors.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_class_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("program.json");
        std::fs::write(
            &input,
            r#"{
  "modules": [
    { "name": "app.Ok", "classes": [{ "name": "app.Ok" }] },
    { "name": "app.Empty" }
  ]
}"#,
        )
        .unwrap();
        let config = dir.path().join("kestrel.toml");
        std::fs::write(&config, "").unwrap();

        let mut reporter = Reporter::new(termcolor::ColorChoice::Never);
        let err = execute(&input, Some(config), &mut reporter).unwrap_err();
        assert_eq!(err.to_string(), "check failed: 1 error(s)");
    }

    #[test]
    fn test_malformed_ir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("program.json");
        std::fs::write(&input, "{ \"modules\": 3 }").unwrap();
        let config = dir.path().join("kestrel.toml");
        std::fs::write(&config, "").unwrap();

        let mut reporter = Reporter::new(termcolor::ColorChoice::Never);
        let err = execute(&input, Some(config), &mut reporter).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing IR"), "{:#}", err);
    }
}
