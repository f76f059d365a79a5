//! `kestrel deps`: print the load-time dependencies of each class

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use kestrel_codegen::ir::QualifiedName;
use kestrel_codegen::{deps, CompileErrors, Program, SymbolTable};

use super::{load_program, source_root};
use crate::config::Config;
use crate::output::{renderer_for, Reporter};

/// Dependencies keyed by class, in program order
pub type DependencyReport = IndexMap<QualifiedName, BTreeSet<QualifiedName>>;

/// Collect dependencies of every class, or of the classes of `module`
pub fn collect(program: &Program, config: &Config, module: Option<&str>) -> Result<DependencyReport, CompileErrors> {
    let table = SymbolTable::from_program(program, config.emit.name_style)?;
    let mut report = IndexMap::new();
    let mut errors = Vec::new();
    for m in program
        .modules
        .iter()
        .filter(|m| module.map_or(true, |name| m.name.as_str() == name))
    {
        for class in &m.classes {
            match deps::collect(class, &table, &config.emit) {
                Ok(set) => {
                    report.insert(class.name.clone(), set);
                }
                Err(err) => errors.push(err),
            }
        }
    }
    if errors.is_empty() {
        Ok(report)
    } else {
        Err(CompileErrors::new(errors))
    }
}

/// Print the report as text or JSON on stdout
pub fn execute(
    input: &Path,
    config: Option<PathBuf>,
    module: Option<String>,
    json: bool,
    reporter: &mut Reporter,
) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::discover(config.as_deref(), &cwd)?;
    let program = load_program(input)?;

    if let Some(name) = &module {
        if !program.modules.iter().any(|m| m.name.as_str() == name) {
            anyhow::bail!("no module named {}", name);
        }
    }

    let report = match collect(&program, &config, module.as_deref()) {
        Ok(report) => report,
        Err(errors) => {
            reporter.errors(&renderer_for(&program, source_root(input)), errors.iter());
            anyhow::bail!("deps failed: {} error(s)", errors.errors.len());
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report).context("writing JSON")?;
        writeln!(out)?;
    } else {
        for (class, set) in &report {
            writeln!(out, "{}", class)?;
            for dep in set {
                writeln!(out, "  {}", dep)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> Program {
        Program::from_json(
            r#"{
  "externs": [{ "name": "core.Base" }, { "name": "net.Service" }],
  "modules": [
    { "name": "app.A", "classes": [{ "name": "app.A", "base": "core.Base" }] },
    {
      "name": "app.B",
      "classes": [{
        "name": "app.B",
        "base": "app.A",
        "fields": [{ "name": "service", "type": "net.Service" }]
      }]
    }
  ]
}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_report_in_program_order() {
        let report = collect(&program(), &Config::default(), None).unwrap();
        let classes: Vec<&str> = report.keys().map(|k| k.as_str()).collect();
        assert_eq!(classes, vec!["app.A", "app.B"]);
        let b: Vec<&str> = report[1].iter().map(|d| d.as_str()).collect();
        assert_eq!(b, vec!["app.A", "net.Service"]);
    }

    #[test]
    fn test_module_filter() {
        let report = collect(&program(), &Config::default(), Some("app.A")).unwrap();
        assert_eq!(report.len(), 1);
        assert!(report.contains_key(&QualifiedName::new("app.A")));
    }
}
