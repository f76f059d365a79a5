//! Subcommand implementations

pub mod build;
pub mod check;
pub mod deps;

use std::path::Path;

use anyhow::Context;
use kestrel_codegen::Program;

/// Load a front-end IR dump
pub fn load_program(input: &Path) -> anyhow::Result<Program> {
    let text = std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let program =
        Program::from_json(&text).with_context(|| format!("parsing IR from {}", input.display()))?;
    tracing::debug!(
        input = %input.display(),
        modules = program.modules.len(),
        externs = program.externs.len(),
        "loaded program"
    );
    Ok(program)
}

/// Directory module source paths are relative to
pub fn source_root(input: &Path) -> &Path {
    input.parent().unwrap_or_else(|| Path::new("."))
}
