//! `kestrel build`

use std::path::{Path, PathBuf};

use kestrel_codegen::{Compiler, NameStyle};

use super::{load_program, source_root};
use crate::config::Config;
use crate::output::{renderer_for, write_units, Reporter};

/// Command-line overrides for a build
#[derive(Debug, Default)]
pub struct BuildArgs {
    pub input: PathBuf,
    pub out_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub name_style: Option<NameStyle>,
    pub no_header: bool,
}

/// Apply command-line overrides on top of the project configuration
pub fn resolve_config(args: &BuildArgs, cwd: &Path) -> anyhow::Result<Config> {
    let mut config = Config::discover(args.config.as_deref(), cwd)?;
    if let Some(dir) = &args.out_dir {
        config.output.dir = dir.clone();
    }
    if let Some(jobs) = args.jobs {
        config.emit.jobs = jobs;
    }
    if let Some(style) = args.name_style {
        config.emit.name_style = style;
    }
    if args.no_header {
        config.emit.emit_file_overview = false;
    }
    Ok(config)
}

/// Compile the program and write every module that succeeded
pub fn execute(args: BuildArgs, reporter: &mut Reporter) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = resolve_config(&args, &cwd)?;
    let program = load_program(&args.input)?;

    let compiler = Compiler::new(config.emit.clone());
    let output = match compiler.run(&program) {
        Ok(output) => output,
        Err(errors) => {
            reporter.errors(&renderer_for(&program, source_root(&args.input)), errors.iter());
            anyhow::bail!("build failed: {} error(s)", errors.errors.len());
        }
    };

    let written = write_units(&config.output.dir, &output.units)?;
    if output.is_success() {
        reporter.success(&format!(
            "Built {} module(s) into {}",
            written.len(),
            config.output.dir.display()
        ));
        Ok(())
    } else {
        reporter.errors(&renderer_for(&program, source_root(&args.input)), &output.errors);
        reporter.failure(&format!(
            "Built {} module(s); {} error(s)",
            written.len(),
            output.errors.len()
        ));
        anyhow::bail!("build failed: {} error(s)", output.errors.len())
    }
}
