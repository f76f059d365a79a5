//! Kestrel command-line driver
//!
//! Reads the front-end's JSON IR dump and runs the code generator over it.

mod commands;
mod config;
mod logging;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kestrel_codegen::NameStyle;

use commands::build::BuildArgs;
use logging::{LogFormat, LogLevel};
use output::{resolve_color_choice, Reporter};

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(about = "Kestrel code generator: lowers checked IR to goog modules", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Log format (compact, json)
    #[arg(long, global = true, default_value = "compact")]
    log_format: String,
    /// Colored output (auto, always, never)
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate output modules
    Build {
        /// IR dump (JSON)
        input: PathBuf,
        /// Output directory (overrides [output] dir)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Configuration file (default: ./kestrel.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Worker threads (0 = one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Output identifier style
        #[arg(long, value_parser = ["dotted", "flattened"])]
        name_style: Option<String>,
        /// Omit the file overview header
        #[arg(long)]
        no_header: bool,
    },

    /// Run code generation and report errors without writing output
    Check {
        /// IR dump (JSON)
        input: PathBuf,
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the load-time dependencies of each class
    Deps {
        /// IR dump (JSON)
        input: PathBuf,
        /// Only classes of this module
        #[arg(short, long)]
        module: Option<String>,
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn parse_name_style(spec: &str) -> NameStyle {
    match spec {
        "flattened" => NameStyle::Flattened,
        _ => NameStyle::Dotted,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = LogFormat::parse(&cli.log_format)
        .ok_or_else(|| anyhow::anyhow!("unknown log format: {}", cli.log_format))?;
    let level = LogLevel::parse(&cli.log_level)
        .ok_or_else(|| anyhow::anyhow!("unknown log level: {}", cli.log_level))?;
    logging::init(format, level);

    let mut reporter = Reporter::new(resolve_color_choice(cli.color.as_deref()));

    match cli.command {
        Commands::Build {
            input,
            out_dir,
            config,
            jobs,
            name_style,
            no_header,
        } => commands::build::execute(
            BuildArgs {
                input,
                out_dir,
                config,
                jobs,
                name_style: name_style.as_deref().map(parse_name_style),
                no_header,
            },
            &mut reporter,
        ),
        Commands::Check { input, config } => commands::check::execute(&input, config, &mut reporter),
        Commands::Deps {
            input,
            module,
            config,
            json,
        } => commands::deps::execute(&input, config, module, json, &mut reporter),
    }
}
