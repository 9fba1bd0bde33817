mod catalog;
mod codelist;
mod commands;
mod config;
mod diagnostics;
mod document;
mod error;
mod markdown;
mod metadata;
mod policy;
mod pot;
mod tree;
mod types;

use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::document::Format;

#[derive(Parser)]
#[command(name = "docbabel", version, about = "Extract and substitute translatable strings in documentation sources")]
struct Cli {
    /// Config file to use instead of `.docbabel.toml` in the current directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// What to do
    #[command(subcommand)]
    command: Commands,
    /// Log every file processed
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every [[batch]] in the config for one language
    Build {
        /// Target language code
        #[arg(long, short)]
        language: String,
        /// Set a {{name}} placeholder value (repeatable)
        #[arg(long = "replace", value_name = "NAME=VALUE")]
        replacements: Vec<String>,
    },
    /// Write a gettext template of every translatable string
    Extract {
        /// Read every file as this format instead of detecting it
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Template file to write (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Files or directories to extract from
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Translate files into an output directory
    Translate {
        /// Catalog domain (file stem of the catalog)
        #[arg(long, short)]
        domain: String,
        /// Read every file as this format instead of detecting it
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Target language code
        #[arg(long, short)]
        language: String,
        /// Catalog directory, overriding the config
        #[arg(long)]
        locale_dir: Option<PathBuf>,
        /// Directory to write translated files into
        #[arg(long, short)]
        output: PathBuf,
        /// Files or directories to translate
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Set a {{name}} placeholder value (repeatable)
        #[arg(long = "replace", value_name = "NAME=VALUE")]
        replacements: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Log to stderr. `RUST_LOG` wins over `--verbose` when set.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
    return;
}

/// Dispatch a parsed command line.
///
/// # Errors
///
/// Returns the first error from config loading or the command itself.
fn run(cli: Cli) -> Result<(), error::Error> {
    let config = match &cli.config {
        Some(path) => Config::load_file(path)?,
        None => Config::load(Path::new("."))?,
    };

    return match cli.command {
        Commands::Build { language, replacements } => commands::build(&config, &language, &replacements),
        Commands::Extract { format, output, paths } => commands::extract(&config, &paths, format, output.as_deref()),
        Commands::Translate { domain, format, language, locale_dir, output, paths, replacements } => {
            let config = match locale_dir {
                Some(locale_dir) => Config { locale_dir, ..config },
                None => config,
            };
            commands::translate(&config, &paths, format, &domain, &language, &output, &replacements)
        },
    };
}
