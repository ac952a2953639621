//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod chains;
pub mod config;
pub mod export;
pub mod formats;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use tabex_core::config::Config;
use tabex_core::Descriptor;

/// tabex - export records as tables
#[derive(Debug, Parser)]
#[command(name = "tabex")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export records to a tabular format
    Export(export::ExportArgs),

    /// Print the accessor chains a descriptor resolves to
    Chains(chains::ChainsArgs),

    /// List registered export formats
    Formats,

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Where the column descriptor comes from
#[derive(Debug, Clone, Args)]
pub struct FieldArgs {
    /// JSON descriptor file (`-` for stdin)
    #[arg(long, conflicts_with = "field")]
    pub fields: Option<PathBuf>,

    /// Dotted field path, repeatable (e.g. `address.city`)
    #[arg(long, short = 'F')]
    pub field: Vec<String>,
}

impl FieldArgs {
    /// Build the descriptor from a file or from the given paths
    pub fn descriptor(&self) -> Result<Descriptor> {
        if let Some(path) = &self.fields {
            let content = read_input(path)?;
            return Descriptor::from_json_str(&content)
                .with_context(|| format!("Invalid descriptor in {}", path.display()));
        }

        if self.field.is_empty() {
            bail!("No columns given. Use --fields <FILE> or --field <PATH>");
        }
        Ok(Descriptor::from_paths(&self.field)?)
    }
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli.config.as_deref();

    // Dispatch to command handler
    match cli.command {
        Commands::Export(args) => export::execute(args, &load_config(config_path)?),
        Commands::Chains(args) => chains::execute(args),
        Commands::Formats => formats::execute(&load_config(config_path)?),
        Commands::Config(cmd) => config::execute(cmd, config_path),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load_or_default(path).context("Failed to load configuration")
}

/// Read a file, or stdin when the path is `-`
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut content)
            .context("Failed to read stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
