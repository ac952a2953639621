//! Export command
//!
//! Export JSON records to a tabular format.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tabex_core::config::Config;
use tabex_core::export::{Exporter, FormatRegistry, RegistrationPolicy};
use tabex_core::{AccessorTable, ExportData, MatchMode, OutputPolicy};

use tracing::{debug, info};

use super::{read_input, FieldArgs};

/// Arguments for the export command
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// JSON data file: an object or an array of objects (`-` for stdin)
    #[arg(long, short)]
    pub data: PathBuf,

    #[command(flatten)]
    pub columns: FieldArgs,

    /// Export format tag (defaults to `export.default_format`)
    #[arg(long, short)]
    pub format: Option<String>,

    /// Output file path (stdout if not specified)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// JSON key naming each record's kind
    #[arg(long)]
    pub kind_field: Option<String>,

    /// Presenter matching mode
    #[arg(long = "match", value_name = "MODE")]
    pub matching: Option<MatchMode>,
}

/// Build the registry described by the configuration
pub fn build_registry(config: &Config) -> Result<FormatRegistry> {
    let policy = if config.formats.strict_registration {
        RegistrationPolicy::Reject
    } else {
        RegistrationPolicy::Overwrite
    };
    let mut registry = FormatRegistry::with_policy(policy);
    registry
        .register_defaults()
        .context("Failed to register built-in formats")?;
    debug!("Registered formats: {:?}", registry.known_tags());
    Ok(registry)
}

fn build_exporter(config: &Config, matching: Option<MatchMode>) -> Result<Exporter> {
    let hierarchy = config
        .type_hierarchy()
        .context("Invalid [types] configuration")?;

    let mut presenters = config.presenters.clone();
    if let Some(mode) = matching {
        presenters.matching = mode;
    }
    let policy = OutputPolicy::from_config(&presenters, Arc::new(hierarchy))?;

    let accessors = if config.export.builtin_accessors {
        AccessorTable::new()
    } else {
        AccessorTable::without_builtins()
    };

    debug!(
        "Presenter matching: {:?}, targets: {:?}",
        policy.mode(),
        policy.targets()
    );
    Ok(Exporter::new(Arc::new(build_registry(config)?), policy).with_accessors(accessors))
}

/// Execute the export command
pub fn execute(args: ExportArgs, config: &Config) -> Result<()> {
    use colored::Colorize;

    let format = args
        .format
        .clone()
        .unwrap_or_else(|| config.export.default_format.clone());
    let kind_field = args
        .kind_field
        .as_deref()
        .or(config.export.kind_field.as_deref());

    let content = read_input(&args.data)?;
    let data = ExportData::from_json_str(&content, kind_field)
        .with_context(|| format!("Invalid JSON data in {}", args.data.display()))?;
    let descriptor = args.columns.descriptor()?;
    info!(
        "Loaded {} records from {}",
        data.len(),
        args.data.display()
    );

    let exporter = build_exporter(config, args.matching)?;

    eprintln!(
        "Exporting {} {} as {}...",
        data.len().to_string().yellow(),
        if data.len() == 1 { "record" } else { "records" },
        format.cyan()
    );

    if let Some(output_path) = args.output {
        let written = exporter
            .to_file(&format, &data, &descriptor, &output_path)
            .with_context(|| format!("Failed to export to {}", output_path.display()))?;
        eprintln!("{} Exported to {}", "✓".green(), written.display());
    } else {
        let output = exporter.to(&format, &data, &descriptor)?;
        std::io::stdout()
            .write_all(&output)
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_follows_strict_setting() {
        let mut config = Config::default();
        assert_eq!(
            build_registry(&config).unwrap().policy(),
            RegistrationPolicy::Overwrite
        );

        config.formats.strict_registration = true;
        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.policy(), RegistrationPolicy::Reject);
        assert!(registry.has_format("csv"));
        assert!(registry.has_format("xls"));
    }

    #[test]
    fn test_match_flag_overrides_config() {
        let config = Config::default();
        let exporter = build_exporter(&config, Some(MatchMode::Polymorphic)).unwrap();
        assert_eq!(exporter.policy().mode(), MatchMode::Polymorphic);

        let exporter = build_exporter(&config, None).unwrap();
        assert_eq!(exporter.policy().mode(), MatchMode::Exact);
    }
}
