//! Config command
//!
//! Manage tabex configuration.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};

use tabex_core::config::{Config, DEFAULT_CONFIG_PATH};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, path: Option<&Path>) -> Result<()> {
    let config_path = get_config_path(path);
    match cmd {
        ConfigCommand::Show { json } => show_config(&config_path, json),
        ConfigCommand::Init { force } => init_config(&config_path, force),
        ConfigCommand::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn get_config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn show_config(config_path: &Path, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        eprintln!(
            "{} Configuration not found, showing defaults. Run '{}' to create.",
            "⚠".yellow(),
            "tabex config init".cyan()
        );
        Config::default()
    };

    if as_json {
        let value: toml::Value = toml::from_str(&config.to_toml_string()?)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", "Configuration:".bold().underline());
        println!("{}", config_path.display().to_string().dimmed());
        println!();
        println!("{}", config.to_toml_string()?);
    }

    Ok(())
}

fn init_config(config_path: &Path, force: bool) -> Result<()> {
    use colored::Colorize;

    if config_path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let content = format!("# tabex configuration\n\n{}", Config::default().to_toml_string()?);
    fs::write(config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Wrote default configuration to {}",
        "✓".green(),
        config_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_path() {
        let path = get_config_path(None);
        assert!(path.ends_with("config.toml"));

        let custom = PathBuf::from("custom.toml");
        assert_eq!(get_config_path(Some(&custom)), custom);
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        init_config(&path, false).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.export.default_format, "csv");

        assert!(init_config(&path, false).is_err());
        assert!(init_config(&path, true).is_ok());
    }
}
