//! Formats command
//!
//! List the export formats the registry knows about.

use anyhow::Result;
use tabex_core::config::Config;

use super::export::build_registry;

/// Execute the formats command
pub fn execute(config: &Config) -> Result<()> {
    use colored::Colorize;

    let registry = build_registry(config)?;

    println!("{}", "Available formats:".bold().underline());
    println!();
    for tag in registry.known_tags() {
        let extension = registry.file_extension(&tag)?;
        let marker = if tag == config.export.default_format {
            " (default)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {} - .{}{}", tag.cyan(), extension, marker);
    }

    Ok(())
}
