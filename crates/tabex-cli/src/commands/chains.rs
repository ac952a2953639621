//! Chains command
//!
//! Print the accessor chains a descriptor resolves to, one per line.

use anyhow::Result;
use clap::Args;

use super::FieldArgs;

/// Arguments for the chains command
#[derive(Debug, Args)]
pub struct ChainsArgs {
    #[command(flatten)]
    pub columns: FieldArgs,

    /// Show the column header next to each chain
    #[arg(long)]
    pub labels: bool,
}

/// Execute the chains command
pub fn execute(args: ChainsArgs) -> Result<()> {
    use colored::Colorize;

    let chains = args.columns.descriptor()?.resolve()?;

    if chains.is_empty() {
        eprintln!("{} Descriptor resolves to no columns", "⚠".yellow());
        return Ok(());
    }

    for chain in &chains {
        if args.labels {
            println!("{}\t{}", chain, chain.label().dimmed());
        } else {
            println!("{}", chain);
        }
    }

    Ok(())
}
