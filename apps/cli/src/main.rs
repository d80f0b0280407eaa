//! Keydrop CLI
//!
//! Builds the one-shot airdrop commitment tree from the upstream key dumps.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::OsRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Keydrop - airdrop commitment tree builder
#[derive(Parser)]
#[command(name = "keydrop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input prefix containing faucet.json, github-ssh.json,
    /// github-pgp.json, strongset.asc and hn-keys.json
    prefix: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!(prefix = %cli.prefix.display(), "building commitment tree");
    let summary = keydrop_builder::run(&cli.prefix, OsRng)
        .with_context(|| format!("building commitment tree under {}", cli.prefix.display()))?;

    println!("root     {}", summary.root);
    println!("checksum {}", summary.checksum);
    println!(
        "leaves {}  keys {}  shares {}  reward {}",
        summary.leaves, summary.keys, summary.shares, summary.reward
    );
    Ok(())
}
