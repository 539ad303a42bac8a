//! Command line entry points

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Parser};
use tracing::{debug, info};

use crate::config::{DEFAULT_CONFIG_PATH, VersionConfig};
use crate::version::VersionChain;

#[derive(Debug, Parser)]
#[command(name = "version-chain")]
#[command(version, about = "Bump and reset the parts of a structured version")]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .multiple(true)
        .args(["current", "bump", "reset"])
))]
pub struct Cli {
    /// Print the current version
    #[arg(short, long)]
    pub current: bool,

    /// Bump version parts, in the order given
    #[arg(short, long, value_name = "PART", num_args = 1..)]
    pub bump: Vec<String>,

    /// Reset version parts, in the order given
    #[arg(short, long, value_name = "PART", num_args = 1..)]
    pub reset: Vec<String>,

    /// Config file path
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Bump,
    Reset,
}

/// Run the requested actions and return the lines to print
pub fn run(cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut output = Vec::new();

    if cli.current {
        let config = VersionConfig::load(&cli.config)?;
        output.push(config.to_chain()?.to_string());
    }
    if !cli.bump.is_empty() {
        output.push(apply(&cli.config, Operation::Bump, &cli.bump)?);
    }
    if !cli.reset.is_empty() {
        output.push(apply(&cli.config, Operation::Reset, &cli.reset)?);
    }

    Ok(output)
}

fn apply(config_path: &Path, operation: Operation, keys: &[String]) -> anyhow::Result<String> {
    let mut config = VersionConfig::load(config_path)?;
    let mut chain: VersionChain = config.to_chain()?;
    let old_version = chain.to_string();

    match operation {
        Operation::Bump => chain.bump(keys),
        Operation::Reset => chain.reset(keys),
    }
    .with_context(|| format!("Failed to {:?} {:?}", operation, keys))?;
    let new_version = chain.to_string();

    config.update_values(&chain)?;

    if old_version == new_version {
        debug!("Version unchanged, skipping file updates");
    } else {
        let base_dir = config_path.parent().unwrap_or(Path::new("."));
        for updater in config.file_updaters(base_dir) {
            updater
                .update(&old_version, &new_version)
                .with_context(|| format!("Failed to update {:?}", updater.path()))?;
        }
    }
    config.save(config_path)?;

    info!("{:?}: {} -> {}", operation, old_version, new_version);
    Ok(format!("{}  >>  {}", old_version, new_version))
}
