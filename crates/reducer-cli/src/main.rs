mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command};
use reducer_core::RuleSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reducer=info,reducer_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let rules = match &args.rules {
        Some(path) => {
            let rules = RuleSet::load(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))?;
            info!("Loaded rules from {}", path.display());
            rules
        }
        None => RuleSet::default(),
    };

    match args.command {
        Command::Inspect {
            file,
            instrument,
            json,
        } => commands::inspect::run(&file, instrument.as_deref(), json, rules),
        Command::Reduce { file, output, json } => {
            commands::reduce::run(&file, output.as_deref(), json, rules)
        }
    }
}
