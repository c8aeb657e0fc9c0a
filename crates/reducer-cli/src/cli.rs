//! CLI argument definitions for reducer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "reducer")]
#[command(about = "Generate Hard, Medium and Easy charts from Expert", version)]
pub struct Args {
    /// Load reduction rules from a JSON file
    #[arg(long, value_name = "FILE", env = "REDUCER_RULES", global = true)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the instruments and difficulties found in a chart
    Inspect {
        /// Chart file (.mid, .midi or .chart)
        file: PathBuf,
        /// Only show this instrument (guitar, bass, drums, keys)
        #[arg(short, long)]
        instrument: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Regenerate every derived difficulty and save the result
    Reduce {
        /// Chart file (.mid, .midi or .chart)
        file: PathBuf,
        /// Output file path (default: REDUCED_<name> beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
