//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the commands (which would require chart files).

use std::path::PathBuf;

use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "reducer")]
struct Args {
    #[arg(long, value_name = "FILE", global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Inspect {
        file: PathBuf,
        #[arg(short, long)]
        instrument: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Reduce {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[test]
fn test_parse_requires_subcommand() {
    assert!(Args::try_parse_from(["reducer"]).is_err());
}

#[test]
fn test_parse_inspect() {
    let args = Args::try_parse_from(["reducer", "inspect", "song.mid"]).unwrap();
    assert!(args.rules.is_none());
    match args.command {
        Command::Inspect {
            file,
            instrument,
            json,
        } => {
            assert_eq!(file, PathBuf::from("song.mid"));
            assert!(instrument.is_none());
            assert!(!json);
        }
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_parse_inspect_with_instrument_and_json() {
    let args =
        Args::try_parse_from(["reducer", "inspect", "song.chart", "-i", "bass", "--json"]).unwrap();
    match args.command {
        Command::Inspect {
            instrument, json, ..
        } => {
            assert_eq!(instrument.as_deref(), Some("bass"));
            assert!(json);
        }
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_parse_reduce_default_output() {
    let args = Args::try_parse_from(["reducer", "reduce", "song.mid"]).unwrap();
    match args.command {
        Command::Reduce { file, output, json } => {
            assert_eq!(file, PathBuf::from("song.mid"));
            assert!(output.is_none());
            assert!(!json);
        }
        _ => panic!("Expected Reduce command"),
    }
}

#[test]
fn test_parse_reduce_with_output() {
    let args =
        Args::try_parse_from(["reducer", "reduce", "song.mid", "-o", "easy.mid"]).unwrap();
    match args.command {
        Command::Reduce { output, .. } => {
            assert_eq!(output, Some(PathBuf::from("easy.mid")));
        }
        _ => panic!("Expected Reduce command"),
    }
}

#[test]
fn test_parse_global_rules_after_subcommand() {
    let args = Args::try_parse_from([
        "reducer",
        "reduce",
        "song.chart",
        "--rules",
        "rules.json",
    ])
    .unwrap();
    assert_eq!(args.rules, Some(PathBuf::from("rules.json")));
}

#[test]
fn test_parse_reduce_requires_file() {
    assert!(Args::try_parse_from(["reducer", "reduce"]).is_err());
}
