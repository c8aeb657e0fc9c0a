//! Inspect command: load a chart and report what it contains.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use reducer_core::{Instrument, RuleSet, Session, format_load_console};

pub fn run(file: &Path, instrument: Option<&str>, json: bool, rules: RuleSet) -> Result<()> {
    let only = match instrument {
        Some(name) => match Instrument::from_str(name) {
            Ok(instrument) => Some(instrument),
            Err(_) => bail!(
                "Unknown instrument '{}' (expected guitar, bass, drums or keys)",
                name
            ),
        },
        None => None,
    };

    let session = Session::open(file, rules)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let mut summary = session.summary();

    if json {
        if let Some(only) = only {
            summary.instruments.retain(|i| i.instrument == only);
        }
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", format_load_console(&summary, only));
    }

    Ok(())
}
