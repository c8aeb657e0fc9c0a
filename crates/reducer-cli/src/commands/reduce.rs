//! Reduce command: regenerate derived difficulties and save.

use std::path::Path;

use anyhow::{Context, Result, bail};
use reducer_core::{
    Error, RuleSet, Session, default_output_path, format_regeneration_console,
};

pub fn run(file: &Path, output: Option<&Path>, json: bool, rules: RuleSet) -> Result<()> {
    let session = Session::open(file, rules)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let regeneration = match session.regenerate() {
        Ok(regeneration) => regeneration,
        Err(Error::NothingToRegenerate) => bail!(
            "{} has no instrument with Expert notes; nothing was written",
            file.display()
        ),
        Err(e) => return Err(e.into()),
    };

    let destination = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(file));
    if destination == file {
        bail!("Refusing to overwrite the input file {}", file.display());
    }

    let summary = session.save(&regeneration, &destination)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", format_regeneration_console(&summary));
    }

    Ok(())
}
