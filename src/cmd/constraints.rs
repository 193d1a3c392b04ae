//! `constraints` subcommand: synthesize SQL for inferred relationships.

use crate::report::report_warnings;
use crate::resolver::{resolve, RelationKind};
use crate::schema::extract_from_path;
use crate::synth;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(file: PathBuf, inline: bool, output: Option<PathBuf>) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }

    let (schema, warnings) = extract_from_path(&file)?;
    report_warnings(&warnings);

    if schema.is_empty() {
        eprintln!("No tables found in {}", file.display());
        return Ok(());
    }

    // inference is the whole point here, it is always on
    let relationships = resolve(&schema, true);
    let assumed = relationships
        .iter()
        .filter(|r| r.kind == RelationKind::Assumed)
        .count();

    if assumed == 0 {
        eprintln!("No relationships to synthesize constraints for");
        return Ok(());
    }

    let sql = if inline {
        synth::inline_clauses(&schema, &relationships)
    } else {
        synth::alter_script(&schema, &relationships)
    };

    match output {
        Some(path) => {
            fs::write(&path, &sql)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote constraint SQL to: {}", path.display());
        }
        None => print!("{}", sql),
    }

    eprintln!("{} assumed relationship(s)", assumed);

    Ok(())
}
