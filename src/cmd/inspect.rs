//! `inspect` subcommand: per-table summary of columns, keys, and
//! relationships.

use crate::report::report_warnings;
use crate::resolver::{resolve, RelationKind, Relationship};
use crate::schema::extract_from_path;
use anyhow::{bail, Result};
use std::path::PathBuf;

pub fn run(file: PathBuf, assume: bool) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }

    let (schema, warnings) = extract_from_path(&file)?;
    report_warnings(&warnings);

    if schema.is_empty() {
        eprintln!("No tables found in {}", file.display());
        return Ok(());
    }

    let relationships = resolve(&schema, assume);

    println!("Found {} table(s) in {}\n", schema.len(), file.display());

    let name_width = schema
        .iter()
        .map(|t| t.name.len())
        .max()
        .unwrap_or(5)
        .max(5);

    println!(
        "{:<width$}  {:>7}  {:>2}  {:>7}  {:>8}  {:>7}",
        "Table",
        "Columns",
        "PK",
        "Indexes",
        "Explicit",
        "Assumed",
        width = name_width
    );
    println!("{}", "-".repeat(name_width + 42));

    let mut total_columns = 0;
    for table in schema.iter() {
        let (explicit, assumed) = outgoing_counts(&relationships, &table.name);
        total_columns += table.columns.len();
        println!(
            "{:<width$}  {:>7}  {:>2}  {:>7}  {:>8}  {:>7}",
            table.name,
            table.columns.len(),
            table.primary_key.len(),
            table.indexes.len(),
            explicit,
            assumed,
            width = name_width
        );
    }

    let explicit_total = relationships
        .iter()
        .filter(|r| r.kind == RelationKind::Explicit)
        .count();
    let assumed_total = relationships.len() - explicit_total;

    println!("{}", "-".repeat(name_width + 42));
    println!(
        "{:<width$}  {:>7}  {:>2}  {:>7}  {:>8}  {:>7}",
        "TOTAL",
        total_columns,
        "",
        "",
        explicit_total,
        assumed_total,
        width = name_width
    );

    if !assume {
        eprintln!("\nHint: pass --assume to include inferred relationships");
    }

    Ok(())
}

fn outgoing_counts(relationships: &[Relationship], table: &str) -> (usize, usize) {
    let mut explicit = 0;
    let mut assumed = 0;
    for rel in relationships.iter().filter(|r| r.source_table == table) {
        match rel.kind {
            RelationKind::Explicit => explicit += 1,
            RelationKind::Assumed => assumed += 1,
        }
    }
    (explicit, assumed)
}
