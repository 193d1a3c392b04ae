//! `diagram` subcommand: schema in, DOT/JSON text or rendered image out.

use crate::diagram::{assemble, to_dot, to_json, RenderOptions};
use crate::render::render_with_graphviz;
use crate::report::report_warnings;
use crate::resolver::{resolve, RelationKind};
use crate::schema::extract_from_path;
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct DiagramArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub assume: bool,
    pub color: bool,
    pub dark: bool,
    pub full: bool,
    pub cluster: bool,
    pub sort_incoming: bool,
    pub show_indexes: bool,
    pub font: String,
    pub font_size: u32,
    pub engine: String,
    pub arrow: String,
    pub nodesep: f64,
    pub ranksep: f64,
    pub overlap: String,
    pub dpi: Option<u32>,
    pub render: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextFormat {
    Dot,
    Json,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "svg", "pdf", "jpg", "jpeg", "gif", "webp"];

pub fn run(args: DiagramArgs) -> Result<()> {
    if !args.file.exists() {
        bail!("Input file does not exist: {}", args.file.display());
    }

    let options = RenderOptions {
        full_columns: args.full,
        color: args.color,
        dark: args.dark,
        cluster: args.cluster,
        sort_incoming: args.sort_incoming,
        show_indexes: args.show_indexes,
        font: args.font,
        font_size: args.font_size,
        arrow: args.arrow.parse().map_err(|e: String| anyhow!(e))?,
        engine: args.engine.parse().map_err(|e: String| anyhow!(e))?,
        nodesep: args.nodesep,
        ranksep: args.ranksep,
        overlap: args.overlap.parse().map_err(|e: String| anyhow!(e))?,
        dpi: args.dpi,
        output_base: output_base(args.output.as_deref(), &args.file),
    };

    let (schema, mut warnings) = extract_from_path(&args.file)?;
    let relationships = resolve(&schema, args.assume);
    let (graph, assembly_warnings) = assemble(&schema, &relationships, options);
    warnings.extend(assembly_warnings);
    report_warnings(&warnings);

    if schema.is_empty() {
        eprintln!("No tables found in {}", args.file.display());
        return Ok(());
    }

    let explicit = relationships
        .iter()
        .filter(|r| r.kind == RelationKind::Explicit)
        .count();
    let assumed = relationships.len() - explicit;

    let wants_image = args.render
        || args
            .output
            .as_deref()
            .map(|p| is_image_path(p))
            .unwrap_or(false);

    if wants_image {
        let output_path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.png", graph.options.output_base)));
        let dot_source = to_dot(&graph);
        render_with_graphviz(&dot_source, graph.options.engine, &output_path)?;
        eprintln!("Rendered diagram: {}", output_path.display());
    } else {
        let format = resolve_format(args.format.as_deref(), args.output.as_deref())?;
        let content = match format {
            TextFormat::Dot => to_dot(&graph),
            TextFormat::Json => to_json(&graph),
        };
        match &args.output {
            Some(path) => {
                fs::write(path, &content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Wrote diagram to: {}", path.display());
            }
            None => print!("{}", content),
        }
    }

    eprintln!(
        "{} table(s), {} explicit and {} assumed relationship(s)",
        schema.len(),
        explicit,
        assumed
    );

    Ok(())
}

/// Decide dot vs json: the --format flag wins, then the output extension,
/// defaulting to dot.
fn resolve_format(flag: Option<&str>, output: Option<&Path>) -> Result<TextFormat> {
    if let Some(name) = flag {
        return match name.to_lowercase().as_str() {
            "dot" | "gv" => Ok(TextFormat::Dot),
            "json" => Ok(TextFormat::Json),
            _ => bail!("Unknown format: {}. Valid options: dot, json", name),
        };
    }

    match output.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(TextFormat::Json),
        _ => Ok(TextFormat::Dot),
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Base name for rendered files when no explicit output was given: the
/// output file's stem if there is one, else the input file's stem.
fn output_base(output: Option<&Path>, input: &Path) -> String {
    output
        .and_then(|p| p.file_stem())
        .or_else(|| input.file_stem())
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "schema_diagram".to_string())
}
