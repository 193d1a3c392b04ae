//! Graphviz subprocess invocation.
//!
//! Rendering stays external: DOT text is piped to the `dot` binary with the
//! engine selected via `-K`. A missing binary is only fatal when an image was
//! actually requested.

use crate::diagram::LayoutEngine;
use anyhow::{bail, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Render DOT source to an image file with Graphviz.
/// The output format is taken from the file extension (png, svg, pdf, ...).
pub fn render_with_graphviz(dot_source: &str, engine: LayoutEngine, output_path: &Path) -> Result<()> {
    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");

    let mut child = Command::new("dot")
        .arg(format!("-K{}", engine))
        .arg(format!("-T{}", ext))
        .arg("-o")
        .arg(output_path)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!(
                    "Graphviz 'dot' command not found. Install Graphviz (https://graphviz.org/download/) or use --format dot to get the graph text."
                )
            } else {
                anyhow::anyhow!("Failed to run dot: {}", e)
            }
        })?;

    if let Some(ref mut stdin) = child.stdin {
        stdin.write_all(dot_source.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        bail!("Graphviz dot command failed with status: {}", status);
    }

    Ok(())
}
