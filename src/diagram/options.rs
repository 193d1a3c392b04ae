//! Rendering configuration record.
//!
//! One value-passed record for everything the assembler and renderer need;
//! there is no ambient/global option state. Enums implement FromStr/Display
//! for clap integration.

use crate::report::Warning;
use std::fmt;
use std::str::FromStr;

/// Graphviz layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutEngine {
    /// Hierarchical (ranked)
    #[default]
    Dot,
    /// Force-directed (spring model)
    Neato,
    /// Force-directed (Fruchterman-Reingold)
    Fdp,
    /// Multiscale force-directed, for large graphs
    Sfdp,
    /// Radial
    Twopi,
    /// Circular
    Circo,
}

impl FromStr for LayoutEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" => Ok(LayoutEngine::Dot),
            "neato" => Ok(LayoutEngine::Neato),
            "fdp" => Ok(LayoutEngine::Fdp),
            "sfdp" => Ok(LayoutEngine::Sfdp),
            "twopi" => Ok(LayoutEngine::Twopi),
            "circo" => Ok(LayoutEngine::Circo),
            _ => Err(format!(
                "Unknown engine: {}. Valid options: dot, neato, fdp, sfdp, twopi, circo",
                s
            )),
        }
    }
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutEngine::Dot => write!(f, "dot"),
            LayoutEngine::Neato => write!(f, "neato"),
            LayoutEngine::Fdp => write!(f, "fdp"),
            LayoutEngine::Sfdp => write!(f, "sfdp"),
            LayoutEngine::Twopi => write!(f, "twopi"),
            LayoutEngine::Circo => write!(f, "circo"),
        }
    }
}

/// Edge routing / arrow style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrowStyle {
    #[default]
    Curved,
    Polyline,
    Ortho,
}

impl FromStr for ArrowStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "curved" => Ok(ArrowStyle::Curved),
            "polyline" => Ok(ArrowStyle::Polyline),
            "ortho" => Ok(ArrowStyle::Ortho),
            _ => Err(format!(
                "Unknown arrow style: {}. Valid options: curved, polyline, ortho",
                s
            )),
        }
    }
}

impl fmt::Display for ArrowStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrowStyle::Curved => write!(f, "curved"),
            ArrowStyle::Polyline => write!(f, "polyline"),
            ArrowStyle::Ortho => write!(f, "ortho"),
        }
    }
}

/// Node overlap handling for force-directed engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapMode {
    /// Uniformly scale the layout until overlaps vanish
    #[default]
    Scale,
    /// Proximity-graph-based removal
    Prism,
    /// Compress the layout
    Compress,
    /// Leave overlaps in place
    Retain,
}

impl FromStr for OverlapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scale" => Ok(OverlapMode::Scale),
            "prism" => Ok(OverlapMode::Prism),
            "compress" => Ok(OverlapMode::Compress),
            "retain" | "true" => Ok(OverlapMode::Retain),
            _ => Err(format!(
                "Unknown overlap mode: {}. Valid options: scale, prism, compress, retain",
                s
            )),
        }
    }
}

impl fmt::Display for OverlapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapMode::Scale => write!(f, "scale"),
            OverlapMode::Prism => write!(f, "prism"),
            OverlapMode::Compress => write!(f, "compress"),
            OverlapMode::Retain => write!(f, "true"),
        }
    }
}

/// All rendering options, passed by value through the pipeline.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Show all columns instead of only relationship-participating ones
    pub full_columns: bool,
    /// Assign each table (and its outgoing edges) a palette color
    pub color: bool,
    /// Dark background and light foreground
    pub dark: bool,
    /// Group tables sharing a name prefix into clusters
    pub cluster: bool,
    /// Order nodes by descending incoming-edge count
    pub sort_incoming: bool,
    /// Append a marker to indexed columns
    pub show_indexes: bool,
    pub font: String,
    pub font_size: u32,
    pub arrow: ArrowStyle,
    pub engine: LayoutEngine,
    pub nodesep: f64,
    pub ranksep: f64,
    pub overlap: OverlapMode,
    pub dpi: Option<u32>,
    /// Base name for rendered output files
    pub output_base: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            full_columns: false,
            color: false,
            dark: false,
            cluster: false,
            sort_incoming: false,
            show_indexes: false,
            font: "Consolas".to_string(),
            font_size: 12,
            arrow: ArrowStyle::Curved,
            engine: LayoutEngine::Dot,
            nodesep: 0.6,
            ranksep: 0.7,
            overlap: OverlapMode::Scale,
            dpi: None,
            output_base: "schema_diagram".to_string(),
        }
    }
}

impl RenderOptions {
    /// Check option compatibility, falling back to safe defaults with a
    /// warning rather than failing. `polyline`/`ortho` routing is only
    /// honored by the dot engine.
    pub fn validated(mut self) -> (Self, Vec<Warning>) {
        let mut warnings = Vec::new();

        if self.arrow != ArrowStyle::Curved && self.engine != LayoutEngine::Dot {
            warnings.push(Warning::new(
                "incompatible-option",
                format!(
                    "arrow style '{}' is only supported by the dot engine; falling back to curved",
                    self.arrow
                ),
            ));
            self.arrow = ArrowStyle::Curved;
        }

        (self, warnings)
    }
}
