mod constraints;
mod diagram;
mod inspect;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schema-mapper")]
#[command(version)]
#[command(about = "Map a SQL schema or SQLite database into a relationship diagram", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a diagram graph as DOT/JSON text or a rendered image
    Diagram {
        /// Input SQL file or SQLite database (.db/.sqlite/.sqlite3)
        file: PathBuf,

        /// Output file (default: stdout). Image extensions (png/svg/pdf) imply rendering
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: dot or json (detected from output extension if not given)
        #[arg(long)]
        format: Option<String>,

        /// Infer relationships from column naming patterns
        #[arg(short, long)]
        assume: bool,

        /// Assign each table and its outgoing edges a unique color
        #[arg(short, long)]
        color: bool,

        /// Dark background and light foreground
        #[arg(short, long)]
        dark: bool,

        /// Show all columns, not only relationship-participating ones
        #[arg(short, long)]
        full: bool,

        /// Group tables sharing a name prefix into clusters
        #[arg(long)]
        cluster: bool,

        /// Order tables by descending incoming-relationship count
        #[arg(long)]
        sort_incoming: bool,

        /// Append a marker to indexed columns
        #[arg(long)]
        show_indexes: bool,

        /// Font for nodes, edges, and cluster labels
        #[arg(long, default_value = "Consolas")]
        font: String,

        /// Font size in points
        #[arg(long, default_value = "12")]
        font_size: u32,

        /// Layout engine: dot, neato, fdp, sfdp, twopi, circo
        #[arg(long, default_value = "dot")]
        engine: String,

        /// Arrow style: curved, polyline, ortho (polyline/ortho require dot)
        #[arg(long, default_value = "curved")]
        arrow: String,

        /// Minimum space between nodes in the same rank
        #[arg(long, default_value = "0.6")]
        nodesep: f64,

        /// Minimum space between ranks
        #[arg(long, default_value = "0.7")]
        ranksep: f64,

        /// Overlap mode for force-directed engines: scale, prism, compress, retain
        #[arg(long, default_value = "scale")]
        overlap: String,

        /// Output resolution for rendered images
        #[arg(long)]
        dpi: Option<u32>,

        /// Render an image via Graphviz even without an image output extension
        #[arg(long)]
        render: bool,
    },

    /// Synthesize SQL constraints for inferred relationships
    Constraints {
        /// Input SQL file or SQLite database
        file: PathBuf,

        /// Emit inline FOREIGN KEY clauses instead of an ALTER TABLE script
        #[arg(long)]
        inline: bool,

        /// Output SQL file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize tables, columns, and relationships
    Inspect {
        /// Input SQL file or SQLite database
        file: PathBuf,

        /// Include inferred relationships
        #[arg(short, long)]
        assume: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Diagram {
            file,
            output,
            format,
            assume,
            color,
            dark,
            full,
            cluster,
            sort_incoming,
            show_indexes,
            font,
            font_size,
            engine,
            arrow,
            nodesep,
            ranksep,
            overlap,
            dpi,
            render,
        } => diagram::run(diagram::DiagramArgs {
            file,
            output,
            format,
            assume,
            color,
            dark,
            full,
            cluster,
            sort_incoming,
            show_indexes,
            font,
            font_size,
            engine,
            arrow,
            nodesep,
            ranksep,
            overlap,
            dpi,
            render,
        }),
        Commands::Constraints {
            file,
            inline,
            output,
        } => constraints::run(file, inline, output),
        Commands::Inspect { file, assume } => inspect::run(file, assume),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "schema-mapper",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
