//! Graphviz DOT output for the assembled diagram graph.

use super::{ArrowStyle, DiagramGraph, DiagramNode, LayoutEngine, RelationKind};
use std::fmt::Write;

/// Generate DOT text for an assembled graph. The graph carries its effective
/// (already validated) options.
pub fn to_dot(graph: &DiagramGraph) -> String {
    let opts = &graph.options;
    let mut out = String::new();

    let (bgcolor, fontcolor) = if opts.dark {
        ("#111111", "#eeeeee")
    } else {
        ("white", "#222222")
    };

    out.push_str("digraph schema {\n");
    let _ = writeln!(
        out,
        "  graph [rankdir=LR, nodesep=\"{}\", ranksep=\"{}\", bgcolor=\"{}\", fontname=\"{}\", splines={}];",
        opts.nodesep,
        opts.ranksep,
        bgcolor,
        opts.font,
        splines_value(opts.arrow)
    );
    if opts.engine != LayoutEngine::Dot {
        let _ = writeln!(out, "  graph [overlap=\"{}\"];", opts.overlap);
    }
    if let Some(dpi) = opts.dpi {
        let _ = writeln!(out, "  graph [dpi={}];", dpi);
    }
    let _ = writeln!(
        out,
        "  node [shape=plaintext, fontname=\"{}\", fontsize={}];",
        opts.font, opts.font_size
    );
    let _ = writeln!(
        out,
        "  edge [fontname=\"{}\", fontsize={}];\n",
        opts.font,
        opts.font_size.saturating_sub(2).max(6)
    );

    // clustered nodes inside their subgraphs, the rest at top level
    for cluster in &graph.clusters {
        let _ = writeln!(out, "  subgraph cluster_{} {{", sanitize_id(&cluster.id));
        let _ = writeln!(
            out,
            "    label=\"{}\"; style=dashed; color=\"{}\"; fontcolor=\"{}\";",
            cluster.id.to_uppercase(),
            fontcolor,
            fontcolor
        );
        for node in graph.nodes.iter().filter(|n| cluster.tables.contains(&n.name)) {
            write_node(&mut out, node, fontcolor, opts.show_indexes, "    ");
        }
        out.push_str("  }\n");
    }

    for node in graph.nodes.iter().filter(|n| n.cluster.is_none()) {
        write_node(&mut out, node, fontcolor, opts.show_indexes, "  ");
    }

    if !graph.edges.is_empty() {
        out.push('\n');
    }

    for edge in &graph.edges {
        let label = format!("{} \u{2192} {}", edge.from_column, edge.to_column);
        let (label, style) = match edge.kind {
            RelationKind::Explicit => (format!("<<B>{}</B>>", escape_html(&label)), "solid"),
            RelationKind::Assumed => (format!("<<I>{}</I>>", escape_html(&label)), "dashed"),
        };
        let color = edge.color.as_deref().unwrap_or(fontcolor);
        let _ = writeln!(
            out,
            "  {} -> {} [label={}, style={}, color=\"{}\", fontcolor=\"{}\"];",
            escape_dot_id(&edge.from_table),
            escape_dot_id(&edge.to_table),
            label,
            style,
            color,
            color
        );
    }

    out.push_str("}\n");
    out
}

fn splines_value(arrow: ArrowStyle) -> &'static str {
    match arrow {
        ArrowStyle::Curved => "curved",
        ArrowStyle::Polyline => "polyline",
        ArrowStyle::Ortho => "ortho",
    }
}

fn write_node(out: &mut String, node: &DiagramNode, fontcolor: &str, show_indexes: bool, indent: &str) {
    let color = node.color.as_deref().unwrap_or(fontcolor);
    let _ = writeln!(
        out,
        "{}{} [label=<{}>, fontcolor=\"{}\"];",
        indent,
        escape_dot_id(&node.name),
        table_label(node, show_indexes),
        color
    );
}

/// HTML-like table label: underlined header row, one row per visible column
/// with its type and PK/index markers.
fn table_label(node: &DiagramNode, show_indexes: bool) -> String {
    let mut html = String::new();
    html.push_str("<TABLE BORDER=\"1\" CELLBORDER=\"0\" CELLSPACING=\"0\" CELLPADDING=\"6\">");
    let _ = write!(
        html,
        "<TR><TD WIDTH=\"120\"><U><B>{}</B></U></TD></TR>",
        escape_html(&node.name)
    );

    for col in &node.columns {
        let _ = write!(
            html,
            "<TR><TD ALIGN=\"LEFT\">{} ({})",
            escape_html(&col.name),
            escape_html(&col.type_name)
        );
        if col.is_primary_key {
            html.push_str(" <B>[PK]</B>");
        } else if show_indexes && col.is_indexed {
            html.push_str(" [IDX]");
        }
        html.push_str("</TD></TR>");
    }

    html.push_str("</TABLE>");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_dot_id(s: &str) -> String {
    if s.chars().all(|c| c.is_alphanumeric() || c == '_') && !s.is_empty() {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn sanitize_id(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{assemble, RenderOptions};
    use crate::resolver::resolve;
    use crate::schema::extract_from_sql;

    fn graph_for(sql: &str, assume: bool, opts: RenderOptions) -> DiagramGraph {
        let (schema, _) = extract_from_sql(sql.as_bytes()).unwrap();
        let rels = resolve(&schema, assume);
        assemble(&schema, &rels, opts).0
    }

    const SQL: &str = "CREATE TABLE users (id INT PRIMARY KEY, email TEXT);
        CREATE TABLE orders (id INT PRIMARY KEY, user_id INT,
            FOREIGN KEY (user_id) REFERENCES users (id));";

    #[test]
    fn test_dot_structure() {
        let dot = to_dot(&graph_for(SQL, false, RenderOptions::default()));

        assert!(dot.starts_with("digraph schema {"));
        assert!(dot.contains("<U><B>users</B></U>"));
        assert!(dot.contains("<U><B>orders</B></U>"));
        assert!(dot.contains("[PK]"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_explicit_edge_is_bold_and_solid() {
        let dot = to_dot(&graph_for(SQL, false, RenderOptions::default()));
        assert!(dot.contains("orders -> users"));
        assert!(dot.contains("<B>user_id \u{2192} id</B>"));
        assert!(dot.contains("style=solid"));
    }

    #[test]
    fn test_assumed_edge_is_italic_and_dashed() {
        let sql = "CREATE TABLE users (id INT PRIMARY KEY);
                   CREATE TABLE posts (id INT PRIMARY KEY, user_id INT);";
        let dot = to_dot(&graph_for(sql, true, RenderOptions::default()));

        assert!(dot.contains("posts -> users"));
        assert!(dot.contains("<I>user_id \u{2192} id</I>"));
        assert!(dot.contains("style=dashed"));
    }

    #[test]
    fn test_cluster_subgraph_emitted() {
        let sql = "CREATE TABLE order_items (id INT PRIMARY KEY);
                   CREATE TABLE order_payments (id INT PRIMARY KEY);";
        let opts = RenderOptions {
            cluster: true,
            ..Default::default()
        };
        let dot = to_dot(&graph_for(sql, false, opts));

        assert!(dot.contains("subgraph cluster_order {"));
        assert!(dot.contains("label=\"ORDER\""));
    }

    #[test]
    fn test_dark_mode_colors() {
        let opts = RenderOptions {
            dark: true,
            ..Default::default()
        };
        let dot = to_dot(&graph_for(SQL, false, opts));
        assert!(dot.contains("bgcolor=\"#111111\""));
    }

    #[test]
    fn test_index_marker() {
        let sql = "CREATE TABLE users (id INT PRIMARY KEY, email TEXT);
                   CREATE INDEX idx_email ON users (email);";
        let opts = RenderOptions {
            show_indexes: true,
            full_columns: true,
            ..Default::default()
        };
        let dot = to_dot(&graph_for(sql, false, opts));
        assert!(dot.contains("email (TEXT) [IDX]"));
    }
}
