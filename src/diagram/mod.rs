//! Diagram graph assembly.
//!
//! Builds the renderable graph from a schema and its resolved relationships:
//! visible-column policy, prefix clustering, incoming-count ordering, palette
//! colors, and kind-tagged edge styling. The resulting `DiagramGraph` is
//! immutable; DOT/JSON export and the Graphviz subprocess only read it.

mod dot;
mod json;
pub mod options;
pub mod palette;

pub use dot::to_dot;
pub use json::to_json;
pub use options::{ArrowStyle, LayoutEngine, OverlapMode, RenderOptions};

use crate::report::Warning;
use crate::resolver::{naming, RelationKind, Relationship};
use crate::schema::Schema;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

/// A column selected for display on a node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_primary_key: bool,
    pub is_indexed: bool,
    pub is_nullable: bool,
}

/// A table with its derived rendering attributes.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub incoming: usize,
    pub columns: Vec<NodeColumn>,
}

/// A relationship edge tagged with its kind and inherited color.
#[derive(Debug, Clone, Serialize)]
pub struct StyledEdge {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub kind: RelationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A visual grouping of tables sharing a name prefix.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub id: String,
    pub tables: Vec<String>,
}

/// The fully assembled, renderable graph.
#[derive(Debug)]
pub struct DiagramGraph {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<StyledEdge>,
    pub clusters: Vec<Cluster>,
    pub options: RenderOptions,
}

/// Assemble the diagram graph. Incompatible options fall back with a warning.
pub fn assemble(
    schema: &Schema,
    relationships: &[Relationship],
    options: RenderOptions,
) -> (DiagramGraph, Vec<Warning>) {
    let (options, warnings) = options.validated();

    let mut incoming: AHashMap<&str, usize> = AHashMap::new();
    for rel in relationships {
        *incoming.entry(rel.target_table.as_str()).or_insert(0) += 1;
    }

    // node order: declaration order, or descending incoming count with
    // declaration order as the (stable-sort) tie break
    let mut ordered: Vec<_> = schema.iter().collect();
    if options.sort_incoming {
        ordered.sort_by(|a, b| {
            let ia = incoming.get(a.name.as_str()).copied().unwrap_or(0);
            let ib = incoming.get(b.name.as_str()).copied().unwrap_or(0);
            ib.cmp(&ia)
        });
    }

    // columns on either end of a relationship stay visible in compact mode
    let mut participating: AHashSet<(String, String)> = AHashSet::new();
    for rel in relationships {
        participating.insert((
            rel.source_table.to_lowercase(),
            rel.source_column.to_lowercase(),
        ));
        participating.insert((
            rel.target_table.to_lowercase(),
            rel.target_column.to_lowercase(),
        ));
    }

    let (clusters, cluster_of) = if options.cluster {
        build_clusters(schema)
    } else {
        (Vec::new(), AHashMap::new())
    };

    let mut nodes = Vec::with_capacity(ordered.len());
    let mut color_of: AHashMap<String, String> = AHashMap::new();

    for (position, table) in ordered.iter().enumerate() {
        let color = if options.color {
            let c = palette::color_at(position, options.dark).to_string();
            color_of.insert(table.name.clone(), c.clone());
            Some(c)
        } else {
            None
        };

        let fk_cols: AHashSet<String> = table
            .fk_column_names()
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        let table_lower = table.name.to_lowercase();

        let columns: Vec<NodeColumn> = table
            .columns
            .iter()
            .filter(|col| {
                options.full_columns
                    || col.is_primary_key
                    || fk_cols.contains(&col.name.to_lowercase())
                    || participating.contains(&(table_lower.clone(), col.name.to_lowercase()))
            })
            .map(|col| NodeColumn {
                name: col.name.clone(),
                type_name: col.type_name.clone(),
                is_primary_key: col.is_primary_key,
                is_indexed: table.is_indexed(&col.name),
                is_nullable: col.is_nullable,
            })
            .collect();

        nodes.push(DiagramNode {
            name: table.name.clone(),
            cluster: cluster_of.get(table.name.as_str()).cloned(),
            color,
            incoming: incoming.get(table.name.as_str()).copied().unwrap_or(0),
            columns,
        });
    }

    // outgoing edges inherit the source table's color
    let edges: Vec<StyledEdge> = relationships
        .iter()
        .map(|rel| StyledEdge {
            from_table: rel.source_table.clone(),
            from_column: rel.source_column.clone(),
            to_table: rel.target_table.clone(),
            to_column: rel.target_column.clone(),
            kind: rel.kind,
            color: color_of.get(&rel.source_table).cloned(),
        })
        .collect();

    (
        DiagramGraph {
            nodes,
            edges,
            clusters,
            options,
        },
        warnings,
    )
}

/// Group table names by shared prefix up to the first underscore. A cluster
/// only materializes with more than one member.
fn build_clusters(schema: &Schema) -> (Vec<Cluster>, AHashMap<String, String>) {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for table in schema.iter() {
        let prefix = naming::cluster_prefix(&table.name).to_string();
        match groups.iter_mut().find(|(p, _)| *p == prefix) {
            Some((_, members)) => members.push(table.name.clone()),
            None => groups.push((prefix, vec![table.name.clone()])),
        }
    }

    let mut clusters = Vec::new();
    let mut cluster_of = AHashMap::new();

    for (prefix, members) in groups {
        if members.len() > 1 {
            for member in &members {
                cluster_of.insert(member.clone(), prefix.clone());
            }
            clusters.push(Cluster {
                id: prefix,
                tables: members,
            });
        }
    }

    (clusters, cluster_of)
}
