//! JSON output for the assembled diagram graph.

use super::{Cluster, DiagramGraph, DiagramNode, StyledEdge};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DiagramJson<'a> {
    pub tables: &'a [DiagramNode],
    pub relationships: &'a [StyledEdge],
    pub clusters: &'a [Cluster],
    pub stats: DiagramStats,
}

#[derive(Debug, Serialize)]
pub struct DiagramStats {
    pub table_count: usize,
    pub column_count: usize,
    pub relationship_count: usize,
    pub cluster_count: usize,
}

/// Serialize an assembled graph as pretty JSON.
pub fn to_json(graph: &DiagramGraph) -> String {
    let doc = DiagramJson {
        tables: &graph.nodes,
        relationships: &graph.edges,
        clusters: &graph.clusters,
        stats: DiagramStats {
            table_count: graph.nodes.len(),
            column_count: graph.nodes.iter().map(|n| n.columns.len()).sum(),
            relationship_count: graph.edges.len(),
            cluster_count: graph.clusters.len(),
        },
    };
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}
