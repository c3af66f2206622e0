use crate::domain::attribute::Attributes;
use crate::domain::edge::EdgeKind;
use crate::domain::graph::StructuralGraph;
use crate::domain::node::{NodeKind, Position};
use crate::domain::updater::UpdateReport;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub root: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
    pub component_count: usize,
}

impl GraphStats {
    pub fn from_graph(root: &str, graph: &StructuralGraph) -> Self {
        Self {
            root: root.to_string(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            nodes_by_kind: graph.count_by_kind(),
            component_count: graph.connected_components().len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeDto {
    pub target: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeDto {
    pub id: usize,
    pub identity: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Position>,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphDump {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes: Vec<NodeDto>,
}

impl GraphDump {
    pub fn from_graph(graph: &StructuralGraph) -> Self {
        let nodes = graph
            .graph
            .node_indices()
            .map(|idx| {
                let node = graph.node(idx);
                let mut edges: Vec<EdgeDto> = graph
                    .graph
                    .edges(idx)
                    .map(|e| EdgeDto {
                        target: graph.identity(e.target()),
                        kind: *e.weight(),
                    })
                    .collect();
                edges.sort_by(|a, b| a.target.cmp(&b.target));
                NodeDto {
                    id: idx.index(),
                    identity: node.identity(),
                    kind: node.kind,
                    attributes: node.attributes.clone(),
                    locations: node.locations.clone(),
                    edges,
                }
            })
            .collect();
        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            nodes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateSummary {
    pub file: String,
    pub added_nodes: usize,
    pub added_edges: usize,
    pub advisories: Vec<String>,
}

impl UpdateSummary {
    pub fn from_report(graph: &StructuralGraph, report: &UpdateReport) -> Self {
        Self {
            file: graph.identity(report.file),
            added_nodes: report.added_nodes,
            added_edges: report.added_edges,
            advisories: report.advisories.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub start: String,
    pub visited: Vec<String>,
    pub updated_nodes: usize,
    pub consistent: bool,
}
