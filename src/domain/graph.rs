use crate::domain::attribute::{Attribute, Attributes};
use crate::domain::edge::EdgeKind;
use crate::domain::error::GraphError;
use crate::domain::node::{Node, NodeKind, NodePath};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// Structural graph - the core data structure
#[derive(Debug, Default, Clone)]
pub struct StructuralGraph {
    /// Directed graph of nodes and edges; node storage is the petgraph arena
    pub graph: DiGraph<Node, EdgeKind>,

    /// Primary key: typed structural path
    path_to_node: HashMap<NodePath, NodeIndex>,

    /// Display identity → node, for identities arriving as text
    identity_to_node: HashMap<String, NodeIndex>,
}

/// Canonical, comparable view of a graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<String, NodeSnapshot>,
    pub edges: BTreeSet<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub kind: NodeKind,
    pub attributes: Attributes,
}

impl StructuralGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Insert a node if its path is new. Returns the index and whether it was created.
    pub fn insert_node(&mut self, path: &NodePath) -> (NodeIndex, bool) {
        if let Some(&idx) = self.path_to_node.get(path) {
            return (idx, false);
        }
        let identity = path.to_string();
        let idx = self.graph.add_node(Node::new(path.clone()));
        self.path_to_node.insert(path.clone(), idx);
        if let Some(existing) = self.identity_to_node.get(&identity) {
            debug!(
                "Identity {} already names node {:?}; keeping the first",
                identity, existing
            );
        } else {
            self.identity_to_node.insert(identity, idx);
        }
        (idx, true)
    }

    pub fn ensure_node(&mut self, path: &NodePath) -> NodeIndex {
        self.insert_node(path).0
    }

    /// Insert both endpoints if absent and connect them. Re-adding an edge is a no-op.
    pub fn add_edge(&mut self, parent: &NodePath, child: &NodePath) -> (NodeIndex, NodeIndex) {
        let source = self.ensure_node(parent);
        let target = self.ensure_node(child);
        self.connect(source, target);
        (source, target)
    }

    /// Connect two existing nodes; returns true when the edge is new.
    pub fn connect(&mut self, source: NodeIndex, target: NodeIndex) -> bool {
        if self.graph.find_edge(source, target).is_some() {
            return false;
        }
        let kind = EdgeKind::between(self.graph[source].path.kind(), self.graph[target].path.kind());
        self.graph.add_edge(source, target, kind);
        true
    }

    pub fn contains(&self, path: &NodePath) -> bool {
        self.path_to_node.contains_key(path)
    }

    pub fn node_by_path(&self, path: &NodePath) -> Option<NodeIndex> {
        self.path_to_node.get(path).copied()
    }

    pub fn node_by_identity(&self, identity: &str) -> Option<NodeIndex> {
        self.identity_to_node.get(identity).copied()
    }

    pub fn require(&self, identity: &str) -> Result<NodeIndex, GraphError> {
        self.node_by_identity(identity)
            .ok_or_else(|| GraphError::NodeNotFound(identity.to_string()))
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut Node {
        &mut self.graph[idx]
    }

    pub fn identity(&self, idx: NodeIndex) -> String {
        self.graph[idx].identity()
    }

    pub fn kind(&self, idx: NodeIndex) -> NodeKind {
        self.graph[idx].kind
    }

    pub fn set_kind(&mut self, idx: NodeIndex, kind: NodeKind) {
        self.graph[idx].kind = kind;
    }

    pub fn attributes(&self, idx: NodeIndex) -> &Attributes {
        &self.graph[idx].attributes
    }

    pub fn attributes_mut(&mut self, idx: NodeIndex) -> &mut Attributes {
        &mut self.graph[idx].attributes
    }

    pub fn set_attribute(&mut self, idx: NodeIndex, attribute: Attribute) {
        self.graph[idx].attributes.set(attribute);
    }

    /// Direct successors, sorted by identity for deterministic traversal
    pub fn neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        out.sort_by_cached_key(|&n| self.identity(n));
        out.dedup();
        out
    }

    /// Nodes within `radius` hops, ignoring edge direction. Includes `idx` itself.
    pub fn neighborhood(&self, idx: NodeIndex, radius: usize) -> BTreeSet<NodeIndex> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        seen.insert(idx);
        queue.push_back((idx, 0usize));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= radius {
                continue;
            }
            for next in self.graph.neighbors_undirected(current) {
                if seen.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        seen
    }

    /// Weakly connected components, each sorted by identity
    pub fn connected_components(&self) -> Vec<Vec<NodeIndex>> {
        let mut sets = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut groups: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for idx in self.graph.node_indices() {
            groups.entry(sets.find(idx.index())).or_default().push(idx);
        }

        let mut components: Vec<Vec<NodeIndex>> = groups
            .into_values()
            .map(|mut group| {
                group.sort_by_cached_key(|&n| self.identity(n));
                group
            })
            .collect();
        components.sort_by_cached_key(|c| c.first().map(|&n| self.identity(n)));
        components
    }

    /// Textual summary for the relevance oracle: one `Node:` line per node,
    /// followed by its outgoing edges.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            lines.push(format!("Node: {} (Type: {})", node.identity(), node.kind));
            for succ in self.neighbors(idx) {
                lines.push(format!("  -> {}", self.identity(succ)));
            }
        }
        lines.join("\n")
    }

    pub fn count_by_kind(&self) -> BTreeMap<NodeKind, usize> {
        let mut counts = BTreeMap::new();
        for node in self.graph.node_weights() {
            *counts.entry(node.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .graph
            .node_weights()
            .map(|n| {
                (
                    n.identity(),
                    NodeSnapshot {
                        kind: n.kind,
                        attributes: n.attributes.clone(),
                    },
                )
            })
            .collect();
        let edges = self
            .graph
            .edge_references()
            .map(|e| (self.identity(e.source()), self.identity(e.target())))
            .collect();
        GraphSnapshot { nodes, edges }
    }

    /// Union another graph into this one by structural path.
    ///
    /// Nodes already present keep their kind and attributes.
    pub fn merge(&mut self, other: &StructuralGraph) {
        let mut mapping: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        for idx in other.graph.node_indices() {
            let theirs = &other.graph[idx];
            let (ours, created) = self.insert_node(&theirs.path);
            if created {
                let node = &mut self.graph[ours];
                node.kind = theirs.kind;
                node.attributes = theirs.attributes.clone();
                node.locations = theirs.locations.clone();
            }
            mapping.insert(idx, ours);
        }
        for edge in other.graph.edge_references() {
            self.connect(mapping[&edge.source()], mapping[&edge.target()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Segment;

    fn opaque(id: &str) -> NodePath {
        NodePath::opaque(id)
    }

    #[test]
    fn test_add_edge_is_idempotent() {
        let mut g = StructuralGraph::new();
        g.add_edge(&opaque("a"), &opaque("b"));
        g.add_edge(&opaque("a"), &opaque("b"));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        let a = g.node_by_identity("a").unwrap();
        assert_eq!(g.kind(a), NodeKind::Unknown);
    }

    #[test]
    fn test_edge_kind_inferred_from_endpoints() {
        let mut g = StructuralGraph::new();
        let file = NodePath::root("p").child(Segment::File("a.py".into()));
        let def = file.child(Segment::VariableDefinition("x".into()));
        let usage = file.child(Segment::VariableUsage("x".into()));
        g.add_edge(&file, &def);
        let (d, u) = g.add_edge(&def, &usage);
        let edge = g.graph.find_edge(d, u).unwrap();
        assert_eq!(g.graph[edge], EdgeKind::DataFlow);
        let f = g.node_by_path(&file).unwrap();
        let edge = g.graph.find_edge(f, d).unwrap();
        assert_eq!(g.graph[edge], EdgeKind::Containment);
    }

    #[test]
    fn test_neighbors_are_successors_only() {
        let mut g = StructuralGraph::new();
        g.add_edge(&opaque("a"), &opaque("c"));
        g.add_edge(&opaque("a"), &opaque("b"));
        g.add_edge(&opaque("z"), &opaque("a"));
        let a = g.node_by_identity("a").unwrap();
        let names: Vec<String> = g.neighbors(a).into_iter().map(|n| g.identity(n)).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_neighborhood_is_undirected_and_bounded() {
        let mut g = StructuralGraph::new();
        g.add_edge(&opaque("a"), &opaque("b"));
        g.add_edge(&opaque("c"), &opaque("b"));
        g.add_edge(&opaque("c"), &opaque("d"));
        let b = g.node_by_identity("b").unwrap();

        let r1: BTreeSet<String> = g.neighborhood(b, 1).into_iter().map(|n| g.identity(n)).collect();
        assert_eq!(r1, ["a", "b", "c"].iter().map(|s| s.to_string()).collect());

        let r2 = g.neighborhood(b, 2);
        assert_eq!(r2.len(), 4);

        let r0 = g.neighborhood(b, 0);
        assert_eq!(r0.len(), 1);
    }

    #[test]
    fn test_summary_format() {
        let mut g = StructuralGraph::new();
        g.add_edge(&opaque("a"), &opaque("b"));
        assert_eq!(
            g.summary(),
            "Node: a (Type: unknown)\n  -> b\nNode: b (Type: unknown)"
        );
    }

    #[test]
    fn test_connected_components() {
        let mut g = StructuralGraph::new();
        g.add_edge(&opaque("a"), &opaque("b"));
        g.add_edge(&opaque("c"), &opaque("b"));
        g.ensure_node(&opaque("lonely"));
        let components = g.connected_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].len(), 3);
        assert_eq!(g.identity(components[1][0]), "lonely");
    }

    #[test]
    fn test_merge_unions_by_identity() {
        let mut left = StructuralGraph::new();
        left.add_edge(&opaque("root"), &opaque("a"));
        let a = left.node_by_identity("a").unwrap();
        left.set_attribute(a, Attribute::TypeName("int".into()));

        let mut right = StructuralGraph::new();
        right.add_edge(&opaque("root"), &opaque("b"));
        right.add_edge(&opaque("root"), &opaque("a"));
        let ra = right.node_by_identity("a").unwrap();
        right.set_attribute(ra, Attribute::TypeName("str".into()));

        left.merge(&right);
        assert_eq!(left.node_count(), 3);
        assert_eq!(left.edge_count(), 2);
        assert_eq!(left.attributes(a).type_name.as_deref(), Some("int"));
    }

    #[test]
    fn test_require_reports_missing_identity() {
        let g = StructuralGraph::new();
        assert_eq!(
            g.require("nope"),
            Err(GraphError::NodeNotFound("nope".to_string()))
        );
    }
}
