use crate::domain::builder::{
    DefinerTable, attach_file, extract_or_empty, merge_extraction, normalize_relative,
};
use crate::domain::graph::StructuralGraph;
use crate::domain::node::{NodeKind, NodePath};
use crate::domain::ports::{SourceTree, SyntaxExtractor};
use anyhow::{Result, bail};
use petgraph::graph::NodeIndex;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Notification that a node next to a changed file may need another look
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    ClassAffectsMethod { class: String, method: String },
    VariableAffectsUsage { definition: String, usage: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::ClassAffectsMethod { class, method } => write!(
                f,
                "Class {} affected method {}, consider revalidating.",
                class, method
            ),
            Advisory::VariableAffectsUsage { definition, usage } => write!(
                f,
                "Variable {} affected usage {}, consider revalidating.",
                definition, usage
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub file: NodeIndex,
    pub added_nodes: usize,
    pub added_edges: usize,
    pub advisories: Vec<Advisory>,
}

/// Re-analyses one changed file against an existing graph
pub struct IncrementalUpdater<'a> {
    extractor: &'a dyn SyntaxExtractor,
}

impl<'a> IncrementalUpdater<'a> {
    pub fn new(extractor: &'a dyn SyntaxExtractor) -> Self {
        Self { extractor }
    }

    /// Merge the current contents of `relative` into `graph`.
    ///
    /// Existing nodes are never touched or removed; running this twice on an
    /// unchanged file leaves the graph as it was after the first run.
    pub fn update_file(
        &self,
        graph: &mut StructuralGraph,
        tree: &dyn SourceTree,
        relative: &Path,
    ) -> Result<UpdateReport> {
        let normalized = normalize_relative(relative)?;
        let relative = normalized.as_path();
        if !tree.exists(relative) {
            bail!("Changed file does not exist: {}", relative.display());
        }
        let nodes_before = graph.node_count();
        let edges_before = graph.edge_count();

        let root = NodePath::root(tree.root_name());
        graph.ensure_node(&root);
        let file = attach_file(graph, &root, relative);
        let source = tree.read(relative)?;
        let extraction = extract_or_empty(self.extractor, relative, &source);

        let mut definers = DefinerTable::new();
        merge_extraction(graph, &file, &extraction, &mut definers);

        let file_idx = graph.ensure_node(&file);
        let advisories = affected_advisories(graph, file_idx);
        for advisory in &advisories {
            info!("{}", advisory);
        }

        Ok(UpdateReport {
            file: file_idx,
            added_nodes: graph.node_count() - nodes_before,
            added_edges: graph.edge_count() - edges_before,
            advisories,
        })
    }
}

/// Advisories for the direct successors of a changed file.
pub fn affected_advisories(graph: &StructuralGraph, file: NodeIndex) -> Vec<Advisory> {
    let mut advisories = Vec::new();
    for node in graph.neighbors(file) {
        match graph.kind(node) {
            NodeKind::Class => {
                for succ in graph.neighbors(node) {
                    if graph.kind(succ) == NodeKind::Method {
                        advisories.push(Advisory::ClassAffectsMethod {
                            class: graph.identity(node),
                            method: graph.identity(succ),
                        });
                    }
                }
            }
            NodeKind::VariableDefinition => {
                for succ in graph.neighbors(node) {
                    if graph.kind(succ) == NodeKind::VariableUsage {
                        advisories.push(Advisory::VariableAffectsUsage {
                            definition: graph.identity(node),
                            usage: graph.identity(succ),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    advisories
}
