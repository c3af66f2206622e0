use crate::domain::graph::StructuralGraph;
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// One attribute write performed during propagation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub parameters: bool,
    pub type_name: bool,
    pub change_log: bool,
}

impl AppliedUpdate {
    pub fn changed_anything(&self) -> bool {
        self.parameters || self.type_name || self.change_log
    }
}

/// Which attribute disagrees across an edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    Parameters {
        source: NodeIndex,
        target: NodeIndex,
    },
    TypeName {
        source: NodeIndex,
        target: NodeIndex,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Nodes in the order they were processed
    pub visited: Vec<NodeIndex>,
    pub updates: Vec<AppliedUpdate>,
}

/// Pushes attribute changes along outgoing edges
#[derive(Debug, Default, Clone, Copy)]
pub struct PropagationEngine;

impl PropagationEngine {
    pub fn new() -> Self {
        Self
    }

    /// One hop: copy `parameters` (and `type`, for variable sources) onto every
    /// direct successor and extend their change logs.
    pub fn propagate_changes(
        &self,
        graph: &mut StructuralGraph,
        modified: NodeIndex,
    ) -> Vec<AppliedUpdate> {
        debug!("Starting propagation from modified node: {}", graph.identity(modified));
        graph
            .neighbors(modified)
            .into_iter()
            .map(|target| self.apply_update(graph, modified, target))
            .collect()
    }

    fn apply_update(
        &self,
        graph: &mut StructuralGraph,
        source: NodeIndex,
        target: NodeIndex,
    ) -> AppliedUpdate {
        let source_kind = graph.kind(source);
        let source_attrs = graph.attributes(source).clone();
        let source_identity = graph.identity(source);
        let target_identity = graph.identity(target);
        let target_attrs = graph.attributes_mut(target);

        let mut update = AppliedUpdate {
            source,
            target,
            parameters: false,
            type_name: false,
            change_log: false,
        };

        if let Some(params) = source_attrs.parameters {
            debug!(
                "Updated parameters for {}: {:?} -> {:?}",
                target_identity, target_attrs.parameters, params
            );
            target_attrs.parameters = Some(params);
            update.parameters = true;
        }

        if source_kind.is_variable() {
            if let Some(type_name) = source_attrs.type_name {
                debug!(
                    "Updated type for {}: {:?} -> {}",
                    target_identity, target_attrs.type_name, type_name
                );
                target_attrs.type_name = Some(type_name);
                update.type_name = true;
            }
        }

        if source_attrs.change_log.is_some() {
            target_attrs.log_change(format!("Updated due to changes in {}", source_identity));
            update.change_log = true;
        }

        update
    }

    /// Whether every direct successor agrees with `modified` on the attributes
    /// both of them define.
    pub fn validate_propagation(&self, graph: &StructuralGraph, modified: NodeIndex) -> bool {
        match self.find_inconsistency(graph, modified) {
            Some(inconsistency) => {
                let (source, target) = match &inconsistency {
                    Inconsistency::Parameters { source, target }
                    | Inconsistency::TypeName { source, target } => (*source, *target),
                };
                warn!(
                    "Inconsistency detected between {} and {}: {:?}",
                    graph.identity(source),
                    graph.identity(target),
                    inconsistency
                );
                false
            }
            None => {
                debug!("All propagations from {} are consistent.", graph.identity(modified));
                true
            }
        }
    }

    /// First disagreement between `modified` and one of its successors.
    pub fn find_inconsistency(
        &self,
        graph: &StructuralGraph,
        modified: NodeIndex,
    ) -> Option<Inconsistency> {
        let source = graph.attributes(modified);
        for target in graph.neighbors(modified) {
            let attrs = graph.attributes(target);
            if let (Some(a), Some(b)) = (&source.parameters, &attrs.parameters) {
                if a != b {
                    return Some(Inconsistency::Parameters {
                        source: modified,
                        target,
                    });
                }
            }
            if let (Some(a), Some(b)) = (&source.type_name, &attrs.type_name) {
                if a != b {
                    return Some(Inconsistency::TypeName {
                        source: modified,
                        target,
                    });
                }
            }
        }
        None
    }

    /// Breadth-first repeated propagation over everything reachable from `modified`.
    ///
    /// Each node is processed at most once, so cycles terminate.
    pub fn synchronize_dependencies(
        &self,
        graph: &mut StructuralGraph,
        modified: NodeIndex,
    ) -> SyncReport {
        debug!("Starting dependency synchronization for node: {}", graph.identity(modified));
        let mut report = SyncReport::default();
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        queue.push_back(modified);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            report.visited.push(current);
            report.updates.extend(self.propagate_changes(graph, current));

            for next in graph.neighbors(current) {
                if !visited.contains(&next) {
                    queue.push_back(next);
                }
            }
        }

        debug!(
            "Dependency synchronization complete for node: {} ({} nodes)",
            graph.identity(modified),
            report.visited.len()
        );
        report
    }
}
