use crate::domain::graph::StructuralGraph;
use petgraph::graph::NodeIndex;
use std::collections::BTreeSet;

/// Widens a candidate set to its bounded-radius neighborhood
#[derive(Debug, Clone, Copy)]
pub struct NeighborhoodRefiner {
    pub radius: usize,
}

impl Default for NeighborhoodRefiner {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl NeighborhoodRefiner {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }

    /// Seeds plus every node within `radius` undirected hops of any seed.
    pub fn refine(&self, graph: &StructuralGraph, seeds: &[NodeIndex]) -> BTreeSet<NodeIndex> {
        let mut refined: BTreeSet<NodeIndex> = seeds.iter().copied().collect();
        for &seed in seeds {
            refined.extend(graph.neighborhood(seed, self.radius));
        }
        refined
    }

    /// Same as [`refine`](Self::refine) over textual identities. Seeds the graph
    /// does not know are kept as they are.
    pub fn refine_identities(&self, graph: &StructuralGraph, seeds: &[String]) -> BTreeSet<String> {
        let mut refined: BTreeSet<String> = seeds.iter().cloned().collect();
        let known: Vec<NodeIndex> = seeds
            .iter()
            .filter_map(|s| graph.node_by_identity(s))
            .collect();
        refined.extend(self.refine(graph, &known).into_iter().map(|n| graph.identity(n)));
        refined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::NodePath;

    fn star() -> StructuralGraph {
        let mut g = StructuralGraph::new();
        for leaf in ["L1", "L2", "L3"] {
            g.add_edge(&NodePath::opaque("C"), &NodePath::opaque(leaf));
        }
        g.add_edge(&NodePath::opaque("L1"), &NodePath::opaque("far"));
        g
    }

    #[test]
    fn test_star_radius_one() {
        let g = star();
        let c = g.node_by_identity("C").unwrap();
        let refined: BTreeSet<String> = NeighborhoodRefiner::new(1)
            .refine(&g, &[c])
            .into_iter()
            .map(|n| g.identity(n))
            .collect();
        let expected: BTreeSet<String> =
            ["C", "L1", "L2", "L3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(refined, expected);
    }

    #[test]
    fn test_radius_two_reaches_further() {
        let g = star();
        let c = g.node_by_identity("C").unwrap();
        assert_eq!(NeighborhoodRefiner::new(2).refine(&g, &[c]).len(), 5);
    }

    #[test]
    fn test_unknown_seed_is_kept() {
        let g = star();
        let refined = NeighborhoodRefiner::new(1)
            .refine_identities(&g, &["L2".to_string(), "ghost".to_string()]);
        let expected: BTreeSet<String> =
            ["C", "L2", "ghost"].iter().map(|s| s.to_string()).collect();
        assert_eq!(refined, expected);
    }
}
