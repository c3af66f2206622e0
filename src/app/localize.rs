use crate::adapters::oracle::parse_ranked_response;
use crate::domain::error::OracleError;
use crate::domain::graph::StructuralGraph;
use crate::domain::ports::{RankedNode, RankingOracle};
use crate::domain::refiner::NeighborhoodRefiner;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct Localization {
    pub ranked: Vec<RankedNode>,
    /// Ranked identities widened to their neighborhood, sorted
    pub refined: Vec<String>,
}

/// Asks the oracle which nodes matter for a problem, then widens the answer.
pub struct Localizer<'a> {
    graph: &'a StructuralGraph,
    top_n: usize,
    refiner: NeighborhoodRefiner,
}

impl<'a> Localizer<'a> {
    pub fn new(graph: &'a StructuralGraph, top_n: usize, context_depth: usize) -> Self {
        Self {
            graph,
            top_n,
            refiner: NeighborhoodRefiner::new(context_depth),
        }
    }

    pub fn build_prompt(&self, problem: &str) -> String {
        format!(
            "You are tasked with identifying suspicious nodes in a software repository based on the given problem description.\n\
             Each node represents a directory, file, class, function, method or variable, along with its structural relationships.\n\
             The goal is to rank the top {n} nodes that are most likely relevant to solving the problem.\n\
             \nGraph:\n{summary}\n\
             Problem Statement:\n{problem}\n\
             \nTask: Provide a ranked list of {n} suspicious nodes, one per line, formatted as `<node>: <score>`.",
            n = self.top_n,
            summary = self.graph.summary(),
            problem = problem,
        )
    }

    pub fn rank_suspicious_nodes(
        &self,
        oracle: &dyn RankingOracle,
        problem: &str,
    ) -> Result<Vec<RankedNode>, OracleError> {
        let response = oracle.complete(&self.build_prompt(problem))?;
        let ranked = parse_ranked_response(&response);
        info!("Oracle ranked {} nodes", ranked.len());
        Ok(ranked)
    }

    pub fn refine_nodes(&self, ranked: &[RankedNode]) -> Vec<String> {
        let seeds: Vec<String> = ranked.iter().map(|r| r.identity.clone()).collect();
        self.refiner
            .refine_identities(self.graph, &seeds)
            .into_iter()
            .collect()
    }

    pub fn localize(
        &self,
        oracle: &dyn RankingOracle,
        problem: &str,
    ) -> Result<Localization, OracleError> {
        let ranked = self.rank_suspicious_nodes(oracle, problem)?;
        let refined = self.refine_nodes(&ranked);
        Ok(Localization { ranked, refined })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::NodePath;

    struct FixedOracle(&'static str);

    impl RankingOracle for FixedOracle {
        fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
            Ok(self.0.to_string())
        }
    }

    fn graph() -> StructuralGraph {
        let mut g = StructuralGraph::new();
        g.add_edge(&NodePath::opaque("f.py"), &NodePath::opaque("f.py:A"));
        g.add_edge(&NodePath::opaque("f.py:A"), &NodePath::opaque("f.py:A:m"));
        g
    }

    #[test]
    fn test_prompt_contains_summary_and_problem() {
        let g = graph();
        let prompt = Localizer::new(&g, 3, 1).build_prompt("Bug in A.m");
        assert!(prompt.contains("Node: f.py:A (Type: unknown)"));
        assert!(prompt.contains("  -> f.py:A:m"));
        assert!(prompt.contains("Bug in A.m"));
        assert!(prompt.contains("top 3 nodes"));
    }

    #[test]
    fn test_localize_ranks_and_refines() {
        let g = graph();
        let oracle = FixedOracle("f.py:A:m: 0.9\nnonsense\nghost.py: 0.1");
        let result = Localizer::new(&g, 5, 1).localize(&oracle, "bug").unwrap();
        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.refined, vec!["f.py:A", "f.py:A:m", "ghost.py"]);
    }
}
