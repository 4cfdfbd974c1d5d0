//! Standard PageRank algorithm
//!
//! Implements the classic damped power iteration with dangling-mass
//! redistribution and a uniform teleport floor. Each iteration gathers a
//! node's new rank from its predecessors over the precomputed inbound
//! index, reading only the previous iteration's snapshot; the two rank
//! buffers are swapped wholesale at the end of every pass.

use super::PageRankResult;
use crate::graph::csr::CsrGraph;
use crate::{Error, Result};
use rayon::prelude::*;

/// Below this node count the parallel entry point falls back to the
/// sequential loop; the rayon fork/join overhead dominates on small graphs.
const PARALLEL_CUTOFF: usize = 1024;

/// Standard PageRank implementation
#[derive(Debug, Clone)]
pub struct StandardPageRank {
    /// Damping factor in [0, 1) (typically 0.85)
    pub damping: f64,
    /// Maximum number of iterations (hard termination cap)
    pub max_iterations: usize,
    /// Convergence tolerance on the ℓ1 distance between iterates
    pub tolerance: f64,
}

impl Default for StandardPageRank {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl StandardPageRank {
    /// Create a new StandardPageRank with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check parameter ranges without running
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.damping) {
            return Err(Error::InvalidParameter(format!(
                "damping must be in [0, 1) (got {})",
                self.damping
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "tolerance must be a positive finite number (got {})",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Run PageRank on a graph
    ///
    /// Returns the result even if convergence wasn't achieved, with
    /// `converged=false`. Parameters and the graph are validated first;
    /// no iteration runs on invalid input.
    pub fn run(&self, graph: &CsrGraph) -> Result<PageRankResult> {
        self.validate()?;
        if graph.is_empty() {
            return Err(Error::InvalidGraph("graph has no nodes".to_string()));
        }

        let n = graph.num_nodes;
        let inv_n = 1.0 / n as f64;
        let mut scores = vec![inv_n; n];
        let mut new_scores = vec![0.0; n];

        let dangling_nodes = graph.dangling_nodes();
        let teleport = (1.0 - self.damping) * inv_n;

        let mut iterations = 0;
        let mut delta = f64::MAX;

        while iterations < self.max_iterations && delta >= self.tolerance {
            iterations += 1;

            // Dangling mass is redistributed uniformly, as if dangling
            // nodes linked to every node.
            let dangling_mass: f64 = dangling_nodes.iter().map(|&d| scores[d as usize]).sum();
            let base = teleport + self.damping * dangling_mass * inv_n;

            for v in 0..n {
                let gathered: f64 = graph
                    .predecessors(v as u32)
                    .map(|(u, w)| scores[u as usize] * w / graph.node_total_weight(u))
                    .sum();
                new_scores[v] = base + self.damping * gathered;
            }

            delta = l1_distance(&scores, &new_scores);

            // Commit the new vector unconditionally; the returned vector is
            // always the post-update one, even on the converging pass.
            std::mem::swap(&mut scores, &mut new_scores);
        }

        Ok(PageRankResult::new(
            scores,
            iterations,
            delta,
            delta < self.tolerance,
        ))
    }

    /// Run PageRank with the per-node gather parallelized via rayon
    ///
    /// Score-identical to [`run`](Self::run): each node's update reads only
    /// the previous snapshot and sums its inbound edges in a fixed order,
    /// and the iterations are separated by rayon's implicit join barrier.
    /// Small graphs fall back to the sequential loop.
    pub fn run_parallel(&self, graph: &CsrGraph) -> Result<PageRankResult> {
        if graph.num_nodes < PARALLEL_CUTOFF {
            return self.run(graph);
        }
        self.validate()?;

        let n = graph.num_nodes;
        let inv_n = 1.0 / n as f64;
        let mut scores = vec![inv_n; n];
        let mut new_scores = vec![0.0; n];

        let dangling_nodes = graph.dangling_nodes();
        let teleport = (1.0 - self.damping) * inv_n;

        let mut iterations = 0;
        let mut delta = f64::MAX;

        while iterations < self.max_iterations && delta >= self.tolerance {
            iterations += 1;

            let dangling_mass: f64 = dangling_nodes.iter().map(|&d| scores[d as usize]).sum();
            let base = teleport + self.damping * dangling_mass * inv_n;

            let prev = &scores;
            new_scores
                .par_iter_mut()
                .enumerate()
                .for_each(|(v, slot)| {
                    let gathered: f64 = graph
                        .predecessors(v as u32)
                        .map(|(u, w)| prev[u as usize] * w / graph.node_total_weight(u))
                        .sum();
                    *slot = base + self.damping * gathered;
                });

            delta = l1_distance(&scores, &new_scores);

            std::mem::swap(&mut scores, &mut new_scores);
        }

        Ok(PageRankResult::new(
            scores,
            iterations,
            delta,
            delta < self.tolerance,
        ))
    }
}

/// ℓ1 distance between two rank vectors (sum of absolute differences)
pub(crate) fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use std::collections::HashMap;

    /// The five-node link graph from the worked example:
    /// A -> B, C;  B -> C;  C -> A;  D -> B;  E -> C
    fn build_five_node_graph() -> CsrGraph {
        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        adjacency.insert("a".into(), vec!["b".into(), "c".into()]);
        adjacency.insert("b".into(), vec!["c".into()]);
        adjacency.insert("c".into(), vec!["a".into()]);
        adjacency.insert("d".into(), vec!["b".into()]);
        adjacency.insert("e".into(), vec!["c".into()]);
        CsrGraph::from_adjacency(&adjacency).unwrap()
    }

    fn build_cycle_graph() -> CsrGraph {
        let mut builder = GraphBuilder::new();
        let a = builder.get_or_create_node("a");
        let b = builder.get_or_create_node("b");
        let c = builder.get_or_create_node("c");

        builder.add_edge(a, b, 1.0);
        builder.add_edge(b, c, 1.0);
        builder.add_edge(c, a, 1.0);

        CsrGraph::from_builder(&builder)
    }

    #[test]
    fn test_cycle_graph_equal_scores() {
        let graph = build_cycle_graph();
        let pr = StandardPageRank::new();
        let result = pr.run(&graph).unwrap();

        assert!(result.converged);
        // Every node has the same in/out structure, so scores are equal
        let expected = 1.0 / 3.0;
        for score in &result.scores {
            assert!((score - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_single_iteration_worked_example() {
        let graph = build_five_node_graph();
        let pr = StandardPageRank::new().with_max_iterations(1);
        let result = pr.run(&graph).unwrap();

        assert_eq!(result.iterations, 1);
        assert!(!result.converged);

        // Labels sort a..e, so ids follow that order
        let eps = 1e-12;
        assert!((result.score(0) - 0.20).abs() < eps); // a
        assert!((result.score(1) - 0.285).abs() < eps); // b
        assert!((result.score(2) - 0.455).abs() < eps); // c
        assert!((result.score(3) - 0.03).abs() < eps); // d
        assert!((result.score(4) - 0.03).abs() < eps); // e

        // Total l1 change from the uniform start
        assert!((result.delta - 0.68).abs() < 1e-12);
    }

    #[test]
    fn test_convergence_to_stationary_distribution() {
        let graph = build_five_node_graph();
        let pr = StandardPageRank::new();
        let result = pr.run(&graph).unwrap();

        assert!(result.converged);
        assert!(result.iterations < 100);

        // Analytic stationary distribution of this graph at d = 0.85
        let expected = [0.35357, 0.20577, 0.38067, 0.03, 0.03];
        for (score, want) in result.scores.iter().zip(expected.iter()) {
            assert!((score - want).abs() < 1e-3);
        }

        // d has no in-links, so its stationary rank is exactly the floor
        assert!((result.score(3) - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_no_inlink_node_settles_at_teleport_floor() {
        // d and e have out-links but nothing points at them, so they drop
        // to (1 - 0.85) / 5 = 0.03 after the first iteration and stay there
        let graph = build_five_node_graph();

        let one = StandardPageRank::new()
            .with_max_iterations(1)
            .run(&graph)
            .unwrap();
        assert!((one.score(3) - 0.03).abs() < 1e-12);
        assert!((one.score(4) - 0.03).abs() < 1e-12);

        let full = StandardPageRank::new().run(&graph).unwrap();
        assert!(full.converged);
        assert!((full.score(3) - 0.03).abs() < 1e-12);
        assert!((full.score(4) - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_isolated_node_receives_own_dangling_mass() {
        // A node with no links either way is dangling: its mass spreads
        // uniformly over all nodes, itself included
        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        adjacency.insert("a".into(), vec!["b".into()]);
        adjacency.insert("b".into(), vec!["c".into()]);
        adjacency.insert("c".into(), vec!["a".into()]);
        adjacency.insert("d".into(), vec!["a".into()]);
        adjacency.insert("x".into(), vec![]);
        let graph = CsrGraph::from_adjacency(&adjacency).unwrap();
        let x = graph.get_node_by_label("x").unwrap();

        // First iteration: 0.03 teleport + 0.85 * (0.2 dangling mass) / 5
        let one = StandardPageRank::new()
            .with_max_iterations(1)
            .run(&graph)
            .unwrap();
        assert!((one.score(x) - 0.064).abs() < 1e-12);

        // No mass leaks at any point
        let full = StandardPageRank::new().run(&graph).unwrap();
        assert!(full.converged);
        let sum: f64 = full.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scores_sum_to_one_without_renormalization() {
        let graph = build_five_node_graph();

        // After one iteration and after convergence alike
        for max_iterations in [1, 100] {
            let result = StandardPageRank::new()
                .with_max_iterations(max_iterations)
                .run(&graph)
                .unwrap();
            let sum: f64 = result.scores.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            assert!(result.scores.iter().all(|&s| s >= 0.0));
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let graph = build_five_node_graph();
        let pr = StandardPageRank::new();

        let first = pr.run(&graph).unwrap();
        let second = pr.run(&graph).unwrap();

        assert_eq!(first.scores, second.scores);
        assert_eq!(first.iterations, second.iterations);
    }

    #[test]
    fn test_parallel_agrees_with_sequential() {
        // A ring large enough to clear the parallel cutoff
        let mut builder = GraphBuilder::new();
        let n = 2000u32;
        for i in 0..n {
            builder.get_or_create_node(&format!("n{i:04}"));
        }
        for i in 0..n {
            builder.add_edge(i, (i + 1) % n, 1.0);
            builder.add_edge(i, (i + 7) % n, (1 + i % 5) as f64);
        }
        let graph = CsrGraph::from_builder(&builder);

        let pr = StandardPageRank::new();
        let sequential = pr.run(&graph).unwrap();
        let parallel = pr.run_parallel(&graph).unwrap();

        assert_eq!(sequential.scores, parallel.scores);
        assert_eq!(sequential.iterations, parallel.iterations);
    }

    #[test]
    fn test_empty_graph_rejected() {
        let graph = CsrGraph::default();
        let pr = StandardPageRank::new();
        let err = pr.run(&graph).unwrap_err();
        assert!(matches!(err, Error::InvalidGraph(_)));
    }

    #[test]
    fn test_max_iterations_returns_partial() {
        let graph = build_five_node_graph();
        let pr = StandardPageRank::new()
            .with_max_iterations(2)
            .with_tolerance(1e-12);

        let result = pr.run(&graph).unwrap();

        assert_eq!(result.iterations, 2);
        assert!(!result.converged);
        // Still a valid distribution
        let sum: f64 = result.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parameter_validation() {
        let graph = build_cycle_graph();

        for pr in [
            StandardPageRank::new().with_damping(1.0),
            StandardPageRank::new().with_damping(-0.1),
            StandardPageRank::new().with_damping(f64::NAN),
            StandardPageRank::new().with_tolerance(0.0),
            StandardPageRank::new().with_tolerance(-1e-6),
            StandardPageRank::new().with_max_iterations(0),
        ] {
            let err = pr.run(&graph).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)));
        }
    }

    #[test]
    fn test_zero_damping_is_uniform() {
        // d = 0 means pure teleportation: every node gets 1/N immediately
        let graph = build_five_node_graph();
        let result = StandardPageRank::new()
            .with_damping(0.0)
            .run(&graph)
            .unwrap();

        assert!(result.converged);
        for score in &result.scores {
            assert!((score - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_damping_factor_sharpens_ranking() {
        let graph = build_five_node_graph();

        let low = StandardPageRank::new()
            .with_damping(0.5)
            .run(&graph)
            .unwrap();
        let high = StandardPageRank::new()
            .with_damping(0.95)
            .run(&graph)
            .unwrap();

        // c is the top node; with more damping its lead over d grows
        let lead_low = low.score(2) - low.score(3);
        let lead_high = high.score(2) - high.score(3);
        assert!(lead_high > lead_low);
    }

    #[test]
    fn test_top_n() {
        let graph = build_five_node_graph();
        let pr = StandardPageRank::new();
        let result = pr.run(&graph).unwrap();

        let top_2 = result.top_n(2);
        assert_eq!(top_2.len(), 2);
        // c first, then a
        assert_eq!(top_2[0].0, 2);
        assert_eq!(top_2[1].0, 0);
    }

    #[test]
    fn test_weighted_out_edges_split_proportionally() {
        // a -> b with weight 3, a -> c with weight 1: b gets 3/4 of a's mass
        let mut builder = GraphBuilder::new();
        let a = builder.get_or_create_node("a");
        let b = builder.get_or_create_node("b");
        let c = builder.get_or_create_node("c");
        builder.add_edge(a, b, 3.0);
        builder.add_edge(a, c, 1.0);
        builder.add_edge(b, a, 1.0);
        builder.add_edge(c, a, 1.0);
        let graph = CsrGraph::from_builder(&builder);

        let one = StandardPageRank::new()
            .with_max_iterations(1)
            .run(&graph)
            .unwrap();

        // After one iteration from uniform 1/3:
        //   b = 0.05 + 0.85 * (1/3 * 3/4), c = 0.05 + 0.85 * (1/3 * 1/4)
        assert!((one.score(1) - (0.05 + 0.85 / 4.0)).abs() < 1e-12);
        assert!((one.score(2) - (0.05 + 0.85 / 12.0)).abs() < 1e-12);
    }
}
