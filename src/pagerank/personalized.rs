//! Personalized PageRank (PPR) algorithm
//!
//! PPR uses a custom teleport distribution instead of uniform
//! teleportation, biasing the ranking towards specific nodes. Dangling
//! mass follows the same distribution, so the stochastic-output invariant
//! holds exactly as in the standard variant.

use super::standard::l1_distance;
use super::PageRankResult;
use crate::graph::csr::CsrGraph;
use crate::{Error, Result};

/// Personalized PageRank implementation
#[derive(Debug, Clone)]
pub struct PersonalizedPageRank {
    /// Damping factor in [0, 1) (typically 0.85)
    pub damping: f64,
    /// Maximum number of iterations (hard termination cap)
    pub max_iterations: usize,
    /// Convergence tolerance on the ℓ1 distance between iterates
    pub tolerance: f64,
    /// Personalization vector (bias distribution)
    personalization: Option<Vec<f64>>,
}

impl Default for PersonalizedPageRank {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
            personalization: None,
        }
    }
}

impl PersonalizedPageRank {
    /// Create a new PersonalizedPageRank with default settings
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

    /// Set the personalization vector (bias distribution)
    ///
    /// One entry per node; it will be normalized internally. Nodes with
    /// higher values are favored during teleportation and receive a larger
    /// share of redistributed dangling mass.
    pub fn with_personalization(mut self, personalization: Vec<f64>) -> Self {
        self.personalization = Some(personalization);
        self
    }

    /// Set personalization from a sparse representation
    ///
    /// Takes a list of (node_id, weight) pairs and the total number of nodes.
    /// Nodes not in the list get weight 0.
    pub fn with_sparse_personalization(mut self, biases: &[(u32, f64)], num_nodes: usize) -> Self {
        let mut personalization = vec![0.0; num_nodes];
        for &(node, weight) in biases {
            if (node as usize) < num_nodes {
                personalization[node as usize] = weight;
            }
        }
        self.personalization = Some(personalization);
        self
    }

    /// Check parameters and the personalization vector against a graph of
    /// `n` nodes without running
    pub fn validate(&self, n: usize) -> Result<()> {
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
        if let Some(p) = &self.personalization {
            if p.len() != n {
                return Err(Error::InvalidParameter(format!(
                    "personalization length must equal the node count (len={} node_count={})",
                    p.len(),
                    n
                )));
            }
            for &x in p {
                if !x.is_finite() || x < 0.0 {
                    return Err(Error::InvalidParameter(
                        "personalization entries must be finite and non-negative".to_string(),
                    ));
                }
            }
            if p.iter().sum::<f64>() <= 0.0 {
                return Err(Error::InvalidParameter(
                    "personalization must have positive total mass".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Run Personalized PageRank on a graph
    pub fn run(&self, graph: &CsrGraph) -> Result<PageRankResult> {
        if graph.is_empty() {
            return Err(Error::InvalidGraph("graph has no nodes".to_string()));
        }
        let n = graph.num_nodes;
        self.validate(n)?;

        let teleport = self.prepare_personalization(n);

        let inv_n = 1.0 / n as f64;
        let mut scores = vec![inv_n; n];
        let mut new_scores = vec![0.0; n];

        let dangling_nodes = graph.dangling_nodes();
        let mut iterations = 0;
        let mut delta = f64::MAX;

        while iterations < self.max_iterations && delta >= self.tolerance {
            iterations += 1;

            // Dangling mass follows the teleport distribution
            let dangling_mass: f64 = dangling_nodes.iter().map(|&d| scores[d as usize]).sum();

            for v in 0..n {
                let gathered: f64 = graph
                    .predecessors(v as u32)
                    .map(|(u, w)| scores[u as usize] * w / graph.node_total_weight(u))
                    .sum();
                new_scores[v] = (1.0 - self.damping) * teleport[v]
                    + self.damping * (dangling_mass * teleport[v] + gathered);
            }

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

    /// Normalize the personalization into a probability distribution
    ///
    /// `validate` has already rejected negative entries and zero total
    /// mass; absent personalization falls back to the uniform distribution
    /// (equivalent to standard PageRank).
    fn prepare_personalization(&self, n: usize) -> Vec<f64> {
        match &self.personalization {
            Some(p) => {
                let sum: f64 = p.iter().sum();
                p.iter().map(|&x| x / sum).collect()
            }
            None => vec![1.0 / n as f64; n],
        }
    }
}
