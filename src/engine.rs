//! Engine entry points — orchestrates validation, graph construction, and
//! ranking.
//!
//! [`compute`] is the one boundary of the crate: a label-keyed adjacency
//! mapping plus a [`RankSpec`] in, a label-keyed score mapping (with
//! convergence diagnostics) out. All rejection happens before the first
//! iteration; non-convergence within the iteration cap is reported, not
//! raised.

use std::collections::HashMap;
use std::hash::BuildHasher;

use rustc_hash::FxHashMap;

use crate::graph::csr::CsrGraph;
use crate::pagerank::personalized::PersonalizedPageRank;
use crate::pagerank::standard::StandardPageRank;
use crate::pagerank::PageRankResult;
use crate::spec::{RankMode, RankSpec, RuntimeSpec};
use crate::validation::ValidationEngine;
use crate::{Error, Result};

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for an engine stage (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("engine_stage", stage = $name).entered();
    };
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The user-facing result of a [`compute`] call: scores keyed by node label
/// plus the convergence diagnostics of the underlying run.
#[derive(Debug, Clone)]
pub struct RankOutcome {
    /// Final rank for every node, keyed by label
    pub scores: FxHashMap<String, f64>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Final ℓ1 distance between the last two iterates
    pub delta: f64,
    /// Whether the ℓ1 distance dropped below the tolerance
    pub converged: bool,
}

impl RankOutcome {
    fn from_result(result: PageRankResult, graph: &CsrGraph) -> Self {
        let scores = graph
            .labels
            .iter()
            .zip(result.scores.iter())
            .map(|(label, &score)| (label.clone(), score))
            .collect();
        Self {
            scores,
            iterations: result.iterations,
            delta: result.delta,
            converged: result.converged,
        }
    }

    /// Get the score for a specific node label
    pub fn score(&self, label: &str) -> Option<f64> {
        self.scores.get(label).copied()
    }

    /// Get the top N labels by score, ties broken by label for determinism
    pub fn top_n(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<_> = self
            .scores
            .iter()
            .map(|(label, &score)| (label.clone(), score))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}

// ---------------------------------------------------------------------------
// compute — validate, build, rank
// ---------------------------------------------------------------------------

/// Compute the PageRank distribution of a directed graph.
///
/// The adjacency mapping's key set is the full node universe; every
/// successor must itself be a key. Spec validation, graph validation, and
/// runtime limits are all checked before the first iteration runs.
pub fn compute<S: BuildHasher>(
    adjacency: &HashMap<String, Vec<String>, S>,
    spec: &RankSpec,
) -> Result<RankOutcome> {
    {
        trace_stage!("validate");
        let report = ValidationEngine::with_defaults().validate(spec);
        if report.has_errors() {
            let joined = report
                .errors()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::InvalidParameter(joined));
        }
    }

    let graph = {
        trace_stage!("graph");
        let graph = CsrGraph::from_adjacency(adjacency)?;
        enforce_limits(&graph, &spec.runtime)?;
        graph
    };

    let result = {
        trace_stage!("rank");
        match spec.mode {
            RankMode::StandardPagerank => StandardPageRank::new()
                .with_damping(spec.damping)
                .with_tolerance(spec.tolerance)
                .with_max_iterations(spec.max_iterations)
                .run(&graph)?,
            RankMode::PersonalizedPagerank => {
                let teleport = spec.teleport.as_ref().ok_or_else(|| {
                    Error::InvalidParameter(
                        "personalized_pagerank requires a teleport map".to_string(),
                    )
                })?;
                let personalization = dense_teleport(teleport, &graph)?;
                PersonalizedPageRank::new()
                    .with_damping(spec.damping)
                    .with_tolerance(spec.tolerance)
                    .with_max_iterations(spec.max_iterations)
                    .with_personalization(personalization)
                    .run(&graph)?
            }
        }
    };

    Ok(RankOutcome::from_result(result, &graph))
}

/// Compute PageRank with default parameters, returning just the score map.
pub fn pagerank<S: BuildHasher>(
    adjacency: &HashMap<String, Vec<String>, S>,
) -> Result<FxHashMap<String, f64>> {
    compute(adjacency, &RankSpec::default()).map(|outcome| outcome.scores)
}

/// Reject graphs larger than the configured runtime limits.
fn enforce_limits(graph: &CsrGraph, runtime: &RuntimeSpec) -> Result<()> {
    if let Some(max_nodes) = runtime.max_nodes {
        if graph.num_nodes > max_nodes {
            return Err(Error::LimitExceeded(format!(
                "graph has {} nodes, max_nodes is {}",
                graph.num_nodes, max_nodes
            )));
        }
    }
    if let Some(max_edges) = runtime.max_edges {
        if graph.num_edges() > max_edges {
            return Err(Error::LimitExceeded(format!(
                "graph has {} edges, max_edges is {}",
                graph.num_edges(),
                max_edges
            )));
        }
    }
    Ok(())
}

/// Materialize a label-keyed teleport map as a dense per-node vector.
///
/// Labels absent from the map get weight 0; a label absent from the graph
/// is a closed-node-set violation.
fn dense_teleport(teleport: &HashMap<String, f64>, graph: &CsrGraph) -> Result<Vec<f64>> {
    let mut dense = vec![0.0; graph.num_nodes];
    for (label, &weight) in teleport {
        match graph.get_node_by_label(label) {
            Some(id) => dense[id as usize] = weight,
            None => {
                return Err(Error::InvalidParameter(format!(
                    "teleport references unknown node \"{label}\""
                )))
            }
        }
    }
    Ok(dense)
}
