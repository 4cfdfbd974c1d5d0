//! `rapid-pagerank`: damped power-iteration PageRank over directed graphs.
//!
//! Given a fixed directed graph, [`compute`] produces its stationary rank
//! distribution via power iteration with dangling-mass redistribution and a
//! teleportation floor. Graphs enter through a label-keyed adjacency mapping
//! and are compiled once into an immutable CSR form with a derived inbound
//! index, which every iteration gathers over.
//!
//! Public invariants (must not drift):
//! - **Stochastic output**: scores are non-negative and sum to 1 within
//!   floating-point rounding after every iteration — the update formula
//!   preserves the invariant; there is no renormalization pass.
//! - **Determinism**: identical graph and parameters produce identical
//!   output. Labels are assigned dense ids in sorted order and edges are
//!   sorted, so iteration order never depends on hash-map layout.
//! - **Snapshot isolation**: each iteration reads only the previous
//!   iteration's vector. The two buffers are swapped wholesale, never
//!   partially mutated mid-read.
//! - **Fail fast**: malformed graphs and parameters are rejected before any
//!   iteration runs. Non-convergence within the iteration cap is *not* an
//!   error; the result reports the achieved ℓ1 delta and iteration count.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rapid_pagerank::pagerank;
//! use std::collections::HashMap;
//!
//! let mut adjacency = HashMap::new();
//! adjacency.insert("a".to_string(), vec!["b".to_string()]);
//! adjacency.insert("b".to_string(), vec!["a".to_string()]);
//!
//! let scores = pagerank(&adjacency)?;
//! ```

pub mod engine;
pub mod graph;
pub mod pagerank;
pub mod spec;
pub mod validation;

pub use engine::{compute, pagerank, RankOutcome};
pub use graph::builder::GraphBuilder;
pub use graph::csr::CsrGraph;
pub use pagerank::personalized::PersonalizedPageRank;
pub use pagerank::standard::StandardPageRank;
pub use pagerank::PageRankResult;
pub use spec::{RankMode, RankSpec, RuntimeSpec};
pub use validation::{
    ErrorCode, Severity, SpecDiagnostic, SpecError, ValidationEngine, ValidationReport,
    ValidationRule,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The graph is empty, or references a node absent from its key set.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
    /// A numeric parameter or teleport distribution is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A configured runtime limit was exceeded before ranking.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

pub type Result<T> = std::result::Result<T, Error>;
