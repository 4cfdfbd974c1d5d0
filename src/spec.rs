//! Rank specification types.
//!
//! A [`RankSpec`] describes the ranking parameters, which PageRank variant
//! to run, runtime execution limits, and strictness settings. These types
//! are the input to the [`crate::validation::ValidationEngine`] and to
//! [`crate::engine::compute`].
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "damping": 0.85,
//!   "tolerance": 1e-6,
//!   "max_iterations": 100,
//!   "mode": "standard_pagerank",
//!   "runtime": { "max_nodes": 50000 },
//!   "strict": false
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

fn default_damping() -> f64 {
    0.85
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> usize {
    100
}

/// Top-level rank specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSpec {
    /// Probability of following an out-link rather than teleporting.
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Convergence tolerance on the ℓ1 distance between iterates.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Hard iteration cap guaranteeing termination without convergence.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// PageRank variant to run.
    #[serde(default)]
    pub mode: RankMode,

    /// Teleport weights keyed by node label, for personalized mode.
    #[serde(default)]
    pub teleport: Option<HashMap<String, f64>>,

    /// Runtime execution limits.
    #[serde(default)]
    pub runtime: RuntimeSpec,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    /// Used by the strict-mode validation rule.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl Default for RankSpec {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            mode: RankMode::default(),
            teleport: None,
            runtime: RuntimeSpec::default(),
            strict: false,
            unknown_fields: HashMap::new(),
        }
    }
}

/// PageRank variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMode {
    /// Standard (uniform-teleport) PageRank.
    #[default]
    StandardPagerank,
    /// Personalized PageRank with a teleport distribution.
    PersonalizedPagerank,
}

impl RankMode {
    /// Returns the user-facing name used in JSON and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandardPagerank => "standard_pagerank",
            Self::PersonalizedPagerank => "personalized_pagerank",
        }
    }
}

/// Runtime execution limits (fail-fast guards).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeSpec {
    /// Maximum number of graph nodes before rejecting.
    #[serde(default)]
    pub max_nodes: Option<usize>,

    /// Maximum number of graph edges before rejecting.
    #[serde(default)]
    pub max_edges: Option<usize>,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_spec() {
        let json = r#"{}"#;
        let spec: RankSpec = serde_json::from_str(json).unwrap();
        assert!((spec.damping - 0.85).abs() < 1e-12);
        assert!((spec.tolerance - 1e-6).abs() < 1e-18);
        assert_eq!(spec.max_iterations, 100);
        assert_eq!(spec.mode, RankMode::StandardPagerank);
        assert!(spec.teleport.is_none());
        assert!(!spec.strict);
    }

    #[test]
    fn test_default_matches_minimal_json() {
        let parsed: RankSpec = serde_json::from_str("{}").unwrap();
        let built = RankSpec::default();
        assert_eq!(parsed.damping, built.damping);
        assert_eq!(parsed.tolerance, built.tolerance);
        assert_eq!(parsed.max_iterations, built.max_iterations);
        assert_eq!(parsed.mode, built.mode);
    }

    #[test]
    fn test_deserialize_full_spec() {
        let json = r#"{
            "damping": 0.9,
            "tolerance": 1e-8,
            "max_iterations": 200,
            "mode": "personalized_pagerank",
            "teleport": { "hub": 1.0, "spoke": 0.25 },
            "runtime": { "max_nodes": 50000, "max_edges": 1000000 },
            "strict": true
        }"#;
        let spec: RankSpec = serde_json::from_str(json).unwrap();
        assert!((spec.damping - 0.9).abs() < 1e-12);
        assert_eq!(spec.max_iterations, 200);
        assert_eq!(spec.mode, RankMode::PersonalizedPagerank);
        let teleport = spec.teleport.unwrap();
        assert_eq!(teleport.len(), 2);
        assert!((teleport["hub"] - 1.0).abs() < 1e-12);
        assert_eq!(spec.runtime.max_nodes, Some(50000));
        assert_eq!(spec.runtime.max_edges, Some(1000000));
        assert!(spec.strict);
    }

    #[test]
    fn test_unknown_fields_captured() {
        let json = r#"{
            "bogus_top_level": 42,
            "runtime": { "max_threads": 8 }
        }"#;
        let spec: RankSpec = serde_json::from_str(json).unwrap();
        assert!(spec.unknown_fields.contains_key("bogus_top_level"));
        assert!(spec.runtime.unknown_fields.contains_key("max_threads"));
    }

    #[test]
    fn test_mode_as_str() {
        assert_eq!(RankMode::StandardPagerank.as_str(), "standard_pagerank");
        assert_eq!(
            RankMode::PersonalizedPagerank.as_str(),
            "personalized_pagerank"
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = r#"{"mode":"personalized_pagerank","teleport":{"a":2.0}}"#;
        let spec: RankSpec = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&spec).unwrap();
        assert_eq!(back["mode"], "personalized_pagerank");
        assert_eq!(back["teleport"]["a"], 2.0);
    }
}
