//! Directed graph builder with efficient edge handling
//!
//! This module provides a mutable graph builder that uses FxHashMap
//! for O(1) edge lookups during construction. The checked
//! [`GraphBuilder::from_adjacency`] boundary enforces the closed-node-set
//! contract: every successor must itself be a key of the mapping.

use crate::{Error, Result};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// A node in the graph builder
#[derive(Debug, Clone)]
pub struct BuilderNode {
    /// The label for this node
    pub label: String,
    /// Out-adjacency: target node ID -> accumulated edge weight
    pub edges: FxHashMap<u32, f64>,
}

impl BuilderNode {
    /// Create a new node
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            edges: FxHashMap::default(),
        }
    }
}

/// A mutable directed-graph builder optimized for incremental construction
#[derive(Debug)]
pub struct GraphBuilder {
    /// Maps label -> node ID
    label_to_id: FxHashMap<String, u32>,
    /// Node storage
    nodes: Vec<BuilderNode>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self {
            label_to_id: FxHashMap::default(),
            nodes: Vec::new(),
        }
    }

    /// Create a graph builder with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            label_to_id: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Get or create a node for the given label, returning its ID
    pub fn get_or_create_node(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.label_to_id.get(label) {
            return id;
        }

        let id = self.nodes.len() as u32;
        self.label_to_id.insert(label.to_string(), id);
        self.nodes.push(BuilderNode::new(label));
        id
    }

    /// Add weight to the directed edge `from -> to`
    ///
    /// If the edge doesn't exist, it's created. Repeated calls accumulate,
    /// so a node listing the same successor twice sends it a double share
    /// of rank mass. Self-loops are permitted.
    pub fn add_edge(&mut self, from: u32, to: u32, weight: f64) {
        if let Some(node) = self.nodes.get_mut(from as usize) {
            *node.edges.entry(to).or_insert(0.0) += weight;
        }
    }

    /// Build a graph from a label-keyed adjacency mapping
    ///
    /// The key set is the full node universe. Node IDs are assigned in
    /// sorted label order so downstream iteration never depends on hash-map
    /// layout. Fails if the mapping is empty or a successor is not a key.
    pub fn from_adjacency<S: BuildHasher>(
        adjacency: &HashMap<String, Vec<String>, S>,
    ) -> Result<Self> {
        if adjacency.is_empty() {
            return Err(Error::InvalidGraph("graph has no nodes".to_string()));
        }

        let mut labels: Vec<&String> = adjacency.keys().collect();
        labels.sort();

        let mut builder = Self::with_capacity(labels.len());
        for label in &labels {
            builder.get_or_create_node(label.as_str());
        }

        for label in &labels {
            let from = builder.label_to_id[label.as_str()];
            for successor in &adjacency[label.as_str()] {
                let to = match builder.label_to_id.get(successor.as_str()) {
                    Some(&id) => id,
                    None => {
                        return Err(Error::InvalidGraph(format!(
                            "successor \"{successor}\" of node \"{label}\" is not a key of the graph"
                        )))
                    }
                };
                builder.add_edge(from, to, 1.0);
            }
        }

        Ok(builder)
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of distinct directed edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by label
    pub fn get_node_id(&self, label: &str) -> Option<u32> {
        self.label_to_id.get(label).copied()
    }

    /// Get the label for a node ID
    pub fn get_label(&self, id: u32) -> Option<&str> {
        self.nodes.get(id as usize).map(|n| n.label.as_str())
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
