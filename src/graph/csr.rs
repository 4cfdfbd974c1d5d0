//! Compressed Sparse Row (CSR) graph representation
//!
//! CSR stores edges contiguously, which is exactly what PageRank needs
//! during power iteration. Alongside the out-edges this form carries the
//! derived inbound index (the transposed CSR): the power iteration gathers
//! each node's new rank from its predecessors, and precomputing the
//! transpose once is what makes every iteration O(V+E) instead of O(V²).

use super::builder::GraphBuilder;
use crate::Result;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// A directed graph in Compressed Sparse Row format
///
/// Immutable after construction. Out-edges drive out-degree and out-weight
/// bookkeeping; the inbound index drives the per-iteration gather.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// Number of nodes
    pub num_nodes: usize,
    /// Row pointers: node i's out-edges are at indices row_ptr[i]..row_ptr[i+1]
    pub row_ptr: Vec<usize>,
    /// Column indices (target nodes) for each out-edge
    pub col_idx: Vec<u32>,
    /// Out-edge weights
    pub weights: Vec<f64>,
    /// Out-degree for each node
    pub out_degree: Vec<u32>,
    /// Total outgoing weight for each node
    pub total_weight: Vec<f64>,
    /// Inbound row pointers: node i's in-edges are at in_row_ptr[i]..in_row_ptr[i+1]
    pub in_row_ptr: Vec<usize>,
    /// Source node for each in-edge
    pub in_col_idx: Vec<u32>,
    /// In-edge weights (same values as `weights`, transposed order)
    pub in_weights: Vec<f64>,
    /// Labels for each node
    pub labels: Vec<String>,
}

impl CsrGraph {
    /// Convert a GraphBuilder into CSR format
    pub fn from_builder(builder: &GraphBuilder) -> Self {
        let num_nodes = builder.node_count();
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::new();
        let mut weights = Vec::new();
        let mut out_degree = Vec::with_capacity(num_nodes);
        let mut total_weight = Vec::with_capacity(num_nodes);
        let mut labels = Vec::with_capacity(num_nodes);

        row_ptr.push(0);

        for (_, node) in builder.nodes() {
            labels.push(node.label.clone());

            // Collect and sort edges for deterministic iteration
            let mut edges: Vec<_> = node.edges.iter().map(|(&k, &v)| (k, v)).collect();
            edges.sort_by_key(|(k, _)| *k);

            out_degree.push(edges.len() as u32);
            total_weight.push(edges.iter().map(|(_, w)| w).sum());

            for (target, weight) in edges {
                col_idx.push(target);
                weights.push(weight);
            }

            row_ptr.push(col_idx.len());
        }

        // Transpose the out-CSR into the inbound index: counting pass,
        // prefix sums, then a fill pass with per-row cursors. Sources fill
        // in ascending order, so each inbound row is itself sorted.
        let num_edges = col_idx.len();
        let mut in_row_ptr = vec![0usize; num_nodes + 1];
        for &target in &col_idx {
            in_row_ptr[target as usize + 1] += 1;
        }
        for i in 0..num_nodes {
            in_row_ptr[i + 1] += in_row_ptr[i];
        }

        let mut in_col_idx = vec![0u32; num_edges];
        let mut in_weights = vec![0.0f64; num_edges];
        let mut cursor = in_row_ptr.clone();
        for source in 0..num_nodes {
            for e in row_ptr[source]..row_ptr[source + 1] {
                let target = col_idx[e] as usize;
                let slot = cursor[target];
                in_col_idx[slot] = source as u32;
                in_weights[slot] = weights[e];
                cursor[target] += 1;
            }
        }

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            weights,
            out_degree,
            total_weight,
            in_row_ptr,
            in_col_idx,
            in_weights,
            labels,
        }
    }

    /// Build directly from a label-keyed adjacency mapping
    ///
    /// Fails if the mapping is empty or references an unknown successor.
    pub fn from_adjacency<S: BuildHasher>(
        adjacency: &HashMap<String, Vec<String>, S>,
    ) -> Result<Self> {
        Ok(Self::from_builder(&GraphBuilder::from_adjacency(
            adjacency,
        )?))
    }

    /// Iterate over the successors of a node
    pub fn successors(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        (start..end).map(move |i| (self.col_idx[i], self.weights[i]))
    }

    /// Iterate over the predecessors of a node (nodes linking to it)
    pub fn predecessors(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.in_row_ptr[node as usize];
        let end = self.in_row_ptr[node as usize + 1];
        (start..end).map(move |i| (self.in_col_idx[i], self.in_weights[i]))
    }

    /// Get the out-degree of a node
    pub fn degree(&self, node: u32) -> u32 {
        self.out_degree[node as usize]
    }

    /// Get the total outgoing weight of a node
    pub fn node_total_weight(&self, node: u32) -> f64 {
        self.total_weight[node as usize]
    }

    /// Get the label for a node
    pub fn label(&self, node: u32) -> &str {
        &self.labels[node as usize]
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Get the total number of directed edges
    pub fn num_edges(&self) -> usize {
        self.col_idx.len()
    }

    /// Find dangling nodes (nodes with no outgoing edges)
    pub fn dangling_nodes(&self) -> Vec<u32> {
        (0..self.num_nodes as u32)
            .filter(|&n| self.out_degree[n as usize] == 0)
            .collect()
    }

    /// Get node ID by label (linear search - use sparingly)
    pub fn get_node_by_label(&self, label: &str) -> Option<u32> {
        self.labels.iter().position(|l| l == label).map(|i| i as u32)
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            row_ptr: vec![0],
            col_idx: Vec::new(),
            weights: Vec::new(),
            out_degree: Vec::new(),
            total_weight: Vec::new(),
            in_row_ptr: vec![0],
            in_col_idx: Vec::new(),
            in_weights: Vec::new(),
            labels: Vec::new(),
        }
    }
}
