use std::collections::BTreeSet;

use hra_core::errors::{ErrorInfo, HraError};
use hra_core::limits::{ensure_node_capacity, MAX_EDGES};
use hra_core::{Edge, Regulation};
use serde::{Deserialize, Serialize};

/// Directed, edge-labelled graph over dense node indices `0..node_count`.
///
/// The edge list keeps insertion order, the adjacency matrix answers
/// `(from, to)` lookups, and the degree counters are maintained on every
/// insertion. All three views always agree because [`RegulatoryGraph::add_edge`]
/// rejects self-loops and duplicate ordered pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatoryGraph {
    node_count: usize,
    edges: Vec<Edge>,
    adjacency: Vec<Option<Regulation>>,
    in_degree: Vec<usize>,
    out_degree: Vec<usize>,
    gray_in_degree: Vec<usize>,
}

impl RegulatoryGraph {
    /// Creates a graph with `node_count` nodes and no edges.
    pub fn new(node_count: usize) -> Result<Self, HraError> {
        ensure_node_capacity(node_count)?;
        Ok(Self {
            node_count,
            edges: Vec::new(),
            adjacency: vec![None; node_count * node_count],
            in_degree: vec![0; node_count],
            out_degree: vec![0; node_count],
            gray_in_degree: vec![0; node_count],
        })
    }

    /// Builds a graph from an edge list, validating every insertion.
    pub fn from_edges(
        node_count: usize,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Result<Self, HraError> {
        let mut graph = Self::new(node_count)?;
        for edge in edges {
            graph.add_edge(edge.from, edge.to, edge.regulation)?;
        }
        Ok(graph)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the edges as an order-independent set.
    pub fn edge_set(&self) -> BTreeSet<Edge> {
        self.edges.iter().copied().collect()
    }

    /// Returns the label of the edge `from -> to`, if present.
    pub fn regulation(&self, from: usize, to: usize) -> Option<Regulation> {
        if from >= self.node_count || to >= self.node_count {
            return None;
        }
        self.adjacency[from * self.node_count + to]
    }

    /// Returns the adjacency cell as `-1` (absent or out of range), `0` (gray)
    /// or `1` (black).
    pub fn cell(&self, from: usize, to: usize) -> i8 {
        match self.regulation(from, to) {
            None => -1,
            Some(regulation) => regulation.as_label() as i8,
        }
    }

    /// Returns the inbound degree of `node`.
    pub fn in_degree(&self, node: usize) -> usize {
        self.in_degree.get(node).copied().unwrap_or(0)
    }

    /// Returns the outbound degree of `node`.
    pub fn out_degree(&self, node: usize) -> usize {
        self.out_degree.get(node).copied().unwrap_or(0)
    }

    /// Returns the number of gray edges entering `node`.
    pub fn gray_in_degree(&self, node: usize) -> usize {
        self.gray_in_degree.get(node).copied().unwrap_or(0)
    }

    /// Returns the sorted `(in, out)` degree pairs of all nodes.
    pub fn degree_sequence(&self) -> Vec<(usize, usize)> {
        let mut sequence: Vec<(usize, usize)> = (0..self.node_count)
            .map(|node| (self.in_degree[node], self.out_degree[node]))
            .collect();
        sequence.sort_unstable();
        sequence
    }

    /// Appends the edge `from -> to` labelled `regulation`.
    ///
    /// Fails without modifying the graph when an endpoint is out of range,
    /// the edge is a self-loop, the ordered pair is already present, or the
    /// edge capacity would be exceeded.
    pub fn add_edge(
        &mut self,
        from: usize,
        to: usize,
        regulation: Regulation,
    ) -> Result<(), HraError> {
        if from >= self.node_count || to >= self.node_count {
            return Err(graph_error("endpoint-out-of-range", "edge endpoint is not a node")
                .with_context("from", from)
                .with_context("to", to)
                .with_context("nodes", self.node_count));
        }
        if from == to {
            return Err(graph_error("self-loop", "self-loops are not part of the model")
                .with_context("node", from));
        }
        if self.edges.len() >= MAX_EDGES {
            return Err(HraError::Capacity(
                ErrorInfo::new("edge-capacity", "edge count exceeds the model maximum")
                    .with_context("max", MAX_EDGES),
            ));
        }
        let slot = from * self.node_count + to;
        if let Some(existing) = self.adjacency[slot] {
            return Err(graph_error("duplicate-edge", "edge already exists")
                .with_context("from", from)
                .with_context("to", to)
                .with_context("existing", existing));
        }
        self.adjacency[slot] = Some(regulation);
        self.edges.push(Edge::new(from, to, regulation));
        self.out_degree[from] += 1;
        self.in_degree[to] += 1;
        if regulation == Regulation::Gray {
            self.gray_in_degree[to] += 1;
        }
        Ok(())
    }

    /// Returns a copy of this graph with one additional, isolated node.
    pub fn with_added_node(&self) -> Result<Self, HraError> {
        Self::from_edges(self.node_count + 1, self.edges.iter().copied())
    }

    /// Returns a copy whose `i`-th edge carries bit `i` of `pattern` as its label.
    pub fn with_labels(&self, pattern: u64) -> Result<Self, HraError> {
        let edges = self
            .edges
            .iter()
            .enumerate()
            .map(|(bit, edge)| Edge::new(edge.from, edge.to, Regulation::from_bit(pattern, bit)));
        Self::from_edges(self.node_count, edges)
    }

    /// Returns the graph obtained by renaming node `i` to `permutation[i]`.
    pub fn relabel(&self, permutation: &[usize]) -> Result<Self, HraError> {
        let mut seen = vec![false; self.node_count];
        let valid = permutation.len() == self.node_count
            && permutation.iter().all(|&target| {
                target < self.node_count && !std::mem::replace(&mut seen[target], true)
            });
        if !valid {
            return Err(graph_error("invalid-permutation", "relabelling is not a permutation")
                .with_context("nodes", self.node_count)
                .with_context("length", permutation.len()));
        }
        let edges = self.edges.iter().map(|edge| {
            Edge::new(permutation[edge.from], permutation[edge.to], edge.regulation)
        });
        Self::from_edges(self.node_count, edges)
    }
}

pub(crate) fn graph_error(code: impl Into<String>, message: impl Into<String>) -> HraError {
    HraError::Graph(ErrorInfo::new(code, message))
}
