use std::fmt::{self, Display};
use std::str::FromStr;

use hra_core::errors::{ErrorInfo, HraError};
use hra_core::limits::ensure_canonical_capacity;
use hra_core::{Edge, Regulation};
use hra_graph::RegulatoryGraph;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lexicographically minimal row-major adjacency matrix over all relabellings.
///
/// Cells hold `-1` (absent), `0` (gray) or `1` (black). Two graphs are
/// isomorphic exactly when their representations are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalRep {
    node_count: usize,
    cells: Vec<i8>,
}

impl CanonicalRep {
    /// Returns the node count of the represented graph.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the flattened matrix cells.
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    /// Returns the number of edges encoded in the matrix.
    pub fn edge_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell >= 0).count()
    }

    /// Returns a short content-addressed identifier for the isomorphism class.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.node_count as u64).to_le_bytes());
        hasher.update(self.to_string().as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..16].to_string()
    }

    /// Rebuilds the canonically labelled graph, edges in row-major order.
    pub fn to_graph(&self) -> Result<RegulatoryGraph, HraError> {
        let n = self.node_count;
        let edges = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, &cell)| cell >= 0)
            .map(|(idx, &cell)| {
                let regulation = if cell == 0 {
                    Regulation::Gray
                } else {
                    Regulation::Black
                };
                Edge::new(idx / n, idx % n, regulation)
            });
        RegulatoryGraph::from_edges(n, edges)
    }
}

impl Display for CanonicalRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            let symbol = match cell {
                0 => '0',
                1 => '1',
                _ => '-',
            };
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

impl FromStr for CanonicalRep {
    type Err = HraError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let cells: Vec<i8> = text
            .chars()
            .map(|symbol| match symbol {
                '-' => Ok(-1),
                '0' => Ok(0),
                '1' => Ok(1),
                other => Err(HraError::Format(
                    ErrorInfo::new("invalid-canonical", "unexpected symbol in canonical form")
                        .with_context("symbol", other),
                )),
            })
            .collect::<Result<_, _>>()?;
        let node_count = (0..=hra_core::MAX_NODES)
            .find(|n| n * n == cells.len())
            .ok_or_else(|| {
                HraError::Format(
                    ErrorInfo::new("invalid-canonical", "canonical form is not a square matrix")
                        .with_context("cells", cells.len()),
                )
            })?;
        Ok(Self { node_count, cells })
    }
}

/// Canonical form together with the size of the automorphism group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalForm {
    /// Isomorphism-class signature.
    pub rep: CanonicalRep,
    /// Number of relabellings mapping the graph onto itself.
    pub automorphism_order: u64,
}

/// Computes the canonical representation of `graph`.
///
/// Every one of the n! relabellings is tried, so graphs larger than
/// [`hra_core::MAX_CANONICAL_NODES`] are rejected with a capacity error.
pub fn canonicalize(graph: &RegulatoryGraph) -> Result<CanonicalRep, HraError> {
    sweep(graph, false).map(|form| form.rep)
}

/// Computes the canonical representation and counts automorphisms in one sweep.
pub fn canonicalize_with_automorphisms(graph: &RegulatoryGraph) -> Result<CanonicalForm, HraError> {
    sweep(graph, true)
}

/// Returns whether two graphs are isomorphic as labelled digraphs.
pub fn are_isomorphic(a: &RegulatoryGraph, b: &RegulatoryGraph) -> Result<bool, HraError> {
    if a.node_count() != b.node_count()
        || a.edge_count() != b.edge_count()
        || a.degree_sequence() != b.degree_sequence()
    {
        return Ok(false);
    }
    Ok(canonicalize(a)? == canonicalize(b)?)
}

fn sweep(graph: &RegulatoryGraph, count_automorphisms: bool) -> Result<CanonicalForm, HraError> {
    let n = graph.node_count();
    ensure_canonical_capacity(n)?;
    let identity: Vec<i8> = (0..n)
        .flat_map(|from| (0..n).map(move |to| (from, to)))
        .map(|(from, to)| graph.cell(from, to))
        .collect();
    let mut best = identity.clone();
    let mut current = vec![0i8; n * n];
    let mut automorphism_order = 0u64;
    for perm in (0..n).permutations(n) {
        for (row, &from) in perm.iter().enumerate() {
            for (col, &to) in perm.iter().enumerate() {
                current[row * n + col] = graph.cell(from, to);
            }
        }
        if current < best {
            best.copy_from_slice(&current);
        }
        if count_automorphisms && current == identity {
            automorphism_order += 1;
        }
    }
    Ok(CanonicalForm {
        rep: CanonicalRep {
            node_count: n,
            cells: best,
        },
        automorphism_order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: usize, edges: &[(usize, usize, u8)]) -> RegulatoryGraph {
        RegulatoryGraph::from_edges(
            nodes,
            edges
                .iter()
                .map(|&(from, to, label)| Edge::new(from, to, Regulation::from_label(label).unwrap())),
        )
        .unwrap()
    }

    #[test]
    fn trivial_graphs_have_trivial_forms() {
        let empty = canonicalize(&graph(0, &[])).unwrap();
        assert_eq!(empty.node_count(), 0);
        assert!(empty.cells().is_empty());
        let single = canonicalize(&graph(1, &[])).unwrap();
        assert_eq!(single.cells(), &[-1]);
    }

    #[test]
    fn minimal_matrix_prefers_absent_cells_first() {
        let rep = canonicalize(&graph(2, &[(0, 1, 1), (1, 0, 0)])).unwrap();
        assert_eq!(rep.to_string(), "-01-");
        let swapped = canonicalize(&graph(2, &[(0, 1, 0), (1, 0, 1)])).unwrap();
        assert_eq!(rep, swapped);
    }

    #[test]
    fn text_form_round_trips() {
        let rep = canonicalize(&graph(3, &[(0, 1, 0), (1, 2, 1), (2, 0, 0)])).unwrap();
        let parsed: CanonicalRep = rep.to_string().parse().unwrap();
        assert_eq!(parsed, rep);
        assert_eq!(canonicalize(&rep.to_graph().unwrap()).unwrap(), rep);
        assert_eq!(rep.edge_count(), 3);
        assert_eq!(rep.digest().len(), 16);
        assert_eq!("-0-x".parse::<CanonicalRep>().unwrap_err().code(), "invalid-canonical");
        assert_eq!("-0-".parse::<CanonicalRep>().unwrap_err().code(), "invalid-canonical");
    }

    #[test]
    fn automorphisms_of_a_gray_cycle() {
        let cycle = graph(3, &[(0, 1, 0), (1, 2, 0), (2, 0, 0)]);
        let form = canonicalize_with_automorphisms(&cycle).unwrap();
        assert_eq!(form.automorphism_order, 3);
        let broken = graph(3, &[(0, 1, 1), (1, 2, 0), (2, 0, 0)]);
        assert_eq!(canonicalize_with_automorphisms(&broken).unwrap().automorphism_order, 1);
    }

    #[test]
    fn oversized_graphs_are_refused() {
        let big = RegulatoryGraph::new(hra_core::MAX_CANONICAL_NODES + 1).unwrap();
        assert!(matches!(canonicalize(&big), Err(HraError::Capacity(_))));
    }
}
