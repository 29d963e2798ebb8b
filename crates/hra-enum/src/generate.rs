use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::{Duration, Instant};

use hra_aut::{canonicalize, canonicalize_with_automorphisms, CanonicalForm, CanonicalRep};
use hra_core::errors::{ErrorInfo, HraError};
use hra_core::limits::ensure_canonical_capacity;
use hra_core::{Edge, Regulation};
use hra_graph::{
    is_heritable_topology, is_hra, is_weakly_connected, write_container, BlockProvenance,
    RegulatoryGraph,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One canonical-distinct HRA produced by exhaustive generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedHra {
    /// Labelled graph as first encountered during the sweep.
    pub graph: RegulatoryGraph,
    /// Canonical form and automorphism order of `graph`.
    pub form: CanonicalForm,
}

/// Outcome of exhaustive generation for one node count.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Node count that was enumerated.
    pub node_count: usize,
    /// Canonical-distinct weakly connected heritable topologies.
    pub topologies: usize,
    /// Canonical-distinct labellings of those topologies, HRA or not.
    pub regulatory_architectures: usize,
    /// Canonical-distinct HRAs in discovery order.
    pub hras: Vec<GeneratedHra>,
    /// Wall-clock duration of the sweep.
    pub elapsed: Duration,
}

/// One row of a census over several node counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusRow {
    /// Node count.
    pub node_count: usize,
    /// Canonical topologies.
    pub topologies: usize,
    /// Canonical regulatory architectures over all labellings.
    pub regulatory_architectures: usize,
    /// Canonical HRAs.
    pub hras: usize,
    /// Elapsed milliseconds.
    pub elapsed_ms: u128,
}

impl From<&GenerationReport> for CensusRow {
    fn from(report: &GenerationReport) -> Self {
        Self {
            node_count: report.node_count,
            topologies: report.topologies,
            regulatory_architectures: report.regulatory_architectures,
            hras: report.hras.len(),
            elapsed_ms: report.elapsed.as_millis(),
        }
    }
}

/// Enumerates every canonical-distinct HRA on `node_count` nodes.
///
/// Edge subsets are drawn from the `n(n-1)` ordered pairs in increasing
/// size, starting at `n` because every node needs an incoming edge. Surviving
/// topologies are deduplicated by canonical form, then every gray/black
/// labelling of each topology is deduplicated against one run-wide set.
pub fn generate_hras(node_count: usize) -> Result<GenerationReport, HraError> {
    if node_count == 0 {
        return Err(HraError::Input(
            ErrorInfo::new("empty-graph", "generation needs at least one node")
                .with_context("nodes", node_count),
        ));
    }
    ensure_canonical_capacity(node_count)?;
    let started = Instant::now();

    let universe: Vec<(usize, usize)> = (0..node_count)
        .flat_map(|from| (0..node_count).map(move |to| (from, to)))
        .filter(|(from, to)| from != to)
        .collect();

    let mut seen_topologies: HashSet<CanonicalRep> = HashSet::new();
    let mut topologies: Vec<RegulatoryGraph> = Vec::new();
    for size in node_count..=universe.len() {
        let before = topologies.len();
        let mut search = SubsetSearch {
            universe: &universe,
            size,
            chosen: Vec::with_capacity(size),
            in_degree: vec![0; node_count],
            uncovered: node_count,
        };
        search.walk(0, &mut |chosen: &[usize]| {
            let edges = chosen.iter().map(|&idx| {
                let (from, to) = universe[idx];
                Edge::new(from, to, Regulation::Gray)
            });
            let graph = RegulatoryGraph::from_edges(node_count, edges)?;
            if !is_weakly_connected(&graph) || !is_heritable_topology(&graph) {
                return Ok(());
            }
            if seen_topologies.insert(canonicalize(&graph)?) {
                topologies.push(graph);
            }
            Ok(())
        })?;
        debug!(
            nodes = node_count,
            edges = size,
            new_topologies = topologies.len() - before,
            "subset size swept"
        );
    }

    let mut seen_architectures: HashSet<CanonicalRep> = HashSet::new();
    let mut hras = Vec::new();
    for topology in &topologies {
        let labellings = 1u64 << topology.edge_count();
        for pattern in 0..labellings {
            let graph = topology.with_labels(pattern)?;
            let form = canonicalize_with_automorphisms(&graph)?;
            if !seen_architectures.insert(form.rep.clone()) {
                continue;
            }
            if is_hra(&graph) {
                hras.push(GeneratedHra { graph, form });
            }
        }
    }

    let report = GenerationReport {
        node_count,
        topologies: topologies.len(),
        regulatory_architectures: seen_architectures.len(),
        hras,
        elapsed: started.elapsed(),
    };
    info!(
        nodes = node_count,
        topologies = report.topologies,
        architectures = report.regulatory_architectures,
        hras = report.hras.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "generation complete"
    );
    Ok(report)
}

/// Runs [`generate_hras`] for every node count in `sizes`.
pub fn census(sizes: RangeInclusive<usize>) -> Result<Vec<CensusRow>, HraError> {
    sizes
        .map(|nodes| generate_hras(nodes).map(|report| CensusRow::from(&report)))
        .collect()
}

/// Writes the HRAs of `report` as `HRA_n<n>_<ordinal>` blocks.
pub fn write_generation(report: &GenerationReport, path: &Path) -> Result<usize, HraError> {
    write_container(path, |writer| {
        writer.write_comment(&format!(
            "HRAs with {} nodes: {} unique",
            report.node_count,
            report.hras.len()
        ))?;
        for (ordinal, hra) in report.hras.iter().enumerate() {
            let provenance = BlockProvenance {
                source: None,
                nodes: Some(report.node_count),
                canonical: Some(hra.form.rep.to_string()),
            };
            let identifier = format!("HRA_n{}_{ordinal:03}", report.node_count);
            writer.write_block(&identifier, &hra.graph, &provenance)?;
        }
        Ok(())
    })
}

/// Depth-first enumeration of fixed-size edge subsets.
///
/// A branch is abandoned once the picks still available cannot give every
/// node without an incoming edge one.
struct SubsetSearch<'a> {
    universe: &'a [(usize, usize)],
    size: usize,
    chosen: Vec<usize>,
    in_degree: Vec<usize>,
    uncovered: usize,
}

impl SubsetSearch<'_> {
    fn walk<F>(&mut self, start: usize, visit: &mut F) -> Result<(), HraError>
    where
        F: FnMut(&[usize]) -> Result<(), HraError>,
    {
        let remaining = self.size - self.chosen.len();
        if remaining == 0 {
            return visit(&self.chosen);
        }
        if self.uncovered > remaining || self.universe.len() - start < remaining {
            return Ok(());
        }
        for idx in start..self.universe.len() {
            let to = self.universe[idx].1;
            self.chosen.push(idx);
            self.in_degree[to] += 1;
            if self.in_degree[to] == 1 {
                self.uncovered -= 1;
            }
            let outcome = self.walk(idx + 1, visit);
            if self.in_degree[to] == 1 {
                self.uncovered += 1;
            }
            self.in_degree[to] -= 1;
            self.chosen.pop();
            outcome?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_subsets(universe: &[(usize, usize)], nodes: usize, size: usize) -> usize {
        let mut search = SubsetSearch {
            universe,
            size,
            chosen: Vec::new(),
            in_degree: vec![0; nodes],
            uncovered: nodes,
        };
        let mut count = 0;
        search
            .walk(0, &mut |_: &[usize]| {
                count += 1;
                Ok(())
            })
            .unwrap();
        count
    }

    #[test]
    fn subset_search_skips_prefixes_that_cannot_cover_every_node() {
        let universe = [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)];
        // 3-subsets hitting all three targets: one of two edges per target.
        assert_eq!(count_subsets(&universe, 3, 3), 8);
        assert_eq!(count_subsets(&universe, 3, 6), 1);
        assert_eq!(count_subsets(&universe, 3, 2), 0);
    }

    #[test]
    fn zero_nodes_is_invalid_input() {
        let err = generate_hras(0).unwrap_err();
        assert!(matches!(err, HraError::Input(_)));
    }

    #[test]
    fn single_node_yields_nothing() {
        let report = generate_hras(1).unwrap();
        assert_eq!(report.topologies, 0);
        assert!(report.hras.is_empty());
    }
}
