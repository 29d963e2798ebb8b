use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hra_aut::{canonicalize, canonicalize_with_automorphisms, CanonicalForm, CanonicalRep};
use hra_core::errors::{ErrorInfo, HraError};
use hra_core::limits::{ensure_canonical_capacity, MAX_NODES};
use hra_core::{Edge, Regulation};
use hra_graph::{
    is_heritable_topology, is_hra, is_weakly_connected, read_block_at, write_container,
    BlockProvenance, RegulatoryGraph,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Upper bound on the edges a bounded step may attach to the new node.
pub const BOUNDED_MAX_NEW_EDGES: usize = 10;

/// How the edges touching each new node are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum ExpansionStrategy {
    /// Every existing node independently links in, out, both ways or not at all,
    /// each present edge taking either label.
    #[default]
    Exhaustive,
    /// Between 1 and `max_in` incoming and at most `max_out` outgoing edges,
    /// chosen as node combinations and then labelled in every way.
    Bounded {
        /// Maximum incoming edges of the new node.
        max_in: usize,
        /// Maximum outgoing edges of the new node.
        max_out: usize,
    },
}

impl ExpansionStrategy {
    /// Bounded strategy with the customary limits of three in, two out.
    pub fn bounded() -> Self {
        ExpansionStrategy::Bounded {
            max_in: 3,
            max_out: 2,
        }
    }
}

/// Per-invocation options for [`expand`].
#[derive(Debug, Clone, Default)]
pub struct ExpandOpts {
    /// Edge selection strategy for new nodes.
    pub strategy: ExpansionStrategy,
    /// Abort the search once this much time has elapsed. Durations past the
    /// clock's range impose no limit.
    pub timeout: Option<Duration>,
    /// Abort the search once this flag is raised.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// One HRA reached from a base graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedHra {
    /// The extended graph; base nodes keep their indices.
    pub graph: RegulatoryGraph,
    /// Canonical form and automorphism order of `graph`.
    pub form: CanonicalForm,
}

/// Everything produced by expanding one base graph.
#[derive(Debug, Clone)]
pub struct ExpansionResult {
    /// Identifier of the base graph.
    pub source: usize,
    /// Canonical form of the base graph.
    pub base_rep: CanonicalRep,
    /// Node count of every result.
    pub target_size: usize,
    /// Canonical-distinct HRAs in discovery order.
    pub graphs: Vec<ExpandedHra>,
    /// Candidate extensions built during the search.
    pub candidates: u64,
    /// Wall-clock duration of the search.
    pub elapsed: Duration,
}

/// Grows `base` one node at a time until it has `target_size` nodes and
/// collects every canonical-distinct HRA reached.
///
/// Candidates below the target are pruned unless weakly connected with
/// heritable topology; terminal candidates must satisfy all three
/// predicates. A base already at the target is returned unchanged when it is
/// an HRA. Results are deduplicated within this invocation only.
pub fn expand(
    base: &RegulatoryGraph,
    source: usize,
    target_size: usize,
    opts: &ExpandOpts,
) -> Result<ExpansionResult, HraError> {
    if target_size > MAX_NODES {
        return Err(HraError::Capacity(
            ErrorInfo::new("target-capacity", "target size exceeds the node maximum")
                .with_context("target", target_size)
                .with_context("max", MAX_NODES),
        ));
    }
    ensure_canonical_capacity(target_size)?;
    if base.node_count() > target_size {
        return Err(HraError::Input(
            ErrorInfo::new("base-exceeds-target", "base graph is larger than the target size")
                .with_context("base_nodes", base.node_count())
                .with_context("target", target_size),
        ));
    }

    let started = Instant::now();
    let mut search = Search {
        target_size,
        strategy: opts.strategy,
        deadline: opts.timeout.and_then(|timeout| started.checked_add(timeout)),
        cancel: opts.cancel.as_deref(),
        seen: HashSet::new(),
        graphs: Vec::new(),
        candidates: 0,
    };
    search
        .grow(base.clone())
        .map_err(|err| err.with_context("source", source))?;

    let result = ExpansionResult {
        source,
        base_rep: canonicalize(base)?,
        target_size,
        graphs: search.graphs,
        candidates: search.candidates,
        elapsed: started.elapsed(),
    };
    debug!(
        source,
        target = target_size,
        candidates = result.candidates,
        hras = result.graphs.len(),
        "expansion finished"
    );
    Ok(result)
}

/// Checks the caller-side preconditions of a base graph before [`expand`].
///
/// The base must have exactly `start_size` nodes and be weakly connected.
pub fn expand_base_graph(
    base: &RegulatoryGraph,
    source: usize,
    start_size: usize,
    target_size: usize,
    opts: &ExpandOpts,
) -> Result<ExpansionResult, HraError> {
    if base.node_count() != start_size {
        return Err(HraError::Input(
            ErrorInfo::new("start-size-mismatch", "base graph does not have the start size")
                .with_context("source", source)
                .with_context("nodes", base.node_count())
                .with_context("start", start_size),
        ));
    }
    if !is_weakly_connected(base) {
        return Err(HraError::Input(
            ErrorInfo::new("base-not-connected", "base graph is not weakly connected")
                .with_context("source", source)
                .with_hint("base graphs must come from a connected enumeration"),
        ));
    }
    expand(base, source, target_size, opts)
}

/// Loads block `index` of `container` and expands it.
pub fn expand_from_container(
    container: &Path,
    index: usize,
    start_size: usize,
    target_size: usize,
    opts: &ExpandOpts,
) -> Result<ExpansionResult, HraError> {
    let block = read_block_at(container, index)?;
    let result = expand_base_graph(&block.graph, index, start_size, target_size, opts)?;
    info!(
        container = %container.display(),
        index,
        hras = result.graphs.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "base graph expanded"
    );
    Ok(result)
}

/// Writes `result` as `HRA_from_<source>_graph_<ordinal>` blocks behind a
/// header naming the base graph.
pub fn write_expansion(result: &ExpansionResult, path: &Path) -> Result<usize, HraError> {
    write_container(path, |writer| {
        writer.write_comment(&format!(
            "Expanded from base graph {} (Canonical:{})",
            result.source, result.base_rep
        ))?;
        for (ordinal, hra) in result.graphs.iter().enumerate() {
            let provenance = BlockProvenance {
                source: Some(result.source),
                nodes: Some(result.target_size),
                canonical: Some(hra.form.rep.to_string()),
            };
            let identifier = format!("HRA_from_{}_graph_{ordinal:03}", result.source);
            writer.write_block(&identifier, &hra.graph, &provenance)?;
        }
        Ok(())
    })
}

struct Search<'a> {
    target_size: usize,
    strategy: ExpansionStrategy,
    deadline: Option<Instant>,
    cancel: Option<&'a AtomicBool>,
    seen: HashSet<CanonicalRep>,
    graphs: Vec<ExpandedHra>,
    candidates: u64,
}

impl Search<'_> {
    fn grow(&mut self, graph: RegulatoryGraph) -> Result<(), HraError> {
        self.poll()?;
        if graph.node_count() == self.target_size {
            return self.accept(graph);
        }
        let new_node = graph.node_count();
        for links in link_choices(new_node, self.strategy) {
            self.poll()?;
            let mut candidate = graph.with_added_node()?;
            for edge in links {
                candidate.add_edge(edge.from, edge.to, edge.regulation)?;
            }
            self.candidates += 1;
            if candidate.node_count() < self.target_size
                && !(is_weakly_connected(&candidate) && is_heritable_topology(&candidate))
            {
                continue;
            }
            self.grow(candidate)?;
        }
        Ok(())
    }

    fn accept(&mut self, graph: RegulatoryGraph) -> Result<(), HraError> {
        if !(is_weakly_connected(&graph) && is_heritable_topology(&graph) && is_hra(&graph)) {
            return Ok(());
        }
        let form = canonicalize_with_automorphisms(&graph)?;
        if self.seen.insert(form.rep.clone()) {
            self.graphs.push(ExpandedHra { graph, form });
        }
        Ok(())
    }

    fn poll(&self) -> Result<(), HraError> {
        if self
            .cancel
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Err(HraError::Cancelled(ErrorInfo::new(
                "expansion-cancelled",
                "expansion was cancelled",
            )));
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(HraError::Cancelled(
                ErrorInfo::new("expansion-timeout", "expansion exceeded its time limit")
                    .with_context("candidates", self.candidates),
            ));
        }
        Ok(())
    }
}

/// Link choice of one existing node towards the new node.
#[derive(Debug, Clone, Copy)]
enum Link {
    None,
    Into(Regulation),
    OutOf(Regulation),
    Both(Regulation, Regulation),
}

static LINKS: [Link; 9] = [
    Link::None,
    Link::Into(Regulation::Gray),
    Link::Into(Regulation::Black),
    Link::OutOf(Regulation::Gray),
    Link::OutOf(Regulation::Black),
    Link::Both(Regulation::Gray, Regulation::Gray),
    Link::Both(Regulation::Gray, Regulation::Black),
    Link::Both(Regulation::Black, Regulation::Gray),
    Link::Both(Regulation::Black, Regulation::Black),
];

/// Edge sets that may attach node `new_node` to nodes `0..new_node`.
///
/// The empty set is never produced.
fn link_choices(
    new_node: usize,
    strategy: ExpansionStrategy,
) -> Box<dyn Iterator<Item = Vec<Edge>>> {
    if new_node == 0 {
        return Box::new(std::iter::empty());
    }
    match strategy {
        ExpansionStrategy::Exhaustive => Box::new(
            (0..new_node)
                .map(|_| LINKS.iter().copied())
                .multi_cartesian_product()
                .filter(|links| links.iter().any(|link| !matches!(link, Link::None)))
                .map(move |links| exhaustive_edges(new_node, &links)),
        ),
        ExpansionStrategy::Bounded { max_in, max_out } => {
            Box::new(bounded_edges(new_node, max_in, max_out).into_iter())
        }
    }
}

fn exhaustive_edges(new_node: usize, links: &[Link]) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(2 * links.len());
    for (node, link) in links.iter().enumerate() {
        match *link {
            Link::None => {}
            Link::Into(label) => edges.push(Edge::new(node, new_node, label)),
            Link::OutOf(label) => edges.push(Edge::new(new_node, node, label)),
            Link::Both(into, out_of) => {
                edges.push(Edge::new(node, new_node, into));
                edges.push(Edge::new(new_node, node, out_of));
            }
        }
    }
    edges
}

fn bounded_edges(new_node: usize, max_in: usize, max_out: usize) -> Vec<Vec<Edge>> {
    let mut choices = Vec::new();
    for in_count in 1..=max_in.min(new_node) {
        for out_count in 0..=max_out.min(new_node) {
            if in_count + out_count > BOUNDED_MAX_NEW_EDGES {
                continue;
            }
            for sources in (0..new_node).combinations(in_count) {
                for sinks in (0..new_node).combinations(out_count) {
                    let pairs: Vec<(usize, usize)> = sources
                        .iter()
                        .map(|&node| (node, new_node))
                        .chain(sinks.iter().map(|&node| (new_node, node)))
                        .collect();
                    for pattern in 0..(1u64 << pairs.len()) {
                        let edges = pairs
                            .iter()
                            .enumerate()
                            .map(|(bit, &(from, to))| {
                                Edge::new(from, to, Regulation::from_bit(pattern, bit))
                            })
                            .collect();
                        choices.push(edges);
                    }
                }
            }
        }
    }
    choices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustive_choices_cover_nine_links_per_node() {
        assert_eq!(link_choices(1, ExpansionStrategy::Exhaustive).count(), 8);
        assert_eq!(link_choices(2, ExpansionStrategy::Exhaustive).count(), 80);
        assert_eq!(link_choices(0, ExpansionStrategy::Exhaustive).count(), 0);
        assert!(link_choices(3, ExpansionStrategy::Exhaustive).all(|edges| !edges.is_empty()));
    }

    #[test]
    fn bounded_choices_respect_degree_limits() {
        let choices = bounded_edges(3, 1, 0);
        // three single in-edges, two labels each
        assert_eq!(choices.len(), 6);
        for edges in bounded_edges(4, 3, 2) {
            let incoming = edges.iter().filter(|edge| edge.to == 4).count();
            let outgoing = edges.iter().filter(|edge| edge.from == 4).count();
            assert!((1..=3).contains(&incoming));
            assert!(outgoing <= 2);
        }
    }

    #[test]
    fn poll_reports_cancellation() {
        let flag = AtomicBool::new(true);
        let search = Search {
            target_size: 3,
            strategy: ExpansionStrategy::Exhaustive,
            deadline: None,
            cancel: Some(&flag),
            seen: HashSet::new(),
            graphs: Vec::new(),
            candidates: 0,
        };
        assert_eq!(search.poll().unwrap_err().code(), "expansion-cancelled");
    }
}
