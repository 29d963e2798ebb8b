//! Structural predicates over [`RegulatoryGraph`]. All are pure and reentrant.

use crate::graph::RegulatoryGraph;

/// Returns whether the graph forms a single component when edges are undirected.
///
/// Graphs with zero or one node are trivially connected.
pub fn is_weakly_connected(graph: &RegulatoryGraph) -> bool {
    let nodes = graph.node_count();
    if nodes <= 1 {
        return true;
    }
    let mut parent: Vec<usize> = (0..nodes).collect();
    for edge in graph.edges() {
        union(&mut parent, edge.from, edge.to);
    }
    let root = find(&mut parent, 0);
    (1..nodes).all(|node| find(&mut parent, node) == root)
}

/// Returns whether every node has at least one incoming edge.
pub fn is_heritable_topology(graph: &RegulatoryGraph) -> bool {
    (0..graph.node_count()).all(|node| graph.in_degree(node) > 0)
}

/// Returns whether every node has at least one incoming gray edge.
pub fn is_heritable_regulatory(graph: &RegulatoryGraph) -> bool {
    (0..graph.node_count()).all(|node| graph.gray_in_degree(node) > 0)
}

/// Returns whether the graph is a heritable regulatory architecture.
pub fn is_hra(graph: &RegulatoryGraph) -> bool {
    is_weakly_connected(graph) && is_heritable_topology(graph) && is_heritable_regulatory(graph)
}

fn find(parent: &mut [usize], idx: usize) -> usize {
    if parent[idx] != idx {
        let root = find(parent, parent[idx]);
        parent[idx] = root;
    }
    parent[idx]
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[rb] = ra;
    }
}

#[cfg(test)]
mod tests {
    use hra_core::{Edge, Regulation};

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
    fn trivial_graphs_are_connected() {
        assert!(is_weakly_connected(&graph(0, &[])));
        assert!(is_weakly_connected(&graph(1, &[])));
        assert!(!is_weakly_connected(&graph(2, &[])));
    }

    #[test]
    fn direction_is_ignored_for_connectivity() {
        assert!(is_weakly_connected(&graph(3, &[(0, 1, 0), (2, 1, 0)])));
        assert!(!is_weakly_connected(&graph(4, &[(0, 1, 0), (2, 3, 0)])));
    }

    #[test]
    fn heritable_topology_needs_in_edges_everywhere() {
        assert!(is_heritable_topology(&graph(2, &[(0, 1, 1), (1, 0, 1)])));
        assert!(is_heritable_topology(&graph(
            3,
            &[(0, 1, 0), (1, 0, 0), (0, 2, 0), (2, 1, 0)]
        )));
        assert!(!is_heritable_topology(&graph(3, &[(0, 1, 0), (1, 2, 0)])));
    }

    #[test]
    fn heritable_regulatory_needs_gray_in_edges() {
        let all_gray = graph(2, &[(0, 1, 0), (1, 0, 0)]);
        let mixed = graph(2, &[(0, 1, 0), (1, 0, 1)]);
        assert!(is_heritable_regulatory(&all_gray));
        assert!(is_hra(&all_gray));
        assert!(!is_heritable_regulatory(&mixed));
        assert!(is_heritable_topology(&mixed));
        assert!(!is_hra(&mixed));
    }

    #[test]
    fn a_single_node_is_never_an_hra() {
        let single = graph(1, &[]);
        assert!(is_weakly_connected(&single));
        assert!(!is_heritable_topology(&single));
        assert!(!is_hra(&single));
    }
}
