use hra_aut::{are_isomorphic, canonicalize};
use hra_core::{Edge, Regulation};
use hra_graph::RegulatoryGraph;
use proptest::prelude::*;

fn graph_and_permutation() -> impl Strategy<Value = (RegulatoryGraph, Vec<usize>)> {
    (1usize..=6).prop_flat_map(|nodes| {
        let pairs: Vec<(usize, usize)> = (0..nodes)
            .flat_map(|from| (0..nodes).map(move |to| (from, to)))
            .filter(|(from, to)| from != to)
            .collect();
        let count = pairs.len();
        (
            Just(nodes),
            Just(pairs),
            proptest::collection::vec(0u8..3, count),
            Just((0..nodes).collect::<Vec<usize>>()).prop_shuffle(),
        )
            .prop_map(|(nodes, pairs, choices, perm)| {
                let edges = pairs
                    .into_iter()
                    .zip(choices)
                    .filter(|(_, choice)| *choice < 2)
                    .map(|((from, to), choice)| {
                        Edge::new(from, to, Regulation::from_label(choice).unwrap())
                    });
                (RegulatoryGraph::from_edges(nodes, edges).unwrap(), perm)
            })
    })
}

proptest! {
    #[test]
    fn canonical_form_ignores_relabelling((graph, perm) in graph_and_permutation()) {
        let relabelled = graph.relabel(&perm).unwrap();
        prop_assert_eq!(canonicalize(&graph).unwrap(), canonicalize(&relabelled).unwrap());
        prop_assert!(are_isomorphic(&graph, &relabelled).unwrap());
    }

    #[test]
    fn canonical_form_ignores_edge_order((graph, _perm) in graph_and_permutation()) {
        let reversed = RegulatoryGraph::from_edges(
            graph.node_count(),
            graph.edges().iter().rev().copied(),
        )
        .unwrap();
        prop_assert_eq!(canonicalize(&graph).unwrap(), canonicalize(&reversed).unwrap());
    }
}

#[test]
fn different_degree_sequences_give_different_forms() {
    let path = RegulatoryGraph::from_edges(
        3,
        [
            Edge::new(0, 1, Regulation::Gray),
            Edge::new(1, 2, Regulation::Gray),
        ],
    )
    .unwrap();
    let star = RegulatoryGraph::from_edges(
        3,
        [
            Edge::new(0, 1, Regulation::Gray),
            Edge::new(0, 2, Regulation::Gray),
        ],
    )
    .unwrap();
    assert_ne!(path.degree_sequence(), star.degree_sequence());
    assert_ne!(canonicalize(&path).unwrap(), canonicalize(&star).unwrap());
    assert!(!are_isomorphic(&path, &star).unwrap());
}

#[test]
fn labels_distinguish_otherwise_equal_topologies() {
    let gray = RegulatoryGraph::from_edges(
        2,
        [
            Edge::new(0, 1, Regulation::Gray),
            Edge::new(1, 0, Regulation::Gray),
        ],
    )
    .unwrap();
    let mixed = gray.with_labels(0b01).unwrap();
    assert_ne!(canonicalize(&gray).unwrap(), canonicalize(&mixed).unwrap());
}
