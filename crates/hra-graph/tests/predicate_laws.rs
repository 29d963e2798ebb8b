use hra_core::{Edge, Regulation};
use hra_graph::{
    is_heritable_regulatory, is_heritable_topology, is_hra, is_weakly_connected, RegulatoryGraph,
};
use proptest::prelude::*;

fn arbitrary_graph() -> impl Strategy<Value = RegulatoryGraph> {
    (1usize..7).prop_flat_map(|nodes| {
        let pairs: Vec<(usize, usize)> = (0..nodes)
            .flat_map(|from| (0..nodes).map(move |to| (from, to)))
            .filter(|(from, to)| from != to)
            .collect();
        let count = pairs.len();
        (Just(nodes), Just(pairs), proptest::collection::vec(0u8..4, count)).prop_map(
            |(nodes, pairs, choices)| {
                let edges = pairs
                    .into_iter()
                    .zip(choices)
                    .filter(|(_, choice)| *choice < 2)
                    .map(|((from, to), choice)| {
                        Edge::new(from, to, Regulation::from_label(choice).unwrap())
                    });
                RegulatoryGraph::from_edges(nodes, edges).unwrap()
            },
        )
    })
}

proptest! {
    #[test]
    fn gray_in_edges_imply_heritable_topology(graph in arbitrary_graph()) {
        if is_heritable_regulatory(&graph) {
            prop_assert!(is_heritable_topology(&graph));
        }
        prop_assert_eq!(
            is_hra(&graph),
            is_weakly_connected(&graph)
                && is_heritable_topology(&graph)
                && is_heritable_regulatory(&graph)
        );
    }

    #[test]
    fn predicates_ignore_node_names(graph in arbitrary_graph(), rotate in 0usize..7) {
        let n = graph.node_count();
        let perm: Vec<usize> = (0..n).map(|node| (node + rotate) % n).collect();
        let renamed = graph.relabel(&perm).unwrap();
        prop_assert_eq!(is_weakly_connected(&graph), is_weakly_connected(&renamed));
        prop_assert_eq!(is_heritable_topology(&graph), is_heritable_topology(&renamed));
        prop_assert_eq!(is_heritable_regulatory(&graph), is_heritable_regulatory(&renamed));
    }
}
