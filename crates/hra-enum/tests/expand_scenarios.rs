use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use hra_aut::CanonicalRep;
use hra_core::{Edge, HraError, Regulation};
use hra_enum::{
    expand, expand_base_graph, expand_from_container, generate_hras, write_expansion, ExpandOpts,
    ExpansionStrategy,
};
use hra_graph::{read_container, write_container, BlockProvenance, RegulatoryGraph};

fn graph(nodes: usize, edges: &[(usize, usize, u8)]) -> RegulatoryGraph {
    RegulatoryGraph::from_edges(
        nodes,
        edges
            .iter()
            .map(|&(from, to, label)| Edge::new(from, to, Regulation::from_label(label).unwrap())),
    )
    .unwrap()
}

fn gray_two_cycle() -> RegulatoryGraph {
    graph(2, &[(0, 1, 0), (1, 0, 0)])
}

fn two_node_bases() -> Vec<RegulatoryGraph> {
    vec![
        graph(2, &[(0, 1, 0)]),
        graph(2, &[(0, 1, 1)]),
        graph(2, &[(0, 1, 0), (1, 0, 0)]),
        graph(2, &[(0, 1, 0), (1, 0, 1)]),
        graph(2, &[(0, 1, 1), (1, 0, 1)]),
    ]
}

#[test]
fn base_at_target_is_returned_unchanged() {
    let base = gray_two_cycle();
    let result = expand(&base, 0, 2, &ExpandOpts::default()).unwrap();
    assert_eq!(result.graphs.len(), 1);
    assert_eq!(result.graphs[0].graph, base);
    assert_eq!(result.candidates, 0);

    let not_hra = graph(2, &[(0, 1, 0), (1, 0, 1)]);
    assert!(expand(&not_hra, 0, 2, &ExpandOpts::default())
        .unwrap()
        .graphs
        .is_empty());
}

#[test]
fn gray_two_cycle_reaches_twenty_one_three_node_hras() {
    let result = expand(&gray_two_cycle(), 7, 3, &ExpandOpts::default()).unwrap();
    assert_eq!(result.graphs.len(), 21);
    assert_eq!(result.candidates, 80);
    for hra in &result.graphs {
        assert_eq!(hra.graph.node_count(), 3);
        assert!(hra.graph.regulation(0, 1).is_some() && hra.graph.regulation(1, 0).is_some());
    }
    let distinct: BTreeSet<&CanonicalRep> = result.graphs.iter().map(|hra| &hra.form.rep).collect();
    assert_eq!(distinct.len(), 21);
}

#[test]
fn expanding_every_two_node_base_covers_the_three_node_census() {
    let mut reached = BTreeSet::new();
    for (source, base) in two_node_bases().iter().enumerate() {
        let result = expand_base_graph(base, source, 2, 3, &ExpandOpts::default()).unwrap();
        reached.extend(result.graphs.into_iter().map(|hra| hra.form.rep));
    }
    let reference: BTreeSet<CanonicalRep> = generate_hras(3)
        .unwrap()
        .hras
        .into_iter()
        .map(|hra| hra.form.rep)
        .collect();
    assert_eq!(reached, reference);
}

#[test]
fn two_step_expansion_stays_within_the_four_node_census() {
    let reference: BTreeSet<CanonicalRep> = generate_hras(4)
        .unwrap()
        .hras
        .into_iter()
        .map(|hra| hra.form.rep)
        .collect();
    let result = expand(&gray_two_cycle(), 0, 4, &ExpandOpts {
        strategy: ExpansionStrategy::Bounded { max_in: 1, max_out: 1 },
        ..ExpandOpts::default()
    })
    .unwrap();
    assert!(!result.graphs.is_empty());
    assert!(result.graphs.iter().all(|hra| reference.contains(&hra.form.rep)));
}

#[test]
fn bounded_strategy_limits_the_search() {
    let base = gray_two_cycle();
    let wide = expand(&base, 0, 3, &ExpandOpts {
        strategy: ExpansionStrategy::bounded(),
        ..ExpandOpts::default()
    })
    .unwrap();
    assert_eq!(wide.graphs.len(), 21);

    let narrow = expand(&base, 0, 3, &ExpandOpts {
        strategy: ExpansionStrategy::Bounded { max_in: 1, max_out: 0 },
        ..ExpandOpts::default()
    })
    .unwrap();
    assert_eq!(narrow.graphs.len(), 1);
}

#[test]
fn preconditions_and_bounds_are_typed_errors() {
    let base = gray_two_cycle();
    let err = expand(&base, 0, hra_core::MAX_NODES + 1, &ExpandOpts::default()).unwrap_err();
    assert!(matches!(err, HraError::Capacity(_)));
    assert_eq!(err.code(), "target-capacity");

    let err = expand(&base, 0, 1, &ExpandOpts::default()).unwrap_err();
    assert_eq!(err.code(), "base-exceeds-target");

    let disconnected = graph(3, &[(0, 1, 0), (1, 0, 0)]);
    let err = expand_base_graph(&disconnected, 0, 3, 4, &ExpandOpts::default()).unwrap_err();
    assert!(matches!(err, HraError::Input(_)));
    assert_eq!(err.code(), "base-not-connected");

    let err = expand_base_graph(&base, 0, 3, 4, &ExpandOpts::default()).unwrap_err();
    assert_eq!(err.code(), "start-size-mismatch");
}

#[test]
fn cancellation_and_timeouts_abort_the_search() {
    let flag = Arc::new(AtomicBool::new(true));
    let err = expand(&gray_two_cycle(), 3, 3, &ExpandOpts {
        cancel: Some(flag),
        ..ExpandOpts::default()
    })
    .unwrap_err();
    assert!(matches!(err, HraError::Cancelled(_)));
    assert_eq!(err.info().context.get("source").map(String::as_str), Some("3"));

    let err = expand(&gray_two_cycle(), 0, 3, &ExpandOpts {
        timeout: Some(Duration::ZERO),
        ..ExpandOpts::default()
    })
    .unwrap_err();
    assert_eq!(err.code(), "expansion-timeout");
}

#[test]
fn unrepresentable_deadlines_run_without_a_limit() {
    let result = expand(&gray_two_cycle(), 0, 3, &ExpandOpts {
        timeout: Some(Duration::from_secs(u64::MAX)),
        ..ExpandOpts::default()
    })
    .unwrap();
    assert_eq!(result.graphs.len(), 21);
}

#[test]
fn container_expansion_writes_a_traceable_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let container = dir.path().join("bases.dot");
    write_container(&container, |writer| {
        for (idx, base) in two_node_bases().iter().enumerate() {
            writer.write_block(&format!("base_{idx}"), base, &BlockProvenance::default())?;
        }
        Ok(())
    })
    .unwrap();

    let result = expand_from_container(&container, 2, 2, 2, &ExpandOpts::default()).unwrap();
    let out = dir.path().join("expanded.dot");
    assert_eq!(write_expansion(&result, &out).unwrap(), 1);

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("// Expanded from base graph 2 (Canonical:-00-)"));
    let blocks = read_container(&out).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].identifier, "HRA_from_2_graph_000");
    assert_eq!(blocks[0].provenance.source, Some(2));
    assert_eq!(blocks[0].graph, gray_two_cycle());

    let err = expand_from_container(&container, 9, 2, 3, &ExpandOpts::default()).unwrap_err();
    assert_eq!(err.code(), "index-out-of-range");
}
