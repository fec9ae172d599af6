use approx::assert_abs_diff_eq;
use pert_graph::{
    all_pairs_distances, connected_components, distance_ratios, GraphError, PertGraph, Record,
    DEFAULT_MIN_COMPONENT_SIZE,
};

fn graph_of(edges: &[(&str, &str, f64)]) -> PertGraph {
    let mut g = PertGraph::new();
    for &(a, b, w) in edges {
        g.add_node(a, Record::new());
        g.add_node(b, Record::new());
        g.add_edge(a, b, w).unwrap();
    }
    g
}

#[test]
fn shortest_paths_follow_edge_weights() {
    // A -2- B -4- C -2- D, plus a shortcut A -7- D
    let g = graph_of(&[("A", "B", 2.0), ("B", "C", 4.0), ("C", "D", 2.0), ("A", "D", 7.0)]);
    let dist = all_pairs_distances(&g);

    assert_abs_diff_eq!(dist.get("A", "A").unwrap(), 0.0);
    assert_abs_diff_eq!(dist.get("A", "B").unwrap(), 2.0);
    assert_abs_diff_eq!(dist.get("A", "C").unwrap(), 6.0);
    assert_abs_diff_eq!(dist.get("A", "D").unwrap(), 7.0);
    assert_abs_diff_eq!(dist.get("D", "B").unwrap(), 6.0);
}

#[test]
fn unreachable_pairs_are_undefined() {
    let mut g = graph_of(&[("A", "B", 1.0)]);
    g.add_node("Z", Record::new());

    let dist = all_pairs_distances(&g);
    assert!(dist.get("A", "Z").is_none());
    assert!(dist.get("Z", "A").is_none());
    assert_abs_diff_eq!(dist.get("Z", "Z").unwrap(), 0.0);
}

#[test]
fn components_respect_minimum_size() {
    // a 4-clique and a detached pair
    let g = graph_of(&[
        ("A", "B", 1.0),
        ("A", "C", 1.0),
        ("A", "D", 1.0),
        ("B", "C", 1.0),
        ("B", "D", 1.0),
        ("C", "D", 1.0),
        ("E", "F", 1.0),
    ]);

    let comps = connected_components(&g, DEFAULT_MIN_COMPONENT_SIZE);
    assert_eq!(comps.len(), 1);
    assert_eq!(comps[0].len(), 4);
    assert!(comps[0].iter().all(|l| ["A", "B", "C", "D"].contains(&l.as_ref())));

    let comps = connected_components(&g, 2);
    assert_eq!(comps.len(), 2);
    assert_eq!(comps[1], vec!["E".into(), "F".into()]);
}

#[test]
fn distance_ratio_of_tight_pair() -> anyhow::Result<()> {
    // path A -2- B -4- C -2- D; {A,B} is the cohesive pair
    let full = graph_of(&[("A", "B", 2.0), ("B", "C", 4.0), ("C", "D", 2.0)]);
    let sub = graph_of(&[("A", "B", 2.0)]);

    let out = distance_ratios(&full, &sub, 2)?;
    assert_eq!(out.components, vec![vec!["A".into(), "B".into()]]);

    // internal: (A,B) and (B,A), both 2 -> mean 2
    // external: A-C 6, A-D 8, B-C 4, B-D 6 -> mean 6
    assert_eq!(out.ratios.len(), 1);
    assert_abs_diff_eq!(out.ratios[0], 2.0 / 6.0);
    assert_abs_diff_eq!(out.mean_ratio, 2.0 / 6.0);
    Ok(())
}

#[test]
fn ratios_against_full_metric_after_pruning() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    // distance-style weights; {A,B,D} form the tight component
    let full = graph_of(&[
        ("A", "B", 5.0),
        ("A", "C", 60.0),
        ("A", "D", 8.0),
        ("B", "C", 90.0),
        ("B", "D", 12.0),
        ("C", "D", 95.0),
    ]);
    let sub = graph_of(&[("A", "B", 5.0), ("A", "D", 8.0), ("B", "D", 12.0)]);

    let out = distance_ratios(&full, &sub, 3)?;
    assert_eq!(out.components.len(), 1);

    // internal ordered pairs: 5, 8, 5, 12, 8, 12 -> mean 50/6
    // external: A-C 60, B-C 65 (via A), D-C 68 (via A) -> mean 193/3
    let expected = (50.0 / 6.0) / (193.0 / 3.0);
    assert_abs_diff_eq!(out.mean_ratio, expected, epsilon = 1e-12);
    Ok(())
}

#[test]
fn no_component_reaches_minimum_size() {
    let full = graph_of(&[("A", "B", 1.0), ("C", "D", 1.0)]);
    let sub = graph_of(&[("A", "B", 1.0)]);

    let result = distance_ratios(&full, &sub, 4);
    assert!(matches!(result, Err(GraphError::EmptyMean(_))));
}

#[test]
fn component_covering_whole_graph_has_no_external_nodes() {
    let full = graph_of(&[("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 1.0)]);
    let sub = full.prune(10.0); // identical component

    let result = distance_ratios(&full, &sub, 3);
    assert!(matches!(result, Err(GraphError::EmptyMean(_))));
}

#[test]
fn zero_external_mean_is_rejected() {
    // zero-weight edges collapse every member-to-external distance to 0
    let full = graph_of(&[("A", "B", 1.0), ("A", "C", 0.0), ("B", "C", 0.0)]);
    let sub = graph_of(&[("A", "B", 1.0)]);

    let result = distance_ratios(&full, &sub, 2);
    assert!(matches!(
        result,
        Err(GraphError::EmptyMean("external mean distance is zero"))
    ));
}

#[test]
fn subgraph_component_unreachable_within_full_graph() {
    // {A,B} is an edge in the subgraph, but the full graph never
    // connects A to B, so no internal distance is defined
    let full = graph_of(&[("A", "C", 1.0), ("B", "D", 1.0)]);
    let sub = graph_of(&[("A", "B", 1.0)]);

    let result = distance_ratios(&full, &sub, 2);
    assert!(matches!(
        result,
        Err(GraphError::EmptyMean("no internal pairwise distances"))
    ));
}

#[test]
fn unreachable_external_nodes_are_an_empty_mean() {
    // the component can't reach the rest of the graph at all
    let full = graph_of(&[("A", "B", 1.0), ("C", "D", 1.0)]);
    let sub = graph_of(&[("A", "B", 1.0)]);

    let result = distance_ratios(&full, &sub, 2);
    assert!(matches!(
        result,
        Err(GraphError::EmptyMean("no member-to-external distances"))
    ));
}
