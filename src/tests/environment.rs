//! Tests for bounded environment extraction

use super::helpers::*;
use crate::{
    environment::EnvironmentExtractor,
    error::PathwayError,
    merge::{create_node, Node},
    properties::{EdgeKind, PathwayEdge, Pid, Point, ShapeKind, VertexRep},
};
use std::collections::BTreeSet;
use test_log::test;

#[test]
fn test_radius_one_covers_small_pathway() {
    let g1 = simple_pathway("G1", &["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let store = store_with(vec![]);
    let focus = Node::new(g1.vrep("B"), g1.graph.pid()).unwrap();

    let derived = EnvironmentExtractor::new(&store)
        .extract(&g1.graph, &focus, 1)
        .unwrap();

    assert_eq!(vertex_set(&derived), vertex_set(&g1.graph));
    assert_eq!(edge_set(&derived), edge_set(&g1.graph));
}

#[test]
fn test_radius_one_excludes_second_neighbors() {
    let g2 = simple_pathway(
        "G2",
        &["A", "B", "C", "D"],
        &[("A", "B"), ("B", "C"), ("C", "D")],
    );
    let store = store_with(vec![]);
    let focus = Node::new(g2.vrep("B"), g2.graph.pid()).unwrap();
    let extractor = EnvironmentExtractor::new(&store);

    let one = extractor.extract(&g2.graph, &focus, 1).unwrap();
    assert!(!one.contains_vertex(&g2.vid("D")));
    assert!(!one.contains_edge(&g2.eids[2]));
    assert_eq!(one.vertex_count(), 3);
    assert_eq!(one.edge_count(), 2);

    let two = extractor.extract(&g2.graph, &focus, 2).unwrap();
    assert!(two.contains_vertex(&g2.vid("D")));
    assert!(two.contains_edge(&g2.eids[2]));
}

#[test]
fn test_alternative_vrep_is_used_when_focus_is_absent() {
    let elsewhere = simple_pathway("Elsewhere", &["F"], &[]);
    let g3 = build_pathway(
        "G3",
        &[("X", &["geneX"]), ("Y", &["geneY"]), ("Z", &["geneZ"])],
        &[("X", "Y"), ("Y", "Z")],
    );
    let store = store_with(vec![elsewhere.graph.clone()]);
    let focus = create_node(
        elsewhere.vrep("F").clone(),
        vec![],
        Some(vec![g3.vrep("X").clone()]),
        BTreeSet::from([elsewhere.graph.pid()]),
    )
    .unwrap();

    let derived = EnvironmentExtractor::new(&store)
        .extract(&g3.graph, &focus, 1)
        .unwrap();

    assert!(derived.contains_vertex(&g3.vid("X")));
    assert!(derived.contains_vertex(&g3.vid("Y")));
    assert!(derived.contains_edge(&g3.eids[0]));
    assert!(!derived.contains_vertex(&g3.vid("Z")));
    // The original focus is seeded alongside the working vertex.
    assert!(derived.contains_vertex(&elsewhere.vid("F")));
    assert_eq!(derived.degree(&elsewhere.vid("F")), 0);
}

#[test]
fn test_synthesized_focus_vrep_is_not_seeded() {
    let g3 = build_pathway(
        "G3",
        &[("X", &["geneX"]), ("Y", &["geneY"])],
        &[("X", "Y")],
    );
    let store = store_with(vec![g3.graph.clone()]);
    let synthesized = VertexRep::new(Pid::generate(), "X", ShapeKind::Rectangle, Point::default())
        .with_entities(vec![gene("geneX")]);
    let focus = create_node(
        synthesized.clone(),
        vec![],
        Some(vec![g3.vrep("X").clone()]),
        BTreeSet::from([g3.graph.pid()]),
    )
    .unwrap();

    let derived = EnvironmentExtractor::new(&store)
        .extract(&g3.graph, &focus, 1)
        .unwrap();

    assert!(!derived.contains_vertex(&synthesized.vid));
    assert_eq!(vertex_set(&derived), vertex_set(&g3.graph));
}

#[test]
fn test_focus_entity_representations_are_searched_last() {
    let p1 = simple_pathway("P1", &["geneA", "geneB"], &[("geneA", "geneB")]);
    let p2 = simple_pathway(
        "P2",
        &["geneC", "geneA", "geneD"],
        &[("geneC", "geneA"), ("geneA", "geneD")],
    );
    let focus = Node::new(p1.vrep("geneA"), p1.graph.pid()).unwrap();
    let a2 = p2.vid("geneA");
    let p2_graph = p2.graph.clone();
    let store = store_with(vec![p1.graph, p2.graph]);

    let extractor = EnvironmentExtractor::new(&store);
    assert_eq!(extractor.working_vrep(&p2_graph, &focus).unwrap().vid, a2);
    let derived = extractor.extract(&p2_graph, &focus, 1).unwrap();
    assert_eq!(derived.vertex_count(), 4);
    assert_eq!(derived.edge_count(), 2);
}

#[test]
fn test_absent_focus_is_not_found() {
    let p1 = simple_pathway("P1", &["geneA"], &[]);
    let p2 = simple_pathway("P2", &["geneB", "geneC"], &[("geneB", "geneC")]);
    let focus = Node::new(p1.vrep("geneA"), p1.graph.pid()).unwrap();
    let p2_graph = p2.graph.clone();
    let store = store_with(vec![p1.graph, p2.graph]);

    let err = EnvironmentExtractor::new(&store)
        .extract(&p2_graph, &focus, 3)
        .unwrap_err();
    assert!(matches!(err, PathwayError::NotFound(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_zero_radius_is_an_invalid_command() {
    let g = simple_pathway("G", &["A"], &[]);
    let store = store_with(vec![]);
    let focus = Node::new(g.vrep("A"), g.graph.pid()).unwrap();
    let err = EnvironmentExtractor::new(&store)
        .extract(&g.graph, &focus, 0)
        .unwrap_err();
    assert!(matches!(err, PathwayError::Command(_)));
}

#[test]
fn test_radius_monotonicity_on_a_chain() {
    let chain = chain_pathway("Chain", "n", 12);
    let store = store_with(vec![]);
    let focus = Node::new(chain.vrep("n5"), chain.graph.pid()).unwrap();
    let extractor = EnvironmentExtractor::new(&store);

    let mut previous: Option<(BTreeSet<_>, BTreeSet<_>)> = None;
    for radius in 1..=8 {
        let derived = extractor.extract(&chain.graph, &focus, radius).unwrap();
        assert!(derived.contains_vertex(&chain.vid("n5")));
        let vertices: BTreeSet<_> = vertex_set(&derived).into_iter().collect();
        let edges: BTreeSet<_> = edge_set(&derived).into_iter().collect();
        // Every edge within `radius - 1` hops of n5 on both sides.
        let expected_edges = (radius as usize).min(5) + (radius as usize).min(6);
        assert_eq!(edges.len(), expected_edges, "radius {radius}");
        if let Some((prev_vertices, prev_edges)) = previous.as_ref() {
            assert!(prev_vertices.is_subset(&vertices));
            assert!(prev_edges.is_subset(&edges));
        }
        previous = Some((vertices, edges));
    }
}

#[test]
fn test_self_loops_and_parallel_edges_keep_identity_and_orientation() {
    let mut g = simple_pathway("Multi", &["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let pid = g.graph.pid();
    let (a, b) = (g.vid("A"), g.vid("B"));
    let parallel = PathwayEdge::new(pid, EdgeKind::Reaction);
    let reverse = PathwayEdge::new(pid, EdgeKind::Relation);
    let self_loop = PathwayEdge::new(pid, EdgeKind::Relation);
    let extra = [parallel.eid, reverse.eid, self_loop.eid];
    g.graph.add_edge(a, b, parallel).unwrap();
    g.graph.add_edge(b, a, reverse).unwrap();
    g.graph.add_edge(a, a, self_loop).unwrap();
    let store = store_with(vec![]);
    let focus = Node::new(g.vrep("A"), pid).unwrap();

    let derived = EnvironmentExtractor::new(&store)
        .extract(&g.graph, &focus, 2)
        .unwrap();

    assert_eq!(derived.edge_count(), g.graph.edge_count());
    for eid in extra.iter().chain(g.eids.iter()) {
        assert_eq!(derived.edge_ends(eid), g.graph.edge_ends(eid));
    }
    let eids: Vec<_> = derived.edges().map(|ends| ends.eid).collect();
    let unique: BTreeSet<_> = eids.iter().collect();
    assert_eq!(eids.len(), unique.len());
}

#[test]
fn test_group_vreps_traverse_like_any_vertex() {
    let mut g = simple_pathway("Groups", &["A", "B"], &[]);
    let pid = g.graph.pid();
    let group = VertexRep::new(pid, "complex", ShapeKind::Rectangle, Point::default())
        .with_grouped(vec![g.vid("A"), g.vid("B")]);
    let gv = group.vid;
    g.graph.add_vertex(group);
    g.graph
        .add_edge(g.vid("A"), gv, PathwayEdge::new(pid, EdgeKind::Relation))
        .unwrap();
    g.graph
        .add_edge(gv, g.vid("B"), PathwayEdge::new(pid, EdgeKind::Relation))
        .unwrap();
    let store = store_with(vec![]);
    let focus = Node::new(g.vrep("A"), pid).unwrap();

    let derived = EnvironmentExtractor::new(&store)
        .extract(&g.graph, &focus, 2)
        .unwrap();
    assert!(derived.contains_vertex(&gv));
    assert!(derived.contains_vertex(&g.vid("B")));
}

#[test]
fn test_derived_pathway_metadata() {
    let g = simple_pathway("Cell cycle", &["A", "B"], &[("A", "B")]);
    let store = store_with(vec![]);
    let focus = Node::new(g.vrep("A"), g.graph.pid()).unwrap();

    let derived = EnvironmentExtractor::new(&store)
        .extract(&g.graph, &focus, 1)
        .unwrap();
    assert_eq!(derived.title(), "Cell cycle [P]");
    assert_eq!(derived.meta().image, g.graph.meta().image);
    assert_eq!(derived.meta().name, g.graph.meta().name);
    assert_eq!(derived.derived_from(), Some(g.graph.pid()));
    assert_ne!(derived.pid(), g.graph.pid());
    assert_ne!(derived.pid(), Pid::nil());

    let custom = EnvironmentExtractor::new(&store)
        .with_title_suffix(" (environment)")
        .extract(&g.graph, &focus, 1)
        .unwrap();
    assert_eq!(custom.title(), "Cell cycle (environment)");
}
