//! Shared test utilities for pathway graphs

use crate::{
    pathway::{PathwayGraph, PathwayStore},
    properties::{
        EdgeKind, Eid, Entity, EntityKind, PathwayEdge, PathwayMeta, Point, ShapeKind, VertexRep,
        Vid,
    },
};
use std::collections::BTreeMap;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn gene(name: &str) -> Entity {
    Entity::new(name, EntityKind::Gene)
}

pub fn compound(name: &str) -> Entity {
    Entity::new(name, EntityKind::Compound)
}

/// A pathway built from local vertex keys, with lookups back from key to ID.
pub struct TestPathway {
    pub graph: PathwayGraph,
    pub vids: BTreeMap<String, Vid>,
    pub eids: Vec<Eid>,
}

impl TestPathway {
    pub fn vid(&self, key: &str) -> Vid {
        self.vids[key]
    }

    pub fn vrep(&self, key: &str) -> &VertexRep {
        self.graph.vertex(&self.vids[key]).unwrap()
    }
}

/// Build a pathway titled `title`. Each vertex is `(key, entity names)` with every entity a gene;
/// each edge is `(source key, target key)`.
pub fn build_pathway(title: &str, vertices: &[(&str, &[&str])], edges: &[(&str, &str)]) -> TestPathway {
    let mut graph = PathwayGraph::new(PathwayMeta {
        name: title.to_lowercase(),
        title: title.to_string(),
        image: Some(format!("{}.png", title.to_lowercase())),
        ..Default::default()
    });
    let pid = graph.pid();
    let mut vids = BTreeMap::new();
    for (idx, (key, entities)) in vertices.iter().enumerate() {
        let vrep = VertexRep::new(
            pid,
            key,
            ShapeKind::Rectangle,
            Point::new(idx as f32 * 50.0, 0.0),
        )
        .with_entities(entities.iter().map(|name| gene(name)).collect());
        vids.insert(key.to_string(), vrep.vid);
        graph.add_vertex(vrep);
    }
    let mut eids = Vec::new();
    for (source, target) in edges.iter() {
        let edge = PathwayEdge::new(pid, EdgeKind::Relation);
        eids.push(edge.eid);
        graph
            .add_edge(vids[*source], vids[*target], edge)
            .unwrap();
    }
    TestPathway { graph, vids, eids }
}

/// A pathway whose vertices each stand for the gene of the same name.
pub fn simple_pathway(title: &str, keys: &[&str], edges: &[(&str, &str)]) -> TestPathway {
    let vertices: Vec<(&str, Vec<&str>)> = keys.iter().map(|key| (*key, vec![*key])).collect();
    let vertices: Vec<(&str, &[&str])> = vertices
        .iter()
        .map(|(key, entities)| (*key, entities.as_slice()))
        .collect();
    build_pathway(title, &vertices, edges)
}

/// A path `n0 - n1 - ... - n{len-1}` of genes `{prefix}{i}`.
pub fn chain_pathway(title: &str, prefix: &str, len: usize) -> TestPathway {
    let keys: Vec<String> = (0..len).map(|i| format!("{prefix}{i}")).collect();
    let key_refs: Vec<&str> = keys.iter().map(|key| key.as_str()).collect();
    let edges: Vec<(&str, &str)> = key_refs.windows(2).map(|pair| (pair[0], pair[1])).collect();
    simple_pathway(title, &key_refs, &edges)
}

pub fn store_with(pathways: Vec<PathwayGraph>) -> PathwayStore {
    init_logging();
    let mut store = PathwayStore::new();
    for graph in pathways {
        store.insert(graph).unwrap();
    }
    store
}

pub fn vertex_set(graph: &PathwayGraph) -> Vec<Vid> {
    let mut vids: Vec<Vid> = graph.vertices().map(|vrep| vrep.vid).collect();
    vids.sort();
    vids
}

pub fn edge_set(graph: &PathwayGraph) -> Vec<Eid> {
    let mut eids: Vec<Eid> = graph.edges().map(|ends| ends.eid).collect();
    eids.sort();
    eids
}
