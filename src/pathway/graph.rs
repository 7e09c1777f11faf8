//! Graph store for a single pathway.
//!
//! [`PathwayGraph`] is a labeled directed multigraph over [`VertexRep`]s, backed by a
//! [`petgraph::Graph`] whose node weights are [`Vid`]s and whose edge weights are
//! [`PathwayEdge`]s. Lookup maps translate the stable keys into petgraph indices, so callers never
//! see an index.

use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
    Directed, Direction,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::PathwayError,
    properties::{Eid, PathwayEdge, PathwayMeta, Pid, VertexRep, Vid},
};

/// An edge together with its endpoints, as stored in a [`PathwayGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeEnds {
    pub eid: Eid,
    pub source: Vid,
    pub target: Vid,
}

impl EdgeEnds {
    /// The endpoint opposite to `vid`, or `None` if `vid` is not an endpoint of this edge.
    pub fn opposite(&self, vid: Vid) -> Option<Vid> {
        if self.target == vid {
            Some(self.source)
        } else if self.source == vid {
            Some(self.target)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathwayGraph {
    pid: Pid,
    meta: PathwayMeta,
    derived_from: Option<Pid>,
    graph: petgraph::Graph<Vid, PathwayEdge, Directed>,
    vrep_index: BTreeMap<Vid, NodeIndex>,
    edge_index: BTreeMap<Eid, EdgeIndex>,
    vreps: BTreeMap<Vid, VertexRep>,
}

impl PathwayGraph {
    pub fn new(meta: PathwayMeta) -> PathwayGraph {
        PathwayGraph::with_pid(Pid::generate(), meta)
    }

    pub fn with_pid(pid: Pid, meta: PathwayMeta) -> PathwayGraph {
        PathwayGraph {
            pid,
            meta,
            derived_from: None,
            graph: petgraph::Graph::new(),
            vrep_index: BTreeMap::new(),
            edge_index: BTreeMap::new(),
            vreps: BTreeMap::new(),
        }
    }

    /// Create an empty graph derived from `source`: same metadata, title suffixed, back-reference
    /// set.
    pub fn derived(source: &PathwayGraph, title_suffix: &str) -> PathwayGraph {
        let mut meta = source.meta.clone();
        meta.title = format!("{}{}", meta.title, title_suffix);
        let mut derived = PathwayGraph::new(meta);
        derived.derived_from = Some(source.pid);
        derived
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn meta(&self) -> &PathwayMeta {
        &self.meta
    }

    pub fn title(&self) -> &str {
        &self.meta.title
    }

    /// The source pathway this graph was extracted from, if it is a bounded subgraph.
    pub fn derived_from(&self) -> Option<Pid> {
        self.derived_from
    }

    pub fn is_derived(&self) -> bool {
        self.derived_from.is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_vertex(&self, vid: &Vid) -> bool {
        self.vrep_index.contains_key(vid)
    }

    pub fn contains_edge(&self, eid: &Eid) -> bool {
        self.edge_index.contains_key(eid)
    }

    pub fn vertex(&self, vid: &Vid) -> Option<&VertexRep> {
        self.vreps.get(vid)
    }

    /// All VReps, in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &VertexRep> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.vreps.get(&self.graph[idx]))
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeEnds> + '_ {
        self.graph.raw_edges().iter().map(move |edge| EdgeEnds {
            eid: edge.weight.eid,
            source: self.graph[edge.source()],
            target: self.graph[edge.target()],
        })
    }

    pub fn edge(&self, eid: &Eid) -> Option<&PathwayEdge> {
        self.edge_index
            .get(eid)
            .and_then(|idx| self.graph.edge_weight(*idx))
    }

    pub fn edge_ends(&self, eid: &Eid) -> Option<EdgeEnds> {
        let idx = self.edge_index.get(eid)?;
        let (source, target) = self.graph.edge_endpoints(*idx)?;
        Some(EdgeEnds {
            eid: *eid,
            source: self.graph[source],
            target: self.graph[target],
        })
    }

    pub fn edge_source(&self, eid: &Eid) -> Option<Vid> {
        self.edge_ends(eid).map(|ends| ends.source)
    }

    pub fn edge_target(&self, eid: &Eid) -> Option<Vid> {
        self.edge_ends(eid).map(|ends| ends.target)
    }

    /// Every edge touching `vid`, outgoing first. A self-loop is reported once.
    pub fn edges_of(&self, vid: &Vid) -> Vec<EdgeEnds> {
        let Some(idx) = self.vrep_index.get(vid) else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        let mut incident = Vec::new();
        for direction in [Direction::Outgoing, Direction::Incoming] {
            for edge in self.graph.edges_directed(*idx, direction) {
                if seen.insert(edge.id()) {
                    incident.push(EdgeEnds {
                        eid: edge.weight().eid,
                        source: self.graph[edge.source()],
                        target: self.graph[edge.target()],
                    });
                }
            }
        }
        incident
    }

    pub fn degree(&self, vid: &Vid) -> usize {
        self.edges_of(vid).len()
    }

    /// Insert `vrep`. Returns false if a VRep with the same ID is already present.
    pub fn add_vertex(&mut self, vrep: VertexRep) -> bool {
        if self.vrep_index.contains_key(&vrep.vid) {
            return false;
        }
        let idx = self.graph.add_node(vrep.vid);
        self.vrep_index.insert(vrep.vid, idx);
        self.vreps.insert(vrep.vid, vrep);
        true
    }

    /// Insert `edge` between two VReps of this graph. Returns false if an edge with the same ID is
    /// already present.
    pub fn add_edge(
        &mut self,
        source: Vid,
        target: Vid,
        edge: PathwayEdge,
    ) -> Result<bool, PathwayError> {
        if self.edge_index.contains_key(&edge.eid) {
            return Ok(false);
        }
        let (Some(source_idx), Some(target_idx)) =
            (self.vrep_index.get(&source), self.vrep_index.get(&target))
        else {
            return Err(PathwayError::InvariantViolation(format!(
                "edge {} of pathway '{}' references a vertex outside the pathway ({} -> {})",
                edge.eid.short(),
                self.meta.title,
                source.short(),
                target.short()
            )));
        };
        let eid = edge.eid;
        let idx = self.graph.add_edge(*source_idx, *target_idx, edge);
        self.edge_index.insert(eid, idx);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{EdgeKind, Point, ShapeKind};

    fn vrep(pid: Pid, label: &str) -> VertexRep {
        VertexRep::new(pid, label, ShapeKind::Rectangle, Point::default())
    }

    #[test]
    fn edges_of_reports_both_directions_and_self_loops_once() {
        let mut g = PathwayGraph::new(PathwayMeta::default());
        let pid = g.pid();
        let a = vrep(pid, "a");
        let b = vrep(pid, "b");
        let (va, vb) = (a.vid, b.vid);
        g.add_vertex(a);
        g.add_vertex(b);
        let ab = PathwayEdge::new(pid, EdgeKind::Relation);
        let ba = PathwayEdge::new(pid, EdgeKind::Relation);
        let aa = PathwayEdge::new(pid, EdgeKind::Reaction);
        g.add_edge(va, vb, ab.clone()).unwrap();
        g.add_edge(vb, va, ba.clone()).unwrap();
        g.add_edge(va, va, aa.clone()).unwrap();

        let incident = g.edges_of(&va);
        assert_eq!(incident.len(), 3);
        assert_eq!(g.degree(&vb), 2);
        assert_eq!(g.edge_source(&ba.eid), Some(vb));
        assert_eq!(g.edge_target(&ba.eid), Some(va));
        assert_eq!(g.edge_ends(&aa.eid).unwrap().opposite(va), Some(va));
    }

    #[test]
    fn duplicate_inserts_are_ignored() {
        let mut g = PathwayGraph::new(PathwayMeta::default());
        let pid = g.pid();
        let a = vrep(pid, "a");
        let va = a.vid;
        assert!(g.add_vertex(a.clone()));
        assert!(!g.add_vertex(a));
        let e = PathwayEdge::new(pid, EdgeKind::Relation);
        assert!(g.add_edge(va, va, e.clone()).unwrap());
        assert!(!g.add_edge(va, va, e).unwrap());
        assert_eq!(g.vertex_count(), 1);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn edge_to_foreign_vertex_is_rejected() {
        let mut g = PathwayGraph::new(PathwayMeta::default());
        let pid = g.pid();
        let a = vrep(pid, "a");
        let va = a.vid;
        g.add_vertex(a);
        let stranger = vrep(pid, "stranger").vid;
        let err = g
            .add_edge(va, stranger, PathwayEdge::new(pid, EdgeKind::Relation))
            .unwrap_err();
        assert!(matches!(err, PathwayError::InvariantViolation(_)));
    }

    #[test]
    fn derived_graph_keeps_metadata_and_back_reference() {
        let source = PathwayGraph::new(PathwayMeta {
            name: "hsa04110".to_string(),
            title: "Cell cycle".to_string(),
            ..Default::default()
        });
        let derived = PathwayGraph::derived(&source, " [P]");
        assert_eq!(derived.title(), "Cell cycle [P]");
        assert_eq!(derived.meta().name, "hsa04110");
        assert_eq!(derived.derived_from(), Some(source.pid()));
        assert_ne!(derived.pid(), source.pid());
    }
}
