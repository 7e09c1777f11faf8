//! Presentation edges: redirection onto replacement nodes and composition from pathway edges.

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
};

use crate::{
    error::PathwayError,
    pathway::{EdgeEnds, PathwayGraph},
    properties::{EdgeKind, Eid, Nid, Pid, Vid},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointRole {
    Source,
    Target,
}

/// An edge between two nodes, wrapping exactly one pathway edge. The endpoints are reassigned
/// when a node is replaced by its merged counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEdge {
    pub eid: Eid,
    pub pathway: Pid,
    pub kind: EdgeKind,
    pub source: Nid,
    pub target: Nid,
}

impl NodeEdge {
    pub fn endpoint_mut(&mut self, role: EndpointRole) -> &mut Nid {
        match role {
            EndpointRole::Source => &mut self.source,
            EndpointRole::Target => &mut self.target,
        }
    }
}

impl Display for NodeEdge {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({:?} {})",
            self.source.short(),
            self.target.short(),
            self.kind,
            self.eid.short()
        )
    }
}

/// An entity whose node did not exist when an edge touching it was composed. The edge (or the
/// part of it leading to that entity) is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedEntity {
    pub entity: String,
    pub vrep: Vid,
    pub pathway: Pid,
    pub eid: Eid,
    pub role: EndpointRole,
}

/// The NodeEdges of one composition pass, with a count of the edges per ordered node pair.
///
/// Serializes as the plain list of edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<NodeEdge>", into = "Vec<NodeEdge>")]
pub struct NodeEdgeSet {
    edges: Vec<NodeEdge>,
    pairs: BTreeMap<(Nid, Nid), usize>,
}

impl NodeEdgeSet {
    pub fn new() -> NodeEdgeSet {
        NodeEdgeSet::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeEdge> + '_ {
        self.edges.iter()
    }

    pub fn push(&mut self, edge: NodeEdge) {
        *self.pairs.entry((edge.source, edge.target)).or_default() += 1;
        self.edges.push(edge);
    }

    pub fn contains_pair(&self, source: &Nid, target: &Nid) -> bool {
        self.pairs.contains_key(&(*source, *target))
    }

    /// Every place `nid` appears as an endpoint. A self-loop on `nid` is listed once per role.
    pub fn edges_with_node(&self, nid: &Nid) -> Vec<(usize, EndpointRole)> {
        let mut touching = Vec::new();
        for (idx, edge) in self.edges.iter().enumerate() {
            if edge.source == *nid {
                touching.push((idx, EndpointRole::Source));
            }
            if edge.target == *nid {
                touching.push((idx, EndpointRole::Target));
            }
        }
        touching
    }

    /// Drop self pairs and repeated ordered pairs, keeping the first edge of each pair. Redirection
    /// onto a node that was already an endpoint leaves both behind.
    pub fn dedup_pairs(&mut self) -> usize {
        let before = self.edges.len();
        self.pairs.clear();
        let pairs = &mut self.pairs;
        self.edges.retain(|edge| {
            let pair = (edge.source, edge.target);
            if pair.0 == pair.1 || pairs.contains_key(&pair) {
                return false;
            }
            pairs.insert(pair, 1);
            true
        });
        before - self.edges.len()
    }

    fn forget_pair(&mut self, pair: (Nid, Nid)) {
        if let Some(count) = self.pairs.get_mut(&pair) {
            *count -= 1;
            if *count == 0 {
                self.pairs.remove(&pair);
            }
        }
    }
}

impl From<Vec<NodeEdge>> for NodeEdgeSet {
    fn from(edges: Vec<NodeEdge>) -> Self {
        let mut set = NodeEdgeSet::new();
        for edge in edges {
            set.push(edge);
        }
        set
    }
}

impl From<NodeEdgeSet> for Vec<NodeEdge> {
    fn from(set: NodeEdgeSet) -> Self {
        set.edges
    }
}

impl<'a> IntoIterator for &'a NodeEdgeSet {
    type Item = &'a NodeEdge;
    type IntoIter = std::slice::Iter<'a, NodeEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// Reassign every endpoint equal to `old` to `new`, in place. Returns the number of rewritten
/// endpoints; the edge count is unchanged.
pub fn redirect(old: &Nid, new: &Nid, edges: &mut NodeEdgeSet) -> usize {
    let touching = edges.edges_with_node(old);
    // A self-loop is listed once per role; its pair is re-counted once.
    let mut rewired: Vec<usize> = touching.iter().map(|(idx, _)| *idx).collect();
    rewired.dedup();
    for idx in rewired.iter() {
        let edge = &edges.edges[*idx];
        edges.forget_pair((edge.source, edge.target));
    }
    for (idx, role) in touching.iter() {
        *edges.edges[*idx].endpoint_mut(*role) = *new;
    }
    for idx in rewired.iter() {
        let edge = &edges.edges[*idx];
        *edges.pairs.entry((edge.source, edge.target)).or_default() += 1;
    }
    touching.len()
}

/// For every endpoint equal to `old`, append a copy of its edge with that endpoint replaced by
/// `new`. The originals are left untouched. Returns the copies.
pub fn copy_with_redirect(old: &Nid, new: &Nid, edges: &mut NodeEdgeSet) -> Vec<NodeEdge> {
    let copies: Vec<NodeEdge> = edges
        .edges_with_node(old)
        .into_iter()
        .map(|(idx, role)| {
            let mut copy = edges.edges[idx].clone();
            *copy.endpoint_mut(role) = *new;
            copy
        })
        .collect();
    for copy in copies.iter() {
        edges.push(copy.clone());
    }
    copies
}

/// NodeEdges added for one pathway edge, and the entities that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedEdges {
    pub added: Vec<NodeEdge>,
    pub unresolved: Vec<UnresolvedEntity>,
}

/// Translate the pathway edge `ends` of `graph` into NodeEdges and add them to `edges`.
///
/// Each endpoint resolves through `vrep_to_group_node` first (group VReps, and VReps pinned to a
/// node of their own), else through `entity_to_node` for each of its entities. One NodeEdge is
/// added per distinct ordered pair of resolved nodes, except self pairs and pairs already in
/// `edges`.
pub fn compose_edges_for_graph(
    ends: &EdgeEnds,
    graph: &PathwayGraph,
    entity_to_node: &BTreeMap<String, Nid>,
    vrep_to_group_node: &BTreeMap<Vid, Nid>,
    edges: &mut NodeEdgeSet,
) -> Result<ComposedEdges, PathwayError> {
    let kind = graph
        .edge(&ends.eid)
        .map(|edge| edge.kind)
        .ok_or_else(|| {
            PathwayError::InvariantViolation(format!(
                "edge {} is not part of '{}'",
                ends.eid.short(),
                graph.title()
            ))
        })?;
    let mut composed = ComposedEdges::default();
    let sources = resolve_endpoint(
        ends,
        EndpointRole::Source,
        graph,
        entity_to_node,
        vrep_to_group_node,
        &mut composed.unresolved,
    )?;
    let targets = resolve_endpoint(
        ends,
        EndpointRole::Target,
        graph,
        entity_to_node,
        vrep_to_group_node,
        &mut composed.unresolved,
    )?;

    for source in sources.iter() {
        for target in targets.iter() {
            if source == target || edges.contains_pair(source, target) {
                continue;
            }
            let edge = NodeEdge {
                eid: ends.eid,
                pathway: graph.pid(),
                kind,
                source: *source,
                target: *target,
            };
            edges.push(edge.clone());
            composed.added.push(edge);
        }
    }
    Ok(composed)
}

fn resolve_endpoint(
    ends: &EdgeEnds,
    role: EndpointRole,
    graph: &PathwayGraph,
    entity_to_node: &BTreeMap<String, Nid>,
    vrep_to_group_node: &BTreeMap<Vid, Nid>,
    unresolved: &mut Vec<UnresolvedEntity>,
) -> Result<Vec<Nid>, PathwayError> {
    let vid = match role {
        EndpointRole::Source => ends.source,
        EndpointRole::Target => ends.target,
    };
    if let Some(nid) = vrep_to_group_node.get(&vid) {
        return Ok(vec![*nid]);
    }
    let vrep = graph.vertex(&vid).ok_or_else(|| {
        PathwayError::InvariantViolation(format!(
            "{role:?} {} of edge {} is not part of '{}'",
            vid.short(),
            ends.eid.short(),
            graph.title()
        ))
    })?;
    if vrep.is_group() {
        return Err(PathwayError::InvariantViolation(format!(
            "group {vrep} of '{}' has no node",
            graph.title()
        )));
    }

    let mut seen = BTreeSet::new();
    let mut nodes = Vec::new();
    for entity in vrep.entities.iter() {
        match entity_to_node.get(&entity.name) {
            Some(nid) => {
                if seen.insert(*nid) {
                    nodes.push(*nid);
                }
            }
            None => {
                tracing::warn!(
                    "no node for {} ({:?} of edge {} in '{}'), skipping",
                    entity,
                    role,
                    ends.eid.short(),
                    graph.title()
                );
                unresolved.push(UnresolvedEntity {
                    entity: entity.name.clone(),
                    vrep: vid,
                    pathway: graph.pid(),
                    eid: ends.eid,
                    role,
                });
            }
        }
    }
    Ok(nodes)
}
