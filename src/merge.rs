//! Presentation nodes and the merge of equivalent vertex representations.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

use crate::{
    error::PathwayError,
    properties::{Entity, EntityKind, Nid, Pid, Point, VertexRep, Vid},
};

/// Node variant, fixed when the node is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Gene,
    Compound,
    /// Carries the grouped VReps of a group representation
    Group(Vec<Vid>),
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            NodeKind::Gene => write!(f, "Gene"),
            NodeKind::Compound => write!(f, "Compound"),
            NodeKind::Group(grouped) => write!(f, "Group({})", grouped.len()),
        }
    }
}

/// A presentation vertex standing for one or more equivalent [VertexRep]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub nid: Nid,
    pub kind: NodeKind,
    /// Primary representation. For merged nodes this is a synthesized VRep.
    pub vrep: VertexRep,
    pub entities: Vec<Entity>,
    /// Every representation subsumed by this node, searched in order when the primary VRep is
    /// absent from a pathway.
    pub vreps_with_this_nodes_vertices: Vec<VertexRep>,
    pub pathways: BTreeSet<Pid>,
    pub is_merged: bool,
    pub was_merged: bool,
    pub center: Point,
}

impl Node {
    /// A node for a single VRep of `pathway`.
    pub fn new(vrep: &VertexRep, pathway: Pid) -> Result<Node, PathwayError> {
        create_node(
            vrep.clone(),
            vrep.entities.clone(),
            None,
            BTreeSet::from([pathway]),
        )
    }

    pub fn label(&self) -> &str {
        &self.vrep.label
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    /// True if `vid` is the primary VRep or one of the subsumed ones.
    pub fn represents(&self, vid: &Vid) -> bool {
        self.vrep.vid == *vid
            || self
                .vreps_with_this_nodes_vertices
                .iter()
                .any(|vrep| vrep.vid == *vid)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.nid == other.nid
    }
}

impl Eq for Node {}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} node '{}' [{}]", self.kind, self.vrep.label, self.nid.short())
    }
}

/// Build a node for `vrep` denoting `entities` (the VRep's own entities when empty).
///
/// Passing `alternatives` marks the node as merged. Fails with `NotFound` when there is nothing to
/// build a node from: no entities and no grouped representations.
pub fn create_node(
    vrep: VertexRep,
    entities: Vec<Entity>,
    alternatives: Option<Vec<VertexRep>>,
    pathways: BTreeSet<Pid>,
) -> Result<Node, PathwayError> {
    let entities = if entities.is_empty() {
        vrep.entities.clone()
    } else {
        entities
    };
    let kind = match entities.first() {
        Some(entity) if entity.kind == EntityKind::Compound => NodeKind::Compound,
        Some(_) => NodeKind::Gene,
        None if !vrep.grouped.is_empty() => NodeKind::Group(vrep.grouped.clone()),
        None => {
            return Err(PathwayError::NotFound(format!(
                "{vrep} carries neither entities nor grouped representations"
            )))
        }
    };
    let is_merged = alternatives.is_some();
    Ok(Node {
        nid: Nid::new(vrep.pathway),
        kind,
        center: vrep.center,
        vrep,
        entities,
        vreps_with_this_nodes_vertices: alternatives.unwrap_or_default(),
        pathways,
        is_merged,
        was_merged: is_merged,
    })
}

/// A fresh VRep of `owner` denoting `entities`, with geometry and shape taken from `template`.
pub fn synthesize_vrep(template: &VertexRep, entities: &[Entity], owner: Pid) -> VertexRep {
    let label = entities
        .first()
        .map(|entity| entity.display_name.as_str())
        .unwrap_or(template.label.as_str());
    VertexRep::new(owner, label, template.shape, template.center)
        .with_size(template.width, template.height)
        .with_entities(entities.to_vec())
}

/// Where a merge puts its synthesized VRep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeTarget {
    /// The pathway currently being added to the composition
    pub pathway_to_add: Pid,
    /// The synthetic pathway owning VReps merged across pathways
    pub combined: Pid,
}

/// Merge `incoming` into `existing`, producing the node that replaces `existing`.
///
/// * `merge_within_same_graph`: both sides come from the pathway being added. The result only
///   participates in that pathway and, unless `add_to_same_graph` is set, is a transient merge
///   (`is_merged == false`).
/// * `add_to_same_graph`: the synthesized VRep belongs to the pathway being added rather than to
///   the combined pathway.
pub fn merge_nodes(
    same_entities: &[Entity],
    incoming: &VertexRep,
    existing: &Node,
    merge_within_same_graph: bool,
    add_to_same_graph: bool,
    target: &MergeTarget,
) -> Result<Node, PathwayError> {
    let owner = if merge_within_same_graph || add_to_same_graph {
        target.pathway_to_add
    } else {
        target.combined
    };
    let merged_vrep = synthesize_vrep(&existing.vrep, same_entities, owner);

    let mut alternatives = vec![incoming.clone()];
    if existing.vrep != *incoming {
        alternatives.push(existing.vrep.clone());
    }
    for vrep in existing.vreps_with_this_nodes_vertices.iter() {
        if !alternatives.contains(vrep) {
            alternatives.push(vrep.clone());
        }
    }

    let pathways = if merge_within_same_graph {
        BTreeSet::from([target.pathway_to_add])
    } else {
        let mut pathways = existing.pathways.clone();
        pathways.insert(target.pathway_to_add);
        pathways
    };

    let mut merged = create_node(
        merged_vrep,
        same_entities.to_vec(),
        Some(alternatives),
        pathways,
    )?;
    if merge_within_same_graph && !add_to_same_graph {
        merged.is_merged = false;
    }
    merged.center = existing.center;
    tracing::trace!(
        "merged {} into {} as {}",
        incoming,
        existing,
        merged
    );
    Ok(merged)
}
