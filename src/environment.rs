//! Bounded neighborhood extraction around a focus vertex.
//!
//! The environment of radius `r` around a VRep is every edge incident to a vertex whose hop
//! distance from it is less than `r`, together with the endpoints of those edges. Radius 1 is the
//! focus vertex with its direct neighbors. Orientation and edge identity are kept as they are in
//! the source pathway, so self-loops and parallel edges survive extraction.

use std::collections::BTreeSet;

use crate::{
    config::DEFAULT_DERIVED_TITLE_SUFFIX,
    error::PathwayError,
    merge::Node,
    pathway::{PathwayGraph, PathwayStore},
    properties::{VertexRep, Vid},
};

/// Extracts derived subpathways from the pathways of a [PathwayStore].
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentExtractor<'a> {
    store: &'a PathwayStore,
    title_suffix: &'a str,
}

impl<'a> EnvironmentExtractor<'a> {
    pub fn new(store: &'a PathwayStore) -> EnvironmentExtractor<'a> {
        EnvironmentExtractor {
            store,
            title_suffix: DEFAULT_DERIVED_TITLE_SUFFIX,
        }
    }

    pub fn with_title_suffix(mut self, title_suffix: &'a str) -> EnvironmentExtractor<'a> {
        self.title_suffix = title_suffix;
        self
    }

    /// Find the VRep of `source` the environment is grown from: the focus VRep itself, else the
    /// first of the focus node's alternatives present in `source`, else the first representation
    /// of one of the focus entities present in `source`.
    pub fn working_vrep<'g>(
        &self,
        source: &'g PathwayGraph,
        focus: &Node,
    ) -> Result<&'g VertexRep, PathwayError> {
        if let Some(vrep) = source.vertex(&focus.vrep.vid) {
            return Ok(vrep);
        }
        for alternative in focus.vreps_with_this_nodes_vertices.iter() {
            if let Some(vrep) = source.vertex(&alternative.vid) {
                tracing::debug!(
                    "focus {} absent from '{}', using alternative {}",
                    focus.vrep,
                    source.title(),
                    vrep
                );
                return Ok(vrep);
            }
        }
        for entity in focus.entities.iter() {
            for vid in self.store.representations_of(entity) {
                if let Some(vrep) = source.vertex(vid) {
                    tracing::debug!(
                        "focus {} absent from '{}', using representation {} of {}",
                        focus.vrep,
                        source.title(),
                        vrep,
                        entity
                    );
                    return Ok(vrep);
                }
            }
        }
        Err(PathwayError::NotFound(format!(
            "neither {} nor any of its alternatives is part of '{}'",
            focus.vrep,
            source.title()
        )))
    }

    /// Build the subpathway of `source` within `radius` hops of the focus node.
    pub fn extract(
        &self,
        source: &PathwayGraph,
        focus: &Node,
        radius: u32,
    ) -> Result<PathwayGraph, PathwayError> {
        if radius == 0 {
            return Err(PathwayError::Command(
                "environment radius must be at least 1".to_string(),
            ));
        }
        let working = self.working_vrep(source, focus)?;

        let mut derived = PathwayGraph::derived(source, self.title_suffix);
        // A merged focus carries a VRep synthesized by the last pass; only stored ones are seeded.
        if let Some(stored) = self.store.vrep(&focus.vrep.vid) {
            derived.add_vertex(stored.clone());
        }
        derived.add_vertex(working.clone());

        let mut visited = BTreeSet::from([working.vid]);
        let mut frontier = vec![working.vid];
        for level in 0..radius {
            let mut next = Vec::new();
            for vid in frontier.iter() {
                for ends in source.edges_of(vid) {
                    if derived.contains_edge(&ends.eid) {
                        continue;
                    }
                    let neighbour = ends.opposite(*vid).ok_or_else(|| {
                        PathwayError::InvariantViolation(format!(
                            "edge {} listed for {} has neither endpoint there",
                            ends.eid.short(),
                            vid.short()
                        ))
                    })?;
                    copy_vertex(source, &mut derived, &neighbour)?;
                    let edge = source.edge(&ends.eid).cloned().ok_or_else(|| {
                        PathwayError::InvariantViolation(format!(
                            "edge {} vanished from '{}'",
                            ends.eid.short(),
                            source.title()
                        ))
                    })?;
                    derived.add_edge(ends.source, ends.target, edge)?;
                    if visited.insert(neighbour) {
                        next.push(neighbour);
                    }
                }
            }
            tracing::trace!(
                "level {level} of '{}': {} new vertices",
                source.title(),
                next.len()
            );
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        tracing::debug!(
            "extracted '{}' around {} (radius {radius}): {} vertices, {} edges",
            derived.title(),
            working,
            derived.vertex_count(),
            derived.edge_count()
        );
        Ok(derived)
    }
}

fn copy_vertex(
    source: &PathwayGraph,
    derived: &mut PathwayGraph,
    vid: &Vid,
) -> Result<(), PathwayError> {
    if derived.contains_vertex(vid) {
        return Ok(());
    }
    let vrep = source.vertex(vid).ok_or_else(|| {
        PathwayError::InvariantViolation(format!(
            "vertex {} is an edge endpoint but not part of '{}'",
            vid.short(),
            source.title()
        ))
    })?;
    derived.add_vertex(vrep.clone());
    Ok(())
}
