use std::{collections::BTreeMap, sync::Arc};

use crate::{
    codec::ProtoPathwaySet,
    error::PathwayError,
    pathway::graph::PathwayGraph,
    properties::{Entity, Pid, VertexRep, Vid},
};

/// Registry of the immutable source pathways and the entities they reference.
///
/// Besides the graphs themselves the store keeps the entity → representation index the
/// environment extractor falls back on when a focus VRep is absent from a pathway, and the
/// VRep → pathway index used to find the owner of any representation.
#[derive(Debug, Clone, Default)]
pub struct PathwayStore {
    graphs: BTreeMap<Pid, Arc<PathwayGraph>>,
    order: Vec<Pid>,
    entities: BTreeMap<String, Entity>,
    representations: BTreeMap<String, Vec<Vid>>,
    vrep_owner: BTreeMap<Vid, Pid>,
}

impl PathwayStore {
    pub fn new() -> PathwayStore {
        PathwayStore::default()
    }

    /// Register `entity` unless an entity with the same name is already known. Returns the
    /// registered record.
    pub fn register_entity(&mut self, entity: Entity) -> &Entity {
        self.entities.entry(entity.name.clone()).or_insert(entity)
    }

    /// Add a source pathway. Every entity it references is registered and indexed.
    pub fn insert(&mut self, graph: PathwayGraph) -> Result<Arc<PathwayGraph>, PathwayError> {
        if graph.is_derived() {
            return Err(PathwayError::Command(format!(
                "'{}' is a bounded subpathway; only full pathways can be stored",
                graph.title()
            )));
        }
        if self.graphs.contains_key(&graph.pid()) {
            return Err(PathwayError::Command(format!(
                "pathway {} is already stored",
                graph.pid()
            )));
        }
        let pid = graph.pid();
        for vrep in graph.vertices() {
            self.vrep_owner.insert(vrep.vid, pid);
            for entity in vrep.entities.iter() {
                self.register_entity(entity.clone());
                let reps = self.representations.entry(entity.name.clone()).or_default();
                if !reps.contains(&vrep.vid) {
                    reps.push(vrep.vid);
                }
            }
        }
        tracing::debug!(
            "stored pathway '{}' ({} vertices, {} edges)",
            graph.title(),
            graph.vertex_count(),
            graph.edge_count()
        );
        let graph = Arc::new(graph);
        self.graphs.insert(pid, graph.clone());
        self.order.push(pid);
        Ok(graph)
    }

    /// Parse a TOML pathway description and store every pathway in it. Returns the new pathway
    /// IDs in description order.
    pub fn load_toml(&mut self, text: &str) -> Result<Vec<Pid>, PathwayError> {
        let set = ProtoPathwaySet::from_toml(text)?;
        for entity in set.entity_table()?.into_values() {
            self.register_entity(entity);
        }
        let mut pids = Vec::with_capacity(set.pathways.len());
        for graph in set.build()? {
            pids.push(self.insert(graph)?.pid());
        }
        Ok(pids)
    }

    pub fn get(&self, pid: &Pid) -> Option<Arc<PathwayGraph>> {
        self.graphs.get(pid).cloned()
    }

    pub fn require(&self, pid: &Pid) -> Result<Arc<PathwayGraph>, PathwayError> {
        self.get(pid)
            .ok_or_else(|| PathwayError::NotFound(format!("pathway {pid} is not stored")))
    }

    /// Stored pathways in insertion order.
    pub fn pathways(&self) -> impl Iterator<Item = &Arc<PathwayGraph>> + '_ {
        self.order.iter().filter_map(|pid| self.graphs.get(pid))
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Every VRep denoting `entity`, in registration order.
    pub fn representations_of(&self, entity: &Entity) -> &[Vid] {
        self.representations
            .get(&entity.name)
            .map(|reps| reps.as_slice())
            .unwrap_or(&[])
    }

    pub fn owner_of(&self, vid: &Vid) -> Option<Pid> {
        self.vrep_owner.get(vid).copied()
    }

    pub fn vrep(&self, vid: &Vid) -> Option<&VertexRep> {
        self.vrep_owner
            .get(vid)
            .and_then(|pid| self.graphs.get(pid))
            .and_then(|graph| graph.vertex(vid))
    }

    /// First stored pathway whose name or title equals `key`.
    pub fn find(&self, key: &str) -> Option<Arc<PathwayGraph>> {
        self.pathways()
            .find(|graph| graph.meta().name == key || graph.title() == key)
            .cloned()
    }
}
