use std::{collections::BTreeSet, sync::Arc};

use crate::{
    pathway::{graph::PathwayGraph, store::PathwayStore},
    properties::{Entity, Pid, Vid},
};

/// Selects the stored pathways that contain a representation of any of the given entities,
/// leaving out the ones already on display.
#[derive(Debug, Clone)]
pub struct CommonEntityFilter {
    representations: BTreeSet<Vid>,
    ignore: BTreeSet<Pid>,
}

impl CommonEntityFilter {
    pub fn new<I>(store: &PathwayStore, entities: &[Entity], ignore: I) -> CommonEntityFilter
    where
        I: IntoIterator<Item = Pid>,
    {
        let representations = entities
            .iter()
            .flat_map(|entity| store.representations_of(entity).iter().copied())
            .collect();
        CommonEntityFilter {
            representations,
            ignore: ignore.into_iter().collect(),
        }
    }

    pub fn show_pathway(&self, graph: &PathwayGraph) -> bool {
        if self.ignore.contains(&graph.pid()) {
            return false;
        }
        self.representations
            .iter()
            .any(|vid| graph.contains_vertex(vid))
    }

    /// The matching pathways of `store`, in store order.
    pub fn apply(&self, store: &PathwayStore) -> Vec<Arc<PathwayGraph>> {
        store
            .pathways()
            .filter(|graph| self.show_pathway(graph))
            .cloned()
            .collect()
    }
}
