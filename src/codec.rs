//! TOML pathway descriptions.
//!
//! A description lists the entities once, then each pathway with its vertices and edges. Vertices
//! are referenced by a local key (their `id`, or their label when no id is given) which only has
//! to be unique within the pathway:
//!
//! ```toml
//! [[entities]]
//! name = "hsa:7157"
//! display_name = "TP53"
//! kind = "gene"
//!
//! [[pathways]]
//! name = "hsa04115"
//! title = "p53 signaling pathway"
//!
//! [[pathways.vertices]]
//! label = "TP53"
//! entities = ["hsa:7157"]
//!
//! [[pathways.edges]]
//! source = "TP53"
//! target = "TP53"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    error::PathwayError,
    pathway::PathwayGraph,
    properties::{
        EdgeKind, Entity, EntityKind, PathwayDatabase, PathwayEdge, PathwayMeta, Point, ShapeKind,
        VertexRep, Vid,
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtoPathwaySet {
    #[serde(default)]
    pub entities: Vec<ProtoEntity>,
    #[serde(default)]
    pub pathways: Vec<ProtoPathway>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtoEntity {
    pub name: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub kind: EntityKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtoPathway {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub database: PathwayDatabase,
    pub image: Option<String>,
    pub external_link: Option<String>,
    #[serde(default)]
    pub vertices: Vec<ProtoVertex>,
    #[serde(default)]
    pub edges: Vec<ProtoEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtoVertex {
    pub id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub shape: ShapeKind,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub width: Option<u16>,
    pub height: Option<u16>,
    #[serde(default)]
    pub entities: Vec<String>,
    /// Keys of the vertices this group vertex aggregates
    #[serde(default)]
    pub grouped: Vec<String>,
}

impl ProtoVertex {
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtoEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl ProtoPathwaySet {
    pub fn from_toml(text: &str) -> Result<ProtoPathwaySet, PathwayError> {
        Ok(toml::from_str(text)?)
    }

    pub fn entity_table(&self) -> Result<BTreeMap<String, Entity>, PathwayError> {
        let mut table = BTreeMap::new();
        for proto in self.entities.iter() {
            let mut entity = Entity::new(&proto.name, proto.kind);
            if let Some(display_name) = proto.display_name.as_ref() {
                entity = entity.with_display_name(display_name);
            }
            if table.insert(proto.name.clone(), entity).is_some() {
                return Err(PathwayError::Codec(format!(
                    "entity '{}' is declared twice",
                    proto.name
                )));
            }
        }
        Ok(table)
    }

    /// Build one graph per described pathway.
    pub fn build(&self) -> Result<Vec<PathwayGraph>, PathwayError> {
        let entities = self.entity_table()?;
        self.pathways
            .iter()
            .map(|pathway| pathway.build(&entities))
            .collect()
    }
}

impl ProtoPathway {
    pub fn meta(&self) -> PathwayMeta {
        PathwayMeta {
            database: self.database,
            name: self.name.clone(),
            title: self.title.clone(),
            image: self.image.clone(),
            external_link: self.external_link.clone(),
        }
    }

    pub fn build(&self, entities: &BTreeMap<String, Entity>) -> Result<PathwayGraph, PathwayError> {
        let mut graph = PathwayGraph::new(self.meta());
        let pid = graph.pid();

        let mut keys: BTreeMap<&str, Vid> = BTreeMap::new();
        let mut vreps = Vec::with_capacity(self.vertices.len());
        for proto in self.vertices.iter() {
            let mut vrep = VertexRep::new(
                pid,
                &proto.label,
                proto.shape,
                Point::new(proto.x, proto.y),
            );
            if let (Some(width), Some(height)) = (proto.width, proto.height) {
                vrep = vrep.with_size(width, height);
            }
            let mut vrep_entities = Vec::with_capacity(proto.entities.len());
            for name in proto.entities.iter() {
                let entity = entities.get(name).ok_or_else(|| {
                    PathwayError::Codec(format!(
                        "vertex '{}' of '{}' references undeclared entity '{name}'",
                        proto.key(),
                        self.title
                    ))
                })?;
                vrep_entities.push(entity.clone());
            }
            if keys.insert(proto.key(), vrep.vid).is_some() {
                return Err(PathwayError::Codec(format!(
                    "vertex key '{}' is used twice in '{}'",
                    proto.key(),
                    self.title
                )));
            }
            vreps.push(vrep.with_entities(vrep_entities));
        }

        // Group members may be declared after their group.
        for (proto, vrep) in self.vertices.iter().zip(vreps.iter_mut()) {
            for member in proto.grouped.iter() {
                vrep.grouped.push(lookup(&keys, member, &self.title)?);
            }
        }
        for vrep in vreps {
            graph.add_vertex(vrep);
        }

        for proto in self.edges.iter() {
            let source = lookup(&keys, &proto.source, &self.title)?;
            let target = lookup(&keys, &proto.target, &self.title)?;
            graph.add_edge(source, target, PathwayEdge::new(pid, proto.kind))?;
        }
        Ok(graph)
    }
}

fn lookup(keys: &BTreeMap<&str, Vid>, key: &str, title: &str) -> Result<Vid, PathwayError> {
    keys.get(key)
        .copied()
        .ok_or_else(|| PathwayError::Codec(format!("no vertex '{key}' in '{title}'")))
}
