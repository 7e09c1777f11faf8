/// [crate::properties] contains the identity model shared by every pathway graph: the UUID-backed
/// keys, [Entity] records, [VertexRep]s and [PathwayEdge] records.
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

pub use uuid::Uuid;

use crate::error::PathwayError;

/// The pathway namespace UUID. Keys are minted inside the namespace of their owning key (a VRep
/// inside its pathway, a pathway inside the nil namespace), so the least significant six bytes of
/// every key identify its owner.
pub const UUID_NAMESPACE_PATHWAY: Uuid = Uuid::from_bytes([
    0x3f, 0x8a, 0x5c, 0x12, 0x7e, 0x44, 0x4b, 0x0d, 0x9a, 0x61, 0x2c, 0xd3, 0x08, 0xbe, 0x71, 0x95,
]);

pub const KEY_NAMESPACE_NIL: [u8; 6] = [0; 6];

/// Derive the six namespace bytes that keys minted under `id` will carry.
pub fn namespace_bytes(id: &Uuid) -> [u8; 6] {
    parent_namespace_bytes(&Uuid::new_v5(&UUID_NAMESPACE_PATHWAY, id.as_bytes()))
}

/// The least significant six bytes of a key: the namespace of the key it was minted under.
pub fn parent_namespace_bytes(id: &Uuid) -> [u8; 6] {
    let bytes = id.as_bytes();
    [bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]]
}

macro_rules! uuid_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a new key inside `parent`'s namespace.
            pub fn new<U: AsRef<Uuid>>(parent: U) -> Self {
                $name(Uuid::now_v6(&namespace_bytes(parent.as_ref())))
            }

            pub fn nil() -> Self {
                $name(Uuid::nil())
            }

            pub fn namespace_bytes(&self) -> [u8; 6] {
                namespace_bytes(&self.0)
            }

            pub fn parent_namespace_bytes(&self) -> [u8; 6] {
                parent_namespace_bytes(&self.0)
            }

            /// True if `key` was minted inside this key's namespace.
            pub fn owns<U: AsRef<Uuid>>(&self, key: U) -> bool {
                parent_namespace_bytes(key.as_ref()) == self.namespace_bytes()
            }

            /// First eight hex characters, for log lines.
            pub fn short(&self) -> String {
                self.0.as_simple().encode_lower(&mut Uuid::encode_buffer())[..8].to_string()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                $name(id)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = PathwayError;

            fn try_from(string: &str) -> Result<Self, Self::Error> {
                Ok($name(Uuid::parse_str(string)?))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    "{}",
                    self.0.hyphenated().encode_lower(&mut Uuid::encode_buffer())
                )
            }
        }
    };
}

uuid_key!(
    /// Pathway ID. Identifies a source pathway graph, a derived (bounded) subgraph, or the combined
    /// graph that owns VReps synthesized by cross-pathway merges.
    Pid
);

uuid_key!(
    /// Vertex-representation ID, minted inside the namespace of the pathway that owns the VRep.
    Vid
);

uuid_key!(
    /// Edge ID, minted inside the namespace of the pathway that owns the edge. Derived subgraphs
    /// keep the source edge's ID, which is how duplicate copies are detected.
    Eid
);

uuid_key!(
    /// Presentation node ID. Fresh for every composition pass.
    Nid
);

impl Pid {
    pub fn generate() -> Pid {
        Pid::new(Pid::nil())
    }
}

/// Biological kind of an [Entity]. The kind of a node's first entity fixes its [crate::merge::NodeKind].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Gene,
    Compound,
    #[default]
    Other,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A biological concept (e.g. a gene) referenced by one or more [VertexRep]s. Identity is the
/// stable `name`; the display name is what users see and may collide across entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub display_name: String,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(name: &str, kind: EntityKind) -> Entity {
        Entity {
            name: name.to_string(),
            display_name: name.to_string(),
            kind,
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Entity {
        self.display_name = display_name.to_string();
        self
    }
}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Entity {}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.kind)
    }
}

/// Keep only the first entity for every display name.
pub fn filter_entities_by_name(entities: &[Entity]) -> Vec<Entity> {
    let mut filtered: Vec<Entity> = Vec::new();
    for entity in entities {
        if !filtered
            .iter()
            .any(|kept| kept.display_name == entity.display_name)
        {
            filtered.push(entity.clone());
        }
    }
    filtered
}

/// Union of `lhs` and `rhs` by entity identity, keeping the order of first appearance.
pub fn union_entities(lhs: &[Entity], rhs: &[Entity]) -> Vec<Entity> {
    let mut union = lhs.to_vec();
    for entity in rhs {
        if !union.contains(entity) {
            union.push(entity.clone());
        }
    }
    union
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    RoundedRectangle,
    Circle,
    Polygon,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }
}

/// A graph-local vertex denoting one or more [Entity]s, or, for group representations, a set of
/// other VReps of the same pathway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexRep {
    pub vid: Vid,
    /// The pathway this representation belongs to. Derived subgraphs reference VReps of their
    /// source pathway without changing this field.
    pub pathway: Pid,
    pub label: String,
    pub shape: ShapeKind,
    pub center: Point,
    pub width: u16,
    pub height: u16,
    pub entities: Vec<Entity>,
    pub grouped: Vec<Vid>,
}

impl VertexRep {
    pub fn new(pathway: Pid, label: &str, shape: ShapeKind, center: Point) -> VertexRep {
        VertexRep {
            vid: Vid::new(pathway),
            pathway,
            label: label.to_string(),
            shape,
            center,
            width: 46,
            height: 17,
            entities: Vec::new(),
            grouped: Vec::new(),
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> VertexRep {
        self.entities = entities;
        self
    }

    pub fn with_grouped(mut self, grouped: Vec<Vid>) -> VertexRep {
        self.grouped = grouped;
        self
    }

    pub fn with_size(mut self, width: u16, height: u16) -> VertexRep {
        self.width = width;
        self.height = height;
        self
    }

    /// A group representation aggregates other VReps instead of entities.
    pub fn is_group(&self) -> bool {
        self.entities.is_empty() && !self.grouped.is_empty()
    }

    /// True if neither entities nor grouped representations back this VRep.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.grouped.is_empty()
    }
}

impl PartialEq for VertexRep {
    fn eq(&self, other: &Self) -> bool {
        self.vid == other.vid
    }
}

impl Eq for VertexRep {}

impl Display for VertexRep {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} [{}]", self.label, self.vid.short())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Relation,
    Reaction,
}

/// Weight of a pathway graph edge. The endpoints live in the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathwayEdge {
    pub eid: Eid,
    pub kind: EdgeKind,
}

impl PathwayEdge {
    pub fn new(pathway: Pid, kind: EdgeKind) -> PathwayEdge {
        PathwayEdge {
            eid: Eid::new(pathway),
            kind,
        }
    }
}

/// The database a pathway was loaded from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathwayDatabase {
    #[default]
    Kegg,
    Wikipathways,
    /// The synthetic graph owning VReps produced by cross-pathway merges.
    Combined,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayMeta {
    pub database: PathwayDatabase,
    pub name: String,
    pub title: String,
    pub image: Option<String>,
    pub external_link: Option<String>,
}
