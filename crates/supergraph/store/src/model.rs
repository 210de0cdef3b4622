use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use supergraph_types::{EdgeKey, Meta, NodeKind, Properties, Uid};
use uuid::Uuid;

/// Identity of one logical graph store.
///
/// Container handles remember the store that produced them so that an
/// operation against a different store can be refused up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreId(Uuid);

impl StoreId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Stored vertex, port or group node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub kind: NodeKind,
    pub uid: Uid,
    pub properties: Properties,
    pub meta: Meta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NodeRecord {
    pub fn new(kind: NodeKind, uid: Uid, properties: Properties, meta: Meta) -> Self {
        let now = Utc::now();
        Self {
            kind,
            uid,
            properties,
            meta,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Stored directed edge between two ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub key: EdgeKey,
    pub meta: Meta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EdgeRecord {
    pub fn new(key: EdgeKey, meta: Meta) -> Self {
        let now = Utc::now();
        Self {
            key,
            meta,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Node and relationship counts of a whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub roots: u64,
    pub fragments: u64,
    pub vertices: u64,
    pub ports: u64,
    pub groups: u64,
    pub edges: u64,
    pub fragment_links: u64,
    pub ownership_links: u64,
    pub port_links: u64,
}

impl GraphStats {
    pub fn nodes(&self, kind: NodeKind) -> u64 {
        match kind {
            NodeKind::Vertex => self.vertices,
            NodeKind::Port => self.ports,
            NodeKind::Group => self.groups,
        }
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} roots, {} fragments, {} vertices, {} ports, {} edges, {} groups",
            self.roots, self.fragments, self.vertices, self.ports, self.edges, self.groups
        )
    }
}
