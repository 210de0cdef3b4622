use crate::error::ContentError;
use crate::ids::Uid;
use crate::properties::{Meta, Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Kind of a primitive node in the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Vertex,
    Port,
    Group,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::Vertex, NodeKind::Port, NodeKind::Group];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Port => "port",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connection point of a vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    #[serde(rename = "id")]
    pub uid: Uid,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub meta: Meta,
}

impl Port {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            uid: uid.into(),
            properties: Properties::new(),
            meta: Meta::Null,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }
}

/// A diagram node. Owns the ports through which it connects to other vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(rename = "id")]
    pub uid: Uid,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub ports: BTreeSet<Uid>,
}

impl Vertex {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            uid: uid.into(),
            properties: Properties::new(),
            meta: Meta::Null,
            ports: BTreeSet::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_port(mut self, port: impl Into<Uid>) -> Self {
        self.ports.insert(port.into());
        self
    }
}

/// Front-end grouping of objects. Carries no backend semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "id")]
    pub uid: Uid,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub meta: Meta,
}

impl Group {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self {
            uid: uid.into(),
            properties: Properties::new(),
            meta: Meta::Null,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }
}

/// Identity of an edge: the ordered pair of the ports it connects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub start: Uid,
    pub end: Uid,
}

impl EdgeKey {
    pub fn new(start: impl Into<Uid>, end: impl Into<Uid>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// A directed connection from an outgoing port (`start`) to an incoming
/// port (`end`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "startPort")]
    pub start: Uid,
    #[serde(rename = "endPort")]
    pub end: Uid,
    #[serde(default)]
    pub meta: Meta,
}

impl Edge {
    pub fn new(start: impl Into<Uid>, end: impl Into<Uid>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            meta: Meta::Null,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.start.clone(), self.end.clone())
    }
}

/// Graph content exchanged with callers.
///
/// Collections are unordered: membership is by uid (edge key for edges).
/// Callers must not rely on the order the engine returns them in; use
/// [`Content::sorted`] before comparing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Content {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.ports.is_empty()
            && self.edges.is_empty()
            && self.groups.is_empty()
    }

    /// Short human-readable statistics, used in log lines.
    pub fn info(&self) -> String {
        format!(
            "{} vertices, {} ports, {} edges, {} groups",
            self.vertices.len(),
            self.ports.len(),
            self.edges.len(),
            self.groups.len()
        )
    }

    /// Canonical ordering: primitives by uid, edges by key.
    pub fn sorted(mut self) -> Self {
        self.vertices.sort_by(|a, b| a.uid.cmp(&b.uid));
        self.ports.sort_by(|a, b| a.uid.cmp(&b.uid));
        self.edges.sort_by_key(Edge::key);
        self.groups.sort_by(|a, b| a.uid.cmp(&b.uid));
        self
    }

    pub fn port_uids(&self) -> BTreeSet<Uid> {
        self.ports.iter().map(|p| p.uid.clone()).collect()
    }

    pub fn edge_keys(&self) -> BTreeSet<EdgeKey> {
        self.edges.iter().map(Edge::key).collect()
    }

    /// Verify the referential integrity the engine relies on.
    ///
    /// Uids are unique within their kind, edge keys are unique, and every
    /// port referenced by a vertex or an edge is part of `ports`.
    pub fn check_references(&self) -> Result<(), ContentError> {
        check_unique(NodeKind::Vertex, self.vertices.iter().map(|v| &v.uid))?;
        check_unique(NodeKind::Port, self.ports.iter().map(|p| &p.uid))?;
        check_unique(NodeKind::Group, self.groups.iter().map(|g| &g.uid))?;

        let mut seen = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !seen.insert(edge.key()) {
                return Err(ContentError::DuplicateEdge(edge.key()));
            }
        }

        let ports: HashSet<&str> = self.ports.iter().map(|p| p.uid.as_str()).collect();

        for vertex in &self.vertices {
            if let Some(missing) = vertex.ports.iter().find(|p| !ports.contains(p.as_str())) {
                return Err(ContentError::DanglingPort {
                    referrer: format!("vertex {}", vertex.uid),
                    port: missing.clone(),
                });
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.start, &edge.end] {
                if !ports.contains(endpoint.as_str()) {
                    return Err(ContentError::DanglingPort {
                        referrer: format!("edge {}", edge.key()),
                        port: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn check_unique<'a>(
    kind: NodeKind,
    uids: impl Iterator<Item = &'a Uid>,
) -> Result<(), ContentError> {
    let mut seen = HashSet::new();
    for uid in uids {
        if !seen.insert(uid) {
            return Err(ContentError::DuplicateUid {
                kind,
                uid: uid.clone(),
            });
        }
    }
    Ok(())
}
