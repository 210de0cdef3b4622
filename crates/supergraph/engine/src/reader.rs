//! Projection of a container's persisted content.

use crate::error::EngineResult;
use std::collections::{BTreeMap, BTreeSet};
use supergraph_store::{EdgeRecord, GraphTransaction, NodeRecord};
use supergraph_types::{ContainerId, Content, Edge, Group, NodeKind, Port, Uid, Vertex};
use tracing::debug;

/// Reads the content owned by a container. Never mutates the store.
pub struct Reader<'a> {
    tx: &'a mut dyn GraphTransaction,
}

impl<'a> Reader<'a> {
    pub fn new(tx: &'a mut dyn GraphTransaction) -> Self {
        Self { tx }
    }

    /// Owned vertices with their ports, the edges among those ports, and
    /// owned groups. Edges leaving the container's port set are excluded.
    pub async fn read(&mut self, container: ContainerId) -> EngineResult<Content> {
        let vertex_records = self.tx.owned(container, NodeKind::Vertex).await?;

        let mut ports: BTreeMap<Uid, NodeRecord> = BTreeMap::new();
        let mut vertices = Vec::with_capacity(vertex_records.len());
        for record in vertex_records {
            let mut vertex = vertex_from(record);
            for port in self.tx.ports_of(&vertex.uid).await? {
                vertex.ports.insert(port.uid.clone());
                ports.insert(port.uid.clone(), port);
            }
            vertices.push(vertex);
        }

        let port_uids: BTreeSet<Uid> = ports.keys().cloned().collect();
        let edges = self
            .tx
            .edges_among(&port_uids)
            .await?
            .into_iter()
            .map(edge_from)
            .collect();

        let groups = self
            .tx
            .owned(container, NodeKind::Group)
            .await?
            .into_iter()
            .map(group_from)
            .collect();

        let content = Content {
            vertices,
            ports: ports.into_values().map(port_from).collect(),
            edges,
            groups,
        };
        debug!(container = %container, content = %content.info(), "read container content");
        Ok(content)
    }
}

fn vertex_from(record: NodeRecord) -> Vertex {
    Vertex {
        uid: record.uid,
        properties: record.properties,
        meta: record.meta,
        ports: BTreeSet::new(),
    }
}

fn port_from(record: NodeRecord) -> Port {
    Port {
        uid: record.uid,
        properties: record.properties,
        meta: record.meta,
    }
}

fn group_from(record: NodeRecord) -> Group {
    Group {
        uid: record.uid,
        properties: record.properties,
        meta: record.meta,
    }
}

fn edge_from(record: EdgeRecord) -> Edge {
    Edge {
        start: record.key.start,
        end: record.key.end,
        meta: record.meta,
    }
}
