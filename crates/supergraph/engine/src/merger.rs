//! Upsert of submitted content by uid.

use crate::error::{EngineError, EngineResult};
use chrono::Utc;
use std::collections::BTreeMap;
use supergraph_store::{EdgeRecord, GraphTransaction, NodeRecord};
use supergraph_types::{ContainerRecord, Content, ContentError, Meta, NodeKind, Properties, Uid};
use tracing::debug;

/// Stored records touched by a merge.
#[derive(Debug, Clone, Default)]
pub struct Merged {
    pub vertices: Vec<NodeRecord>,
    pub ports: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub groups: Vec<NodeRecord>,
}

/// Creates or overwrites content and links it to a container.
///
/// Ports go first so that edges and vertices can resolve them. Existing
/// nodes and edges have their properties and meta replaced wholesale.
pub struct Merger<'a> {
    tx: &'a mut dyn GraphTransaction,
    container: &'a ContainerRecord,
}

impl<'a> Merger<'a> {
    pub fn new(tx: &'a mut dyn GraphTransaction, container: &'a ContainerRecord) -> Self {
        Self { tx, container }
    }

    pub async fn merge(&mut self, content: &Content) -> EngineResult<Merged> {
        let mut merged = Merged::default();

        let mut ports: BTreeMap<&Uid, NodeRecord> = BTreeMap::new();
        for port in &content.ports {
            let record = self
                .upsert(NodeKind::Port, &port.uid, &port.properties, &port.meta)
                .await?;
            ports.insert(&port.uid, record);
        }

        for edge in &content.edges {
            let key = edge.key();
            for endpoint in [&edge.start, &edge.end] {
                if !ports.contains_key(endpoint) {
                    return Err(ContentError::DanglingPort {
                        referrer: format!("edge {key}"),
                        port: endpoint.clone(),
                    }
                    .into());
                }
            }
            let record = match self.tx.edge(&key).await? {
                Some(mut existing) => {
                    existing.meta = edge.meta.clone();
                    existing.updated_at = Utc::now();
                    self.tx.update_edge(&existing).await?;
                    existing
                }
                None => {
                    let record = EdgeRecord::new(key, edge.meta.clone());
                    self.tx.create_edge(&record).await?;
                    record
                }
            };
            merged.edges.push(record);
        }

        for vertex in &content.vertices {
            if let Some(missing) = vertex.ports.iter().find(|p| !ports.contains_key(p)) {
                return Err(EngineError::Integrity(ContentError::DanglingPort {
                    referrer: format!("vertex {}", vertex.uid),
                    port: missing.clone(),
                }));
            }
            let record = self
                .upsert(NodeKind::Vertex, &vertex.uid, &vertex.properties, &vertex.meta)
                .await?;
            for port in &vertex.ports {
                self.tx.attach_port(&vertex.uid, port).await?;
            }
            merged.vertices.push(record);
        }

        for group in &content.groups {
            let record = self
                .upsert(NodeKind::Group, &group.uid, &group.properties, &group.meta)
                .await?;
            merged.groups.push(record);
        }

        let mut attached = 0usize;
        for record in merged.vertices.iter().chain(merged.groups.iter()) {
            if self.tx.own(self.container.id, record.kind, &record.uid).await? {
                attached += 1;
            }
        }

        merged.ports = ports.into_values().collect();
        debug!(
            container = %self.container.id,
            content = %content.info(),
            attached,
            "merged content"
        );
        Ok(merged)
    }

    async fn upsert(
        &mut self,
        kind: NodeKind,
        uid: &Uid,
        properties: &Properties,
        meta: &Meta,
    ) -> EngineResult<NodeRecord> {
        match self.tx.node(kind, uid).await? {
            Some(mut existing) => {
                existing.properties = properties.clone();
                existing.meta = meta.clone();
                existing.updated_at = Utc::now();
                self.tx.update_node(&existing).await?;
                Ok(existing)
            }
            None => {
                let record = NodeRecord::new(kind, uid.clone(), properties.clone(), meta.clone());
                self.tx.create_node(&record).await?;
                Ok(record)
            }
        }
    }
}
