//! In-memory reference implementation of the graph store.
//!
//! Deterministic and test-friendly. A transaction holds the store lock for
//! its whole lifetime and works on a private copy of the graph, so writers
//! are serialized and a transaction is applied all at once or not at all.

use crate::model::{EdgeRecord, GraphStats, NodeRecord, StoreId};
use crate::traits::{GraphStore, GraphTransaction};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use supergraph_types::{ContainerId, ContainerKind, ContainerRecord, EdgeKey, NodeKind, Uid};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

#[derive(Debug, Clone, Default)]
struct GraphState {
    containers: BTreeMap<ContainerId, ContainerRecord>,
    /// (root, fragment)
    fragments: BTreeSet<(ContainerId, ContainerId)>,
    nodes: BTreeMap<(NodeKind, Uid), NodeRecord>,
    ownership: BTreeSet<(ContainerId, NodeKind, Uid)>,
    /// (vertex, port)
    port_links: BTreeSet<(Uid, Uid)>,
    edges: BTreeMap<EdgeKey, EdgeRecord>,
}

impl GraphState {
    fn require_container(&self, id: ContainerId) -> StorageResult<()> {
        if self.containers.contains_key(&id) {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!("container {id} not found")))
        }
    }

    fn require_node(&self, kind: NodeKind, uid: &Uid) -> StorageResult<()> {
        if self.nodes.contains_key(&(kind, uid.clone())) {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!("{kind} {uid} not found")))
        }
    }
}

/// In-memory graph store.
#[derive(Clone)]
pub struct InMemoryGraphStore {
    id: StoreId,
    state: Arc<Mutex<GraphState>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            id: StoreId::generate(),
            state: Arc::new(Mutex::new(GraphState::default())),
        }
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    fn store_id(&self) -> StoreId {
        self.id
    }

    async fn install_schema(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn begin(&self) -> StorageResult<Box<dyn GraphTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        trace!(store = %self.id, "memory transaction opened");
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }
}

/// Transaction over an [`InMemoryGraphStore`].
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<GraphState>,
    working: GraphState,
}

#[async_trait]
impl GraphTransaction for InMemoryTransaction {
    async fn insert_container(&mut self, record: &ContainerRecord) -> StorageResult<()> {
        if self.working.containers.contains_key(&record.id) {
            return Err(StorageError::Conflict(format!(
                "container {} already exists",
                record.id
            )));
        }
        self.working.containers.insert(record.id, record.clone());
        Ok(())
    }

    async fn container(&mut self, id: ContainerId) -> StorageResult<Option<ContainerRecord>> {
        Ok(self.working.containers.get(&id).cloned())
    }

    async fn containers(
        &mut self,
        kind: Option<ContainerKind>,
    ) -> StorageResult<Vec<ContainerRecord>> {
        let mut values = self
            .working
            .containers
            .values()
            .filter(|c| kind.map_or(true, |k| c.kind == k))
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(values)
    }

    async fn rename_container(
        &mut self,
        id: ContainerId,
        name: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let record = self
            .working
            .containers
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("container {id} not found")))?;
        record.name = name.to_string();
        record.updated_at = at;
        Ok(())
    }

    async fn touch_container(&mut self, id: ContainerId, at: DateTime<Utc>) -> StorageResult<()> {
        let record = self
            .working
            .containers
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("container {id} not found")))?;
        record.updated_at = at;
        Ok(())
    }

    async fn delete_container(&mut self, id: ContainerId) -> StorageResult<bool> {
        if self.working.containers.remove(&id).is_none() {
            return Ok(false);
        }
        self.working
            .fragments
            .retain(|(root, fragment)| *root != id && *fragment != id);
        self.working.ownership.retain(|(owner, _, _)| *owner != id);
        Ok(true)
    }

    async fn link_fragment(
        &mut self,
        root: ContainerId,
        fragment: ContainerId,
    ) -> StorageResult<bool> {
        self.working.require_container(root)?;
        self.working.require_container(fragment)?;
        Ok(self.working.fragments.insert((root, fragment)))
    }

    async fn fragments(&mut self, root: ContainerId) -> StorageResult<Vec<ContainerId>> {
        Ok(self
            .working
            .fragments
            .iter()
            .filter(|(r, _)| *r == root)
            .map(|(_, f)| *f)
            .collect())
    }

    async fn roots_of(&mut self, fragment: ContainerId) -> StorageResult<Vec<ContainerId>> {
        Ok(self
            .working
            .fragments
            .iter()
            .filter(|(_, f)| *f == fragment)
            .map(|(r, _)| *r)
            .collect())
    }

    async fn node(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<Option<NodeRecord>> {
        Ok(self.working.nodes.get(&(kind, uid.clone())).cloned())
    }

    async fn create_node(&mut self, record: &NodeRecord) -> StorageResult<()> {
        let key = (record.kind, record.uid.clone());
        if self.working.nodes.contains_key(&key) {
            return Err(StorageError::Conflict(format!(
                "{} {} already exists",
                record.kind, record.uid
            )));
        }
        self.working.nodes.insert(key, record.clone());
        Ok(())
    }

    async fn update_node(&mut self, record: &NodeRecord) -> StorageResult<()> {
        let stored = self
            .working
            .nodes
            .get_mut(&(record.kind, record.uid.clone()))
            .ok_or_else(|| {
                StorageError::NotFound(format!("{} {} not found", record.kind, record.uid))
            })?;
        stored.properties = record.properties.clone();
        stored.meta = record.meta.clone();
        stored.updated_at = record.updated_at;
        Ok(())
    }

    async fn delete_node(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<bool> {
        if self.working.nodes.remove(&(kind, uid.clone())).is_none() {
            return Ok(false);
        }
        self.working
            .ownership
            .retain(|(_, k, u)| !(*k == kind && u == uid));
        match kind {
            NodeKind::Vertex => self.working.port_links.retain(|(v, _)| v != uid),
            NodeKind::Port => {
                self.working.port_links.retain(|(_, p)| p != uid);
                self.working
                    .edges
                    .retain(|key, _| &key.start != uid && &key.end != uid);
            }
            NodeKind::Group => {}
        }
        Ok(true)
    }

    async fn owned(
        &mut self,
        container: ContainerId,
        kind: NodeKind,
    ) -> StorageResult<Vec<NodeRecord>> {
        let state = &self.working;
        Ok(state
            .ownership
            .iter()
            .filter(|(c, k, _)| *c == container && *k == kind)
            .filter_map(|(_, k, uid)| state.nodes.get(&(*k, uid.clone())).cloned())
            .collect())
    }

    async fn owners(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<Vec<ContainerId>> {
        Ok(self
            .working
            .ownership
            .iter()
            .filter(|(_, k, u)| *k == kind && u == uid)
            .map(|(c, _, _)| *c)
            .collect())
    }

    async fn own(
        &mut self,
        container: ContainerId,
        kind: NodeKind,
        uid: &Uid,
    ) -> StorageResult<bool> {
        self.working.require_container(container)?;
        self.working.require_node(kind, uid)?;
        Ok(self.working.ownership.insert((container, kind, uid.clone())))
    }

    async fn disown(
        &mut self,
        container: ContainerId,
        kind: NodeKind,
        uid: &Uid,
    ) -> StorageResult<bool> {
        Ok(self
            .working
            .ownership
            .remove(&(container, kind, uid.clone())))
    }

    async fn ports_of(&mut self, vertex: &Uid) -> StorageResult<Vec<NodeRecord>> {
        let state = &self.working;
        Ok(state
            .port_links
            .iter()
            .filter(|(v, _)| v == vertex)
            .filter_map(|(_, port)| state.nodes.get(&(NodeKind::Port, port.clone())).cloned())
            .collect())
    }

    async fn attach_port(&mut self, vertex: &Uid, port: &Uid) -> StorageResult<bool> {
        self.working.require_node(NodeKind::Vertex, vertex)?;
        self.working.require_node(NodeKind::Port, port)?;
        Ok(self
            .working
            .port_links
            .insert((vertex.clone(), port.clone())))
    }

    async fn detach_port(&mut self, vertex: &Uid, port: &Uid) -> StorageResult<bool> {
        Ok(self
            .working
            .port_links
            .remove(&(vertex.clone(), port.clone())))
    }

    async fn edges_among(&mut self, ports: &BTreeSet<Uid>) -> StorageResult<Vec<EdgeRecord>> {
        Ok(self
            .working
            .edges
            .values()
            .filter(|e| ports.contains(&e.key.start) && ports.contains(&e.key.end))
            .cloned()
            .collect())
    }

    async fn edge(&mut self, key: &EdgeKey) -> StorageResult<Option<EdgeRecord>> {
        Ok(self.working.edges.get(key).cloned())
    }

    async fn create_edge(&mut self, record: &EdgeRecord) -> StorageResult<()> {
        self.working.require_node(NodeKind::Port, &record.key.start)?;
        self.working.require_node(NodeKind::Port, &record.key.end)?;
        if self.working.edges.contains_key(&record.key) {
            return Err(StorageError::Conflict(format!(
                "edge {} already exists",
                record.key
            )));
        }
        self.working.edges.insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn update_edge(&mut self, record: &EdgeRecord) -> StorageResult<()> {
        let stored = self
            .working
            .edges
            .get_mut(&record.key)
            .ok_or_else(|| StorageError::NotFound(format!("edge {} not found", record.key)))?;
        stored.meta = record.meta.clone();
        stored.updated_at = record.updated_at;
        Ok(())
    }

    async fn delete_edge(&mut self, key: &EdgeKey) -> StorageResult<bool> {
        Ok(self.working.edges.remove(key).is_some())
    }

    async fn stats(&mut self) -> StorageResult<GraphStats> {
        let state = &self.working;
        let count_nodes =
            |kind: NodeKind| state.nodes.keys().filter(|(k, _)| *k == kind).count() as u64;
        let count_containers = |kind: ContainerKind| {
            state.containers.values().filter(|c| c.kind == kind).count() as u64
        };
        Ok(GraphStats {
            roots: count_containers(ContainerKind::Root),
            fragments: count_containers(ContainerKind::Fragment),
            vertices: count_nodes(NodeKind::Vertex),
            ports: count_nodes(NodeKind::Port),
            groups: count_nodes(NodeKind::Group),
            edges: state.edges.len() as u64,
            fragment_links: state.fragments.len() as u64,
            ownership_links: state.ownership.len() as u64,
            port_links: state.port_links.len() as u64,
        })
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        trace!("memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        trace!("memory transaction rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use supergraph_types::Properties;

    fn node(kind: NodeKind, uid: &str) -> NodeRecord {
        NodeRecord::new(kind, Uid::from(uid), Properties::new(), json!(null))
    }

    #[tokio::test]
    async fn committed_work_is_visible_to_later_transactions() {
        let store = InMemoryGraphStore::new();
        let root = ContainerRecord::new("main", ContainerKind::Root);

        let mut tx = store.begin().await.unwrap();
        tx.insert_container(&root).await.unwrap();
        tx.create_node(&node(NodeKind::Vertex, "n1")).await.unwrap();
        tx.own(root.id, NodeKind::Vertex, &Uid::from("n1")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let owned = tx.owned(root.id, NodeKind::Vertex).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].uid.as_str(), "n1");
    }

    #[tokio::test]
    async fn rollback_and_drop_discard_work() {
        let store = InMemoryGraphStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.create_node(&node(NodeKind::Port, "p1")).await.unwrap();
        tx.rollback().await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.create_node(&node(NodeKind::Port, "p2")).await.unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.stats().await.unwrap(), GraphStats::default());
    }

    #[tokio::test]
    async fn create_conflicts_and_update_requires_existing() {
        let store = InMemoryGraphStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.create_node(&node(NodeKind::Group, "g1")).await.unwrap();
        assert!(matches!(
            tx.create_node(&node(NodeKind::Group, "g1")).await,
            Err(StorageError::Conflict(_))
        ));
        assert!(matches!(
            tx.update_node(&node(NodeKind::Group, "g2")).await,
            Err(StorageError::NotFound(_))
        ));
        // Same uid under another kind is a different node.
        tx.create_node(&node(NodeKind::Vertex, "g1")).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_port_detaches_its_edges_and_links() {
        let store = InMemoryGraphStore::new();
        let mut tx = store.begin().await.unwrap();
        for (kind, uid) in [
            (NodeKind::Vertex, "n1"),
            (NodeKind::Port, "p1"),
            (NodeKind::Port, "p2"),
        ] {
            tx.create_node(&node(kind, uid)).await.unwrap();
        }
        tx.attach_port(&Uid::from("n1"), &Uid::from("p1")).await.unwrap();
        tx.create_edge(&EdgeRecord::new(EdgeKey::new("p1", "p2"), json!(null)))
            .await
            .unwrap();

        assert!(tx.delete_node(NodeKind::Port, &Uid::from("p1")).await.unwrap());

        let stats = tx.stats().await.unwrap();
        assert_eq!(stats.edges, 0);
        assert_eq!(stats.port_links, 0);
        assert_eq!(stats.vertices, 1);
        assert_eq!(stats.ports, 1);
    }

    #[tokio::test]
    async fn detaching_a_port_keeps_both_nodes() {
        let store = InMemoryGraphStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.create_node(&node(NodeKind::Vertex, "n1")).await.unwrap();
        tx.create_node(&node(NodeKind::Port, "p1")).await.unwrap();
        let (vertex, port) = (Uid::from("n1"), Uid::from("p1"));
        tx.attach_port(&vertex, &port).await.unwrap();

        assert!(tx.detach_port(&vertex, &port).await.unwrap());
        assert!(!tx.detach_port(&vertex, &port).await.unwrap());

        assert!(tx.ports_of(&vertex).await.unwrap().is_empty());
        let stats = tx.stats().await.unwrap();
        assert_eq!(stats.port_links, 0);
        assert_eq!(stats.vertices, 1);
        assert_eq!(stats.ports, 1);
    }

    #[tokio::test]
    async fn edges_among_requires_both_endpoints() {
        let store = InMemoryGraphStore::new();
        let mut tx = store.begin().await.unwrap();
        for uid in ["p1", "p2", "p3"] {
            tx.create_node(&node(NodeKind::Port, uid)).await.unwrap();
        }
        tx.create_edge(&EdgeRecord::new(EdgeKey::new("p1", "p2"), json!(null)))
            .await
            .unwrap();
        tx.create_edge(&EdgeRecord::new(EdgeKey::new("p2", "p3"), json!(null)))
            .await
            .unwrap();

        let scope: BTreeSet<Uid> = ["p1", "p2"].into_iter().map(Uid::from).collect();
        let edges = tx.edges_among(&scope).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].key, EdgeKey::new("p1", "p2"));
    }

    #[tokio::test]
    async fn ownership_links_are_idempotent() {
        let store = InMemoryGraphStore::new();
        let root = ContainerRecord::new("main", ContainerKind::Root);
        let uid = Uid::from("n1");
        let mut tx = store.begin().await.unwrap();
        tx.insert_container(&root).await.unwrap();
        tx.create_node(&node(NodeKind::Vertex, "n1")).await.unwrap();

        assert!(tx.own(root.id, NodeKind::Vertex, &uid).await.unwrap());
        assert!(!tx.own(root.id, NodeKind::Vertex, &uid).await.unwrap());
        assert_eq!(tx.owners(NodeKind::Vertex, &uid).await.unwrap(), vec![root.id]);

        assert!(tx.delete_container(root.id).await.unwrap());
        assert!(tx.owners(NodeKind::Vertex, &uid).await.unwrap().is_empty());
        assert!(tx.node(NodeKind::Vertex, &uid).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn links_require_existing_endpoints() {
        let store = InMemoryGraphStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.create_node(&node(NodeKind::Vertex, "n1")).await.unwrap();
        assert!(matches!(
            tx.attach_port(&Uid::from("n1"), &Uid::from("ghost")).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            tx.own(ContainerId::generate(), NodeKind::Vertex, &Uid::from("n1"))
                .await,
            Err(StorageError::NotFound(_))
        ));
    }
}
