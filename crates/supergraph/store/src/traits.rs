use crate::model::{EdgeRecord, GraphStats, NodeRecord, StoreId};
use crate::StorageResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use supergraph_types::{ContainerId, ContainerKind, ContainerRecord, EdgeKey, NodeKind, Uid};

/// A logical property-graph store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Identity shared by every handle onto the same underlying data.
    fn store_id(&self) -> StoreId;

    /// Create tables, indexes and constraints. Safe to run repeatedly.
    async fn install_schema(&self) -> StorageResult<()>;

    /// Open a transaction. Work done through it is invisible to others until
    /// [`GraphTransaction::commit`]; dropping it without commit discards it.
    async fn begin(&self) -> StorageResult<Box<dyn GraphTransaction>>;
}

/// Operations scoped to one store transaction.
#[async_trait]
pub trait GraphTransaction: Send {
    // Containers

    /// Insert a new container. `Conflict` if the id is taken.
    async fn insert_container(&mut self, record: &ContainerRecord) -> StorageResult<()>;

    async fn container(&mut self, id: ContainerId) -> StorageResult<Option<ContainerRecord>>;

    /// All containers, optionally of one kind, ordered by creation time.
    async fn containers(&mut self, kind: Option<ContainerKind>)
        -> StorageResult<Vec<ContainerRecord>>;

    async fn rename_container(
        &mut self,
        id: ContainerId,
        name: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<()>;

    async fn touch_container(&mut self, id: ContainerId, at: DateTime<Utc>) -> StorageResult<()>;

    /// Remove the container node together with its ownership and fragment
    /// links. Content nodes are left alone.
    async fn delete_container(&mut self, id: ContainerId) -> StorageResult<bool>;

    async fn link_fragment(&mut self, root: ContainerId, fragment: ContainerId)
        -> StorageResult<bool>;

    async fn fragments(&mut self, root: ContainerId) -> StorageResult<Vec<ContainerId>>;

    async fn roots_of(&mut self, fragment: ContainerId) -> StorageResult<Vec<ContainerId>>;

    // Nodes

    async fn node(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<Option<NodeRecord>>;

    /// `Conflict` if a node of the same kind and uid exists.
    async fn create_node(&mut self, record: &NodeRecord) -> StorageResult<()>;

    /// Overwrite properties and meta. `NotFound` if absent.
    async fn update_node(&mut self, record: &NodeRecord) -> StorageResult<()>;

    /// Detach-delete: every relationship touching the node goes with it.
    async fn delete_node(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<bool>;

    // Ownership

    async fn owned(&mut self, container: ContainerId, kind: NodeKind)
        -> StorageResult<Vec<NodeRecord>>;

    async fn owners(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<Vec<ContainerId>>;

    /// Link a node to a container. Returns `false` if it was already linked.
    async fn own(&mut self, container: ContainerId, kind: NodeKind, uid: &Uid)
        -> StorageResult<bool>;

    async fn disown(&mut self, container: ContainerId, kind: NodeKind, uid: &Uid)
        -> StorageResult<bool>;

    // Vertex ports

    async fn ports_of(&mut self, vertex: &Uid) -> StorageResult<Vec<NodeRecord>>;

    async fn attach_port(&mut self, vertex: &Uid, port: &Uid) -> StorageResult<bool>;

    /// Drop a vertex→port link, leaving both nodes. Returns `false` if there
    /// was no such link.
    async fn detach_port(&mut self, vertex: &Uid, port: &Uid) -> StorageResult<bool>;

    // Edges

    /// Edges whose both endpoints are in `ports`.
    async fn edges_among(&mut self, ports: &BTreeSet<Uid>) -> StorageResult<Vec<EdgeRecord>>;

    async fn edge(&mut self, key: &EdgeKey) -> StorageResult<Option<EdgeRecord>>;

    async fn create_edge(&mut self, record: &EdgeRecord) -> StorageResult<()>;

    async fn update_edge(&mut self, record: &EdgeRecord) -> StorageResult<()>;

    async fn delete_edge(&mut self, key: &EdgeKey) -> StorageResult<bool>;

    async fn stats(&mut self) -> StorageResult<GraphStats>;

    async fn commit(self: Box<Self>) -> StorageResult<()>;

    async fn rollback(self: Box<Self>) -> StorageResult<()>;
}
