//! Removal of entities a container no longer declares.
//!
//! Both differences (nodes and edges) come from a single snapshot taken
//! before anything is deleted. Entities still owned by a container other
//! than the target are disowned instead of deleted; roots that mirror the
//! target fragment do not count as other owners. An edge the container
//! stops seeing only because it drops such shared vertices stays in place.
//! Vertices that remain lose the port links the new content leaves out.

use crate::error::EngineResult;
use std::collections::{BTreeMap, BTreeSet};
use supergraph_store::GraphTransaction;
use supergraph_types::{ContainerId, ContainerKind, ContainerRecord, Content, EdgeKey, NodeKind, Uid};
use tracing::{debug, trace};

/// What a deprecation pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deprecation {
    pub deleted_vertices: Vec<Uid>,
    pub deleted_ports: Vec<Uid>,
    pub deleted_groups: Vec<Uid>,
    pub deleted_edges: Vec<EdgeKey>,
    /// Shared entities only unlinked from the container.
    pub disowned: Vec<(NodeKind, Uid)>,
    /// (vertex, port) links dropped from vertices that stay.
    pub detached_ports: Vec<(Uid, Uid)>,
    /// Stale edges left in place because another container still shows them.
    pub kept_edges: Vec<EdgeKey>,
}

impl Deprecation {
    pub fn is_empty(&self) -> bool {
        self.deleted_vertices.is_empty()
            && self.deleted_ports.is_empty()
            && self.deleted_groups.is_empty()
            && self.deleted_edges.is_empty()
            && self.disowned.is_empty()
            && self.detached_ports.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "deleted {} vertices, {} ports, {} edges, {} groups; disowned {}; detached {} ports; kept {} shared edges",
            self.deleted_vertices.len(),
            self.deleted_ports.len(),
            self.deleted_edges.len(),
            self.deleted_groups.len(),
            self.disowned.len(),
            self.detached_ports.len(),
            self.kept_edges.len()
        )
    }
}

/// Pre-deletion view of a container.
struct Snapshot {
    /// vertex -> its ports
    vertices: BTreeMap<Uid, BTreeSet<Uid>>,
    ports: BTreeSet<Uid>,
    groups: BTreeSet<Uid>,
    edges: BTreeSet<EdgeKey>,
}

/// Deletes what a container owns but new content leaves out.
pub struct Deprecator<'a> {
    tx: &'a mut dyn GraphTransaction,
    container: &'a ContainerRecord,
}

impl<'a> Deprecator<'a> {
    pub fn new(tx: &'a mut dyn GraphTransaction, container: &'a ContainerRecord) -> Self {
        Self { tx, container }
    }

    pub async fn delete_difference(&mut self, content: &Content) -> EngineResult<Deprecation> {
        let old = self.snapshot().await?;
        let mirrors = self.mirrors().await?;

        let new_vertices: BTreeMap<&Uid, &BTreeSet<Uid>> = content
            .vertices
            .iter()
            .map(|v| (&v.uid, &v.ports))
            .collect();
        let new_ports: BTreeSet<&Uid> = content.ports.iter().map(|p| &p.uid).collect();
        let new_groups: BTreeSet<&Uid> = content.groups.iter().map(|g| &g.uid).collect();
        let new_edges = content.edge_keys();

        // Vertices some other container still holds, and the ports they keep.
        let mut shared_vertices: BTreeSet<&Uid> = BTreeSet::new();
        let mut held_ports: BTreeSet<&Uid> = BTreeSet::new();
        for (uid, ports) in &old.vertices {
            if !self.shared(NodeKind::Vertex, uid, &mirrors).await? {
                continue;
            }
            shared_vertices.insert(uid);
            match new_vertices.get(uid) {
                Some(wanted) => held_ports.extend(wanted.iter()),
                None => held_ports.extend(ports.iter()),
            }
        }

        let mut report = Deprecation::default();
        let mut handled_ports: BTreeSet<&Uid> = BTreeSet::new();

        for (uid, ports) in &old.vertices {
            if let Some(wanted) = new_vertices.get(uid) {
                for port in ports.iter().filter(|p| !wanted.contains(*p)) {
                    if self.tx.detach_port(uid, port).await? {
                        report.detached_ports.push((uid.clone(), port.clone()));
                    }
                }
                continue;
            }
            if shared_vertices.contains(uid) {
                self.tx.disown(self.container.id, NodeKind::Vertex, uid).await?;
                report.disowned.push((NodeKind::Vertex, uid.clone()));
                continue;
            }
            for port in ports {
                handled_ports.insert(port);
                if new_ports.contains(port) || held_ports.contains(port) {
                    continue;
                }
                if self.tx.delete_node(NodeKind::Port, port).await? {
                    report.deleted_ports.push(port.clone());
                }
            }
            self.tx.delete_node(NodeKind::Vertex, uid).await?;
            report.deleted_vertices.push(uid.clone());
        }

        for port in old.ports.iter().filter(|p| !new_ports.contains(p)) {
            if handled_ports.contains(port) || held_ports.contains(port) {
                continue;
            }
            if self.tx.delete_node(NodeKind::Port, port).await? {
                report.deleted_ports.push(port.clone());
            }
        }

        for uid in old.groups.iter().filter(|uid| !new_groups.contains(uid)) {
            if self.shared(NodeKind::Group, uid, &mirrors).await? {
                self.tx.disown(self.container.id, NodeKind::Group, uid).await?;
                report.disowned.push((NodeKind::Group, uid.clone()));
            } else {
                self.tx.delete_node(NodeKind::Group, uid).await?;
                report.deleted_groups.push(uid.clone());
            }
        }

        for key in old.edges.difference(&new_edges) {
            // An edge the container merely stops seeing, between ports another
            // container holds, belongs to that container's view.
            let dropped_by_edit = new_ports.contains(&key.start) && new_ports.contains(&key.end);
            if !dropped_by_edit && held_ports.contains(&key.start) && held_ports.contains(&key.end)
            {
                report.kept_edges.push(key.clone());
                continue;
            }
            // May already be gone with one of its ports.
            self.tx.delete_edge(key).await?;
            report.deleted_edges.push(key.clone());
        }

        debug!(
            container = %self.container.id,
            summary = %report.summary(),
            "deprecated stale content"
        );
        Ok(report)
    }

    async fn snapshot(&mut self) -> EngineResult<Snapshot> {
        let mut vertices = BTreeMap::new();
        let mut ports = BTreeSet::new();
        for vertex in self.tx.owned(self.container.id, NodeKind::Vertex).await? {
            let vertex_ports: BTreeSet<Uid> = self
                .tx
                .ports_of(&vertex.uid)
                .await?
                .into_iter()
                .map(|p| p.uid)
                .collect();
            ports.extend(vertex_ports.iter().cloned());
            vertices.insert(vertex.uid, vertex_ports);
        }
        let groups = self
            .tx
            .owned(self.container.id, NodeKind::Group)
            .await?
            .into_iter()
            .map(|g| g.uid)
            .collect();
        let edges = self
            .tx
            .edges_among(&ports)
            .await?
            .into_iter()
            .map(|e| e.key)
            .collect();
        Ok(Snapshot {
            vertices,
            ports,
            groups,
            edges,
        })
    }

    /// Roots that hold the target fragment and mirror its content.
    async fn mirrors(&mut self) -> EngineResult<BTreeSet<ContainerId>> {
        if self.container.kind != ContainerKind::Fragment {
            return Ok(BTreeSet::new());
        }
        Ok(self.tx.roots_of(self.container.id).await?.into_iter().collect())
    }

    async fn shared(
        &mut self,
        kind: NodeKind,
        uid: &Uid,
        mirrors: &BTreeSet<ContainerId>,
    ) -> EngineResult<bool> {
        let owners = self.tx.owners(kind, uid).await?;
        let shared = owners
            .iter()
            .any(|owner| *owner != self.container.id && !mirrors.contains(owner));
        if shared {
            trace!(container = %self.container.id, %kind, %uid, ?owners, "entity is shared");
        }
        Ok(shared)
    }
}
