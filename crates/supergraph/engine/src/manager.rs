//! Transactional entry point of the engine.

use crate::config::EngineConfig;
use crate::container::{ensure_kind, fetch, Container};
use crate::deprecator::{Deprecation, Deprecator};
use crate::error::{EngineError, EngineResult};
use crate::lifecycle::Containers;
use crate::merger::Merger;
use crate::reader::Reader;
use chrono::Utc;
use std::sync::Arc;
use supergraph_store::{
    open_store, GraphStats, GraphStore, GraphTransaction, InMemoryGraphStore, StoreId,
};
use supergraph_types::{ContainerId, ContainerKind, ContainerRecord, Content, NodeKind};
use tracing::{debug, info, instrument, warn};

/// Composes the reader, deprecator and merger into atomic operations.
///
/// Every public operation runs in exactly one store transaction. On error
/// the transaction is rolled back before the error is returned.
pub struct Manager {
    store: Arc<dyn GraphStore>,
    config: EngineConfig,
}

impl Manager {
    pub fn new(store: Arc<dyn GraphStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Manager over a fresh in-memory store with default configuration.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryGraphStore::new()), EngineConfig::default())
    }

    /// Open the storage backend named in `config`.
    pub async fn open(config: EngineConfig) -> EngineResult<Self> {
        let store = open_store(&config.storage).await?;
        info!(
            backend = config.storage.label(),
            store = %store.store_id(),
            "engine ready"
        );
        Ok(Self::new(store, config))
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    pub fn store_id(&self) -> StoreId {
        self.store.store_id()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Container lifecycle: creation, lookup, rename, deletion.
    pub fn containers(&self) -> Containers<'_> {
        Containers::new(self)
    }

    /// Current content of a container.
    #[instrument(skip(self, container), fields(container = %container.id()))]
    pub async fn read(&self, container: &Container) -> EngineResult<Content> {
        container.check_binding(self.store_id())?;
        let mut tx = self.store.begin().await?;
        let result = read_in(tx.as_mut(), container.id()).await;
        finish(tx, result).await
    }

    /// Make the container's content equal to `content`.
    ///
    /// Integrity is checked before a transaction is opened, so invalid
    /// content never reaches the store.
    #[instrument(skip(self, container, content), fields(container = %container.id(), content = %content.info()))]
    pub async fn replace(&self, container: &Container, content: Content) -> EngineResult<()> {
        container.check_binding(self.store_id())?;
        content.check_references()?;
        let mut tx = self.store.begin().await?;
        let result = replace_in(tx.as_mut(), container.id(), &content).await;
        finish(tx, result.map(|_| ())).await?;
        info!("container content replaced");
        Ok(())
    }

    /// Link everything `child` owns to `parent` as well.
    #[instrument(skip(self, parent, child), fields(parent = %parent.id(), child = %child.id()))]
    pub async fn reconnect(&self, parent: &Container, child: &Container) -> EngineResult<()> {
        parent.check_binding(self.store_id())?;
        child.check_binding(self.store_id())?;
        let mut tx = self.store.begin().await?;
        let result = reconnect_in(tx.as_mut(), parent.id(), child.id()).await;
        finish(tx, result.map(|_| ())).await
    }

    /// Replace a fragment's content and reconnect its root in one transaction.
    #[instrument(
        skip(self, root, fragment, content),
        fields(root = %root.id(), fragment = %fragment.id(), content = %content.info())
    )]
    pub async fn replace_and_reconnect(
        &self,
        root: &Container,
        fragment: &Container,
        content: Content,
    ) -> EngineResult<()> {
        root.check_binding(self.store_id())?;
        fragment.check_binding(self.store_id())?;
        root.expect_kind(ContainerKind::Root)?;
        fragment.expect_kind(ContainerKind::Fragment)?;
        content.check_references()?;

        let mut tx = self.store.begin().await?;
        let result = async {
            let tx = tx.as_mut();
            ensure_member(tx, root.id(), fragment.id()).await?;
            replace_in(tx, fragment.id(), &content).await?;
            reconnect_in(tx, root.id(), fragment.id()).await?;
            Ok::<(), EngineError>(())
        }
        .await;
        finish(tx, result).await?;
        info!("fragment content replaced and root reconnected");
        Ok(())
    }

    /// Delete all content of a container; with `cascade` delete the
    /// container itself too. Clearing a root also deletes its fragments.
    #[instrument(skip(self, container), fields(container = %container.id()))]
    pub async fn clear(&self, container: &Container, cascade: bool) -> EngineResult<()> {
        container.check_binding(self.store_id())?;
        let mut tx = self.store.begin().await?;
        let result = async {
            let tx = tx.as_mut();
            let record = fetch(tx, container.id()).await?;
            if record.is_root() {
                drop_fragments(tx, record.id).await?;
            }
            clear_owned(tx, &record).await?;
            if cascade {
                tx.delete_container(record.id).await?;
            } else {
                tx.touch_container(record.id, Utc::now()).await?;
            }
            Ok::<(), EngineError>(())
        }
        .await;
        finish(tx, result).await?;
        info!(cascade, "container cleared");
        Ok(())
    }

    /// Delete the container's own content, keeping the container and, for a
    /// root, its fragments.
    #[instrument(skip(self, container), fields(container = %container.id()))]
    pub async fn clear_content(&self, container: &Container) -> EngineResult<()> {
        container.check_binding(self.store_id())?;
        let mut tx = self.store.begin().await?;
        let result = async {
            let tx = tx.as_mut();
            let record = fetch(tx, container.id()).await?;
            clear_owned(tx, &record).await?;
            tx.touch_container(record.id, Utc::now()).await?;
            Ok::<(), EngineError>(())
        }
        .await;
        finish(tx, result).await
    }

    /// Node and relationship counts of the whole store.
    pub async fn stats(&self) -> EngineResult<GraphStats> {
        let mut tx = self.store.begin().await?;
        let result = tx.stats().await.map_err(EngineError::from);
        finish(tx, result).await
    }
}

/// Commit on success, roll back on failure. A failed rollback is logged and
/// the triggering error is returned.
pub(crate) async fn finish<T>(
    tx: Box<dyn GraphTransaction>,
    result: EngineResult<T>,
) -> EngineResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            debug!(error = %err, "rolling back transaction");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

pub(crate) async fn read_in(tx: &mut dyn GraphTransaction, id: ContainerId) -> EngineResult<Content> {
    fetch(tx, id).await?;
    Reader::new(tx).read(id).await
}

pub(crate) async fn replace_in(
    tx: &mut dyn GraphTransaction,
    id: ContainerId,
    content: &Content,
) -> EngineResult<Deprecation> {
    let record = fetch(tx, id).await?;
    let deprecation = Deprecator::new(tx, &record).delete_difference(content).await?;
    Merger::new(tx, &record).merge(content).await?;
    tx.touch_container(id, Utc::now()).await?;
    Ok(deprecation)
}

pub(crate) async fn reconnect_in(
    tx: &mut dyn GraphTransaction,
    parent: ContainerId,
    child: ContainerId,
) -> EngineResult<usize> {
    fetch(tx, parent).await?;
    fetch(tx, child).await?;
    if parent == child {
        return Ok(0);
    }
    let mut linked = 0;
    for kind in [NodeKind::Vertex, NodeKind::Group] {
        for record in tx.owned(child, kind).await? {
            if tx.own(parent, kind, &record.uid).await? {
                linked += 1;
            }
        }
    }
    debug!(%parent, %child, linked, "reconnected container");
    Ok(linked)
}

pub(crate) async fn ensure_member(
    tx: &mut dyn GraphTransaction,
    root: ContainerId,
    fragment: ContainerId,
) -> EngineResult<()> {
    let root_record = fetch(tx, root).await?;
    ensure_kind(&root_record, ContainerKind::Root)?;
    fetch(tx, fragment).await?;
    if tx.fragments(root).await?.contains(&fragment) {
        Ok(())
    } else {
        Err(EngineError::FragmentNotInRoot { root, fragment })
    }
}

/// Delete the container's content, sparing entities other containers own.
pub(crate) async fn clear_owned(
    tx: &mut dyn GraphTransaction,
    record: &ContainerRecord,
) -> EngineResult<Deprecation> {
    Deprecator::new(tx, record)
        .delete_difference(&Content::empty())
        .await
}

/// Clear and delete every fragment of a root.
pub(crate) async fn drop_fragments(
    tx: &mut dyn GraphTransaction,
    root: ContainerId,
) -> EngineResult<usize> {
    let fragments = tx.fragments(root).await?;
    for id in &fragments {
        let fragment = fetch(tx, *id).await?;
        clear_owned(tx, &fragment).await?;
        tx.delete_container(*id).await?;
    }
    if !fragments.is_empty() {
        debug!(%root, count = fragments.len(), "deleted root fragments");
    }
    Ok(fragments.len())
}
