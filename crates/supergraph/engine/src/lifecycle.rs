//! Creation, lookup and deletion of roots and fragments.

use crate::container::{ensure_kind, fetch, Container};
use crate::error::{EngineError, EngineResult};
use crate::manager::{clear_owned, drop_fragments, ensure_member, finish, Manager};
use chrono::Utc;
use supergraph_store::{GraphTransaction, StorageError};
use supergraph_types::{ContainerId, ContainerKind, ContainerRecord};
use tracing::{info, instrument};

/// Container lifecycle operations, reached through [`Manager::containers`].
pub struct Containers<'m> {
    manager: &'m Manager,
}

impl<'m> Containers<'m> {
    pub(crate) fn new(manager: &'m Manager) -> Self {
        Self { manager }
    }

    fn bind(&self, record: ContainerRecord) -> Container {
        Container::bound(record, self.manager.store_id())
    }

    fn validate_name(&self, name: &str) -> EngineResult<()> {
        let max = self.manager.config().schema.max_name_length;
        if name.trim().is_empty() {
            return Err(EngineError::InvalidName("name must not be blank".to_string()));
        }
        let length = name.chars().count();
        if length > max {
            return Err(EngineError::InvalidName(format!(
                "name has {length} characters, at most {max} allowed"
            )));
        }
        Ok(())
    }

    async fn create(&self, name: &str, kind: ContainerKind) -> EngineResult<Container> {
        self.validate_name(name)?;
        let record = ContainerRecord::new(name, kind);
        let mut tx = self.manager.store().begin().await?;
        let result = tx.insert_container(&record).await.map_err(EngineError::from);
        finish(tx, result).await?;
        info!(container = %record.id, %kind, name, "container created");
        Ok(self.bind(record))
    }

    pub async fn create_root(&self, name: &str) -> EngineResult<Container> {
        self.create(name, ContainerKind::Root).await
    }

    /// A fragment not yet attached to any root.
    pub async fn create_fragment(&self, name: &str) -> EngineResult<Container> {
        self.create(name, ContainerKind::Fragment).await
    }

    /// Create a fragment and attach it to `root` in one transaction.
    #[instrument(skip(self, root), fields(root = %root.id()))]
    pub async fn create_fragment_in(&self, root: &Container, name: &str) -> EngineResult<Container> {
        root.check_binding(self.manager.store_id())?;
        root.expect_kind(ContainerKind::Root)?;
        self.validate_name(name)?;

        let record = ContainerRecord::new(name, ContainerKind::Fragment);
        let mut tx = self.manager.store().begin().await?;
        let result = async {
            let tx = tx.as_mut();
            let root_record = fetch(tx, root.id()).await?;
            ensure_kind(&root_record, ContainerKind::Root)?;
            tx.insert_container(&record).await?;
            tx.link_fragment(root.id(), record.id).await?;
            Ok::<(), EngineError>(())
        }
        .await;
        finish(tx, result).await?;
        info!(fragment = %record.id, "fragment created");
        Ok(self.bind(record))
    }

    pub async fn get(&self, id: ContainerId) -> EngineResult<Container> {
        let mut tx = self.manager.store().begin().await?;
        let result = fetch(tx.as_mut(), id).await;
        let record = finish(tx, result).await?;
        Ok(self.bind(record))
    }

    pub async fn get_root(&self, id: ContainerId) -> EngineResult<Container> {
        let container = self.get(id).await?;
        container.expect_kind(ContainerKind::Root)?;
        Ok(container)
    }

    pub async fn get_fragment(&self, id: ContainerId) -> EngineResult<Container> {
        let container = self.get(id).await?;
        container.expect_kind(ContainerKind::Fragment)?;
        Ok(container)
    }

    /// All containers, optionally of one kind, oldest first.
    pub async fn list(&self, kind: Option<ContainerKind>) -> EngineResult<Vec<Container>> {
        let mut tx = self.manager.store().begin().await?;
        let result = tx.containers(kind).await.map_err(EngineError::from);
        let records = finish(tx, result).await?;
        Ok(records.into_iter().map(|r| self.bind(r)).collect())
    }

    /// Fragments attached to a root.
    pub async fn fragments(&self, root: &Container) -> EngineResult<Vec<Container>> {
        root.check_binding(self.manager.store_id())?;
        root.expect_kind(ContainerKind::Root)?;
        let mut tx = self.manager.store().begin().await?;
        let result = async {
            let tx = tx.as_mut();
            fetch(tx, root.id()).await?;
            let mut records = Vec::new();
            for id in tx.fragments(root.id()).await? {
                records.push(fetch(tx, id).await?);
            }
            Ok::<_, EngineError>(records)
        }
        .await;
        let records = finish(tx, result).await?;
        Ok(records.into_iter().map(|r| self.bind(r)).collect())
    }

    /// Look up a fragment through the root it must belong to.
    pub async fn fragment_of(&self, root: &Container, fragment: ContainerId) -> EngineResult<Container> {
        root.check_binding(self.manager.store_id())?;
        root.expect_kind(ContainerKind::Root)?;
        let mut tx = self.manager.store().begin().await?;
        let result = async {
            let tx = tx.as_mut();
            ensure_member(tx, root.id(), fragment).await?;
            fetch(tx, fragment).await
        }
        .await;
        let record = finish(tx, result).await?;
        Ok(self.bind(record))
    }

    pub async fn rename(&self, container: &Container, name: &str) -> EngineResult<Container> {
        container.check_binding(self.manager.store_id())?;
        self.validate_name(name)?;
        let mut tx = self.manager.store().begin().await?;
        let result = async {
            let tx = tx.as_mut();
            tx.rename_container(container.id(), name, Utc::now()).await?;
            fetch(tx, container.id()).await
        }
        .await;
        let record = finish(tx, result).await?;
        Ok(self.bind(record))
    }

    /// Attach an existing fragment to a root. A fragment belongs to at most
    /// one root.
    #[instrument(skip(self, root, fragment), fields(root = %root.id(), fragment = %fragment.id()))]
    pub async fn attach_fragment(&self, root: &Container, fragment: &Container) -> EngineResult<()> {
        root.check_binding(self.manager.store_id())?;
        fragment.check_binding(self.manager.store_id())?;
        root.expect_kind(ContainerKind::Root)?;
        fragment.expect_kind(ContainerKind::Fragment)?;

        let mut tx = self.manager.store().begin().await?;
        let result = async {
            let tx = tx.as_mut();
            fetch(tx, root.id()).await?;
            fetch(tx, fragment.id()).await?;
            let holders = tx.roots_of(fragment.id()).await?;
            if let Some(other) = holders.iter().find(|r| **r != root.id()) {
                return Err(EngineError::Storage(StorageError::Conflict(format!(
                    "fragment {} already belongs to root {other}",
                    fragment.id()
                ))));
            }
            tx.link_fragment(root.id(), fragment.id()).await?;
            Ok::<(), EngineError>(())
        }
        .await;
        finish(tx, result).await
    }

    /// Delete a container.
    ///
    /// With `cascade` its owned content is deleted first; without it only
    /// the ownership links go and the content nodes survive. A root always
    /// takes its fragments, and their content, with it.
    #[instrument(skip(self, container), fields(container = %container.id()))]
    pub async fn delete(&self, container: &Container, cascade: bool) -> EngineResult<()> {
        container.check_binding(self.manager.store_id())?;
        let mut tx = self.manager.store().begin().await?;
        let result = delete_in(tx.as_mut(), container.id(), cascade).await;
        finish(tx, result).await?;
        info!(cascade, "container deleted");
        Ok(())
    }

    /// Create the default root unless it already exists.
    pub async fn ensure_default_root(&self) -> EngineResult<Container> {
        let schema = &self.manager.config().schema;
        self.validate_name(&schema.default_root_name)?;
        let id = schema.default_root_uid;

        let mut tx = self.manager.store().begin().await?;
        let result = async {
            let tx = tx.as_mut();
            if let Some(existing) = tx.container(id).await? {
                ensure_kind(&existing, ContainerKind::Root)?;
                return Ok::<_, EngineError>((existing, false));
            }
            let record = ContainerRecord::with_id(id, &schema.default_root_name, ContainerKind::Root);
            tx.insert_container(&record).await?;
            Ok((record, true))
        }
        .await;
        let (record, created) = finish(tx, result).await?;
        if created {
            info!(root = %record.id, "default root created");
        }
        Ok(self.bind(record))
    }
}

async fn delete_in(
    tx: &mut dyn GraphTransaction,
    id: ContainerId,
    cascade: bool,
) -> EngineResult<()> {
    let record = fetch(tx, id).await?;
    if record.is_root() {
        drop_fragments(tx, id).await?;
    }
    if cascade {
        clear_owned(tx, &record).await?;
    }
    tx.delete_container(id).await?;
    Ok(())
}
