use crate::error::{EngineError, EngineResult};
use supergraph_store::{GraphTransaction, StoreId};
use supergraph_types::{ContainerId, ContainerKind, ContainerRecord};

/// Handle to a Root or Fragment.
///
/// Handles produced by the engine remember the store they came from.
/// Operations refuse handles that were never persisted or that belong to
/// another store before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    record: ContainerRecord,
    binding: Option<StoreId>,
}

impl Container {
    pub(crate) fn bound(record: ContainerRecord, store: StoreId) -> Self {
        Self {
            record,
            binding: Some(store),
        }
    }

    /// A handle that has never been persisted.
    pub fn unbound(name: impl Into<String>, kind: ContainerKind) -> Self {
        Self {
            record: ContainerRecord::new(name, kind),
            binding: None,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn kind(&self) -> ContainerKind {
        self.record.kind
    }

    pub fn record(&self) -> &ContainerRecord {
        &self.record
    }

    pub fn binding(&self) -> Option<StoreId> {
        self.binding
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub(crate) fn check_binding(&self, store: StoreId) -> EngineResult<()> {
        match self.binding {
            None => Err(EngineError::Unbound(self.record.name.clone())),
            Some(found) if found != store => Err(EngineError::ForeignStore {
                container: self.record.id,
                expected: store,
                found,
            }),
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn expect_kind(&self, expected: ContainerKind) -> EngineResult<()> {
        ensure_kind(&self.record, expected)
    }
}

pub(crate) fn ensure_kind(record: &ContainerRecord, expected: ContainerKind) -> EngineResult<()> {
    if record.kind == expected {
        Ok(())
    } else {
        Err(EngineError::WrongKind {
            id: record.id,
            expected,
            found: record.kind,
        })
    }
}

/// Re-read a container inside the current transaction.
pub(crate) async fn fetch(
    tx: &mut dyn GraphTransaction,
    id: ContainerId,
) -> EngineResult<ContainerRecord> {
    tx.container(id)
        .await?
        .ok_or(EngineError::ContainerNotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_handle_is_refused() {
        let handle = Container::unbound("scratch", ContainerKind::Fragment);
        assert!(!handle.is_bound());
        assert!(matches!(
            handle.check_binding(StoreId::generate()),
            Err(EngineError::Unbound(name)) if name == "scratch"
        ));
    }

    #[test]
    fn foreign_handle_is_refused() {
        let record = ContainerRecord::new("main", ContainerKind::Root);
        let home = StoreId::generate();
        let handle = Container::bound(record, home);
        assert!(handle.check_binding(home).is_ok());
        assert!(matches!(
            handle.check_binding(StoreId::generate()),
            Err(EngineError::ForeignStore { found, .. }) if found == home
        ));
    }

    #[test]
    fn kind_check() {
        let handle = Container::bound(
            ContainerRecord::new("frag", ContainerKind::Fragment),
            StoreId::generate(),
        );
        assert!(handle.expect_kind(ContainerKind::Fragment).is_ok());
        assert!(matches!(
            handle.expect_kind(ContainerKind::Root),
            Err(EngineError::WrongKind { expected: ContainerKind::Root, .. })
        ));
    }
}
