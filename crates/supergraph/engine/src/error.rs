use supergraph_store::{StorageError, StoreId};
use supergraph_types::{ContainerId, ContainerKind, ContentError};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerId),

    #[error("fragment {fragment} does not belong to root {root}")]
    FragmentNotInRoot {
        root: ContainerId,
        fragment: ContainerId,
    },

    #[error("container {id} is a {found}, expected a {expected}")]
    WrongKind {
        id: ContainerId,
        expected: ContainerKind,
        found: ContainerKind,
    },

    #[error("container `{0}` is not bound to a store")]
    Unbound(String),

    #[error("container {container} belongs to store {found}, not {expected}")]
    ForeignStore {
        container: ContainerId,
        expected: StoreId,
        found: StoreId,
    },

    #[error("invalid container name: {0}")]
    InvalidName(String),

    #[error("referential integrity violation: {0}")]
    Integrity(#[from] ContentError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
