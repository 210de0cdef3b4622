//! Property-graph storage for supergraph content.
//!
//! The engine never talks to a concrete database. It opens a
//! [`GraphTransaction`] on a [`GraphStore`] and works with:
//! - container nodes (roots and fragments) and the root→fragment links
//! - vertex, port and group nodes keyed by `(kind, uid)`
//! - ownership links between containers and vertices/groups
//! - vertex→port links and directed port→port edges
//!
//! Backends:
//! - [`memory::InMemoryGraphStore`] for tests and single-process use
//! - `postgres::PostgresGraphStore` (feature `postgres`) as the durable store

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod config;
mod error;
pub mod memory;
mod model;
#[cfg(feature = "postgres")]
pub mod postgres;
mod traits;

pub use config::{open_store, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryGraphStore;
pub use model::{EdgeRecord, GraphStats, NodeRecord, StoreId};
pub use traits::{GraphStore, GraphTransaction};
