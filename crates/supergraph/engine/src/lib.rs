//! # supergraph-engine
//!
//! Container-scoped content reconciliation for the supergraph store.
//!
//! Given a container and a desired [`Content`], the engine computes and
//! applies the mutations that make the container's persisted content equal
//! to it, in one store transaction:
//!
//! 1. [`Deprecator`] deletes what the container owns but the content leaves
//!    out, disowning instead of deleting anything another container still
//!    holds.
//! 2. [`Merger`] upserts ports, edges, vertices and groups by uid and links
//!    vertices and groups to the container.
//!
//! [`Reader`] projects a container back into [`Content`]. [`Manager`] wraps
//! all of it, and [`Containers`] manages roots and fragments.
//!
//! ```no_run
//! # async fn demo() -> supergraph_engine::EngineResult<()> {
//! use supergraph_engine::Manager;
//! use supergraph_types::{Content, Edge, Port, Vertex};
//!
//! let manager = Manager::in_memory();
//! let root = manager.containers().create_root("flows").await?;
//! let content = Content {
//!     vertices: vec![Vertex::new("n1").with_port("p1"), Vertex::new("n2").with_port("p2")],
//!     ports: vec![Port::new("p1"), Port::new("p2")],
//!     edges: vec![Edge::new("p1", "p2")],
//!     groups: vec![],
//! };
//! manager.replace(&root, content).await?;
//! assert_eq!(manager.read(&root).await?.edges.len(), 1);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod config;
mod container;
mod deprecator;
mod error;
mod lifecycle;
mod manager;
mod merger;
mod reader;

pub use config::{EngineConfig, LoggingConfig, SchemaConfig, DEFAULT_ROOT_ID};
pub use container::Container;
pub use deprecator::{Deprecation, Deprecator};
pub use error::{EngineError, EngineResult};
pub use lifecycle::Containers;
pub use manager::Manager;
pub use merger::{Merged, Merger};
pub use reader::Reader;

pub use supergraph_store::{GraphStats, StorageConfig};
pub use supergraph_types::Content;
