//! # supergraph-types
//!
//! Storage-independent content model for the supergraph flow-graph store.
//!
//! A diagram is a set of [`Vertex`]es connected through their [`Port`]s by
//! directed [`Edge`]s, plus front-end [`Group`]s. The [`Content`] aggregate
//! carries one such diagram between callers and the reconciliation engine.
//! Diagrams live inside containers ([`ContainerRecord`]): a Root owns a set of
//! Fragments, and both own vertices and groups.
//!
//! ## Key Types
//!
//! - [`Uid`]: externally supplied stable identifier of a primitive
//! - [`ContainerId`]: storage-assigned identifier of a container
//! - [`PropertyValue`]: natively storable property value
//! - [`Content`]: the transfer aggregate
//! - [`ContentError`]: referential-integrity violations

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod container;
mod content;
mod error;
mod ids;
mod properties;

pub use container::{ContainerKind, ContainerRecord};
pub use content::{Content, Edge, EdgeKey, Group, NodeKind, Port, Vertex};
pub use error::ContentError;
pub use ids::{ContainerId, ParseContainerIdError, Uid};
pub use properties::{Meta, Properties, PropertyList, PropertyValue};
