//! The pipeline graph model: nodes, typed edges, and the structural
//! invariants enforced while authors build a pipeline (§4.1 of the
//! orchestrator design).
//!
//! This crate is pure and synchronous: building and validating a [`Graph`]
//! never touches the filesystem or the network.

mod component;
mod edge;
mod error;
mod graph;
mod node;

pub use component::{Component, ComponentKind};
pub use edge::{Edge, EdgeType};
pub use error::GraphError;
pub use graph::{Graph, GraphEdge, NodeId};
pub use node::{EgressBinding, IngressBinding, Node, NodeCommand};
