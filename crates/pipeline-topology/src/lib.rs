//! The topology planner: assigns ports, inserts proxies for fan-out and
//! self-loops, labels nodes in topological order, and records a monitoring
//! set (§4.2 of the orchestrator design).
//!
//! Like the Graph Builder, this crate is pure and synchronous: a
//! [`PlannedGraph`] is a value, produced without touching the filesystem or
//! the network.

mod error;
mod label;
mod port_pool;
mod proxy;

use indexmap::IndexMap;
use pipeline_graph::{EgressBinding, Graph, IngressBinding, NodeId};

pub use error::PlanError;
pub use label::{assign_labels, topological_order};
pub use port_pool::PortPool;
pub use proxy::{insert_proxies, ProxyStep};

/// A graph that has been validated, labeled, and had its ports finalized.
#[derive(Debug, Clone)]
pub struct PlannedGraph {
    pub graph: Graph,
    pub order: Vec<NodeId>,
    pub proxies: Vec<ProxyStep>,
    /// Per-node union of all concrete ports on its ingress and egress,
    /// after proxy insertion. Used by the optional runtime monitor UI.
    pub monitoring: IndexMap<String, Vec<u16>>,
}

/// Run the full topology planning procedure against an already
/// `sanity_check`-ed graph, using a pool scoped to this single plan.
pub fn plan(mut graph: Graph, pool: &mut PortPool) -> Result<PlannedGraph, PlanError> {
    graph.sanity_check()?;

    let order = topological_order(&graph)?;
    assign_labels(&mut graph, &order);
    let proxies = insert_proxies(&mut graph, &order, pool)?;
    let monitoring = monitoring_set(&graph);

    Ok(PlannedGraph {
        graph,
        order,
        proxies,
        monitoring,
    })
}

fn monitoring_set(graph: &Graph) -> IndexMap<String, Vec<u16>> {
    let mut monitoring = IndexMap::new();
    for (_, node) in graph.nodes() {
        let mut ports = Vec::new();
        for bindings in node.ingress.values() {
            ports.extend(bindings.iter().filter_map(|b| match b {
                IngressBinding::Port(p) => Some(*p),
                IngressBinding::Stdin => None,
            }));
        }
        for bindings in node.egress.values() {
            ports.extend(bindings.iter().filter_map(|b| match b {
                EgressBinding::Port(p) => Some(*p),
                EgressBinding::Stdout => None,
            }));
        }
        monitoring.insert(node.name.clone(), ports);
    }
    monitoring
}
