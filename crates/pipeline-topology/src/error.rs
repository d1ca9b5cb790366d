use pipeline_graph::GraphError;
use thiserror::Error;

/// Errors raised while planning a validated graph's topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Re-raised from the graph's own `sanity_check`, run as the first step
    /// of planning.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The port pool (default 1000..=9998) ran out of fresh ports while
    /// inserting proxies.
    #[error("port pool exhausted while planning")]
    PortPoolExhausted,

    /// A cycle was found that is not expressible as a single-node self-loop.
    #[error("topology cycle detected at or downstream of node `{node}`")]
    TopologyCycle { node: String },
}
