use std::collections::VecDeque;

use indexmap::IndexMap;
use pipeline_graph::{Graph, NodeId};

use crate::error::PlanError;

/// Kahn's algorithm over the graph's adjacency lists, seeded and drained in
/// insertion order so that ties are broken deterministically.
pub fn topological_order(graph: &Graph) -> Result<Vec<NodeId>, PlanError> {
    let mut indegree: IndexMap<NodeId, usize> = graph
        .nodes()
        .map(|(id, _)| (id, graph.in_degree(id)))
        .collect();

    let mut ready: VecDeque<NodeId> = graph
        .nodes()
        .filter(|(id, _)| indegree[id] == 0)
        .map(|(id, _)| id)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(id) = ready.pop_front() {
        order.push(id);
        for edge in graph.out_edges(id) {
            let remaining = indegree
                .get_mut(&edge.to)
                .expect("every edge endpoint has an indegree entry");
            *remaining -= 1;
            if *remaining == 0 {
                ready.push_back(edge.to);
            }
        }
    }

    if order.len() != graph.node_count() {
        let offending = graph
            .nodes()
            .find(|(id, _)| indegree.get(id).copied().unwrap_or(0) > 0)
            .map(|(_, node)| node.name.clone())
            .unwrap_or_default();
        return Err(PlanError::TopologyCycle { node: offending });
    }

    Ok(order)
}

/// Assign each node a zero-padded two-digit label equal to its position in
/// `order`.
pub fn assign_labels(graph: &mut Graph, order: &[NodeId]) {
    for (position, &id) in order.iter().enumerate() {
        graph.node_mut(id).label = Some(format!("{position:02}"));
    }
}
