use std::path::PathBuf;

use pipeline_graph::{EdgeType, EgressBinding, IngressBinding};
use pipeline_topology::{PlanError, PlannedGraph, PortPool};

use crate::plan::{EdgeLog, EdgePipeStep, EntrypointInfo, LaunchMode, LaunchPlan, LaunchStep, WorkerStep};

/// Lower a [`PlannedGraph`] into a [`LaunchPlan`]: pure, synchronous,
/// value-in-value-out. Mirrors the four-group ordering of the distilled
/// spec's emitter (prologue, preamble, concurrent body, epilogue).
pub fn emit(
    mut planned: PlannedGraph,
    logs_dir: PathBuf,
    preamble: String,
    mode: LaunchMode,
    pool: &mut PortPool,
) -> Result<LaunchPlan, PlanError> {
    let mut steps = Vec::new();

    steps.push(LaunchStep::Prologue {
        logs_dir: logs_dir.clone(),
    });
    if !preamble.is_empty() {
        steps.push(LaunchStep::Preamble(preamble));
    }

    for proxy in planned.proxies.drain(..) {
        steps.push(LaunchStep::Proxy(proxy));
    }

    let mut entrypoints = Vec::new();
    for &node_id in &planned.order.clone() {
        let in_degree = planned.graph.in_degree(node_id);
        let out_degree = planned.graph.out_degree(node_id);
        let node = planned.graph.node(node_id).clone();
        let label = node.label.clone().unwrap_or_default();

        let stdin_port = if let Some(stdin_name) = &node.stdin_name {
            let port = pool.pop()?;
            planned
                .graph
                .node_mut(node_id)
                .ingress
                .insert(stdin_name.clone(), vec![IngressBinding::Port(port)]);
            Some(port)
        } else {
            None
        };

        if in_degree == 0 && out_degree > 0 {
            if let Some(port) = stdin_port {
                entrypoints.push(EntrypointInfo {
                    node_name: node.name.clone(),
                    stdin_port: port,
                });
            }
        }

        let stdout_fanout_ports = if let Some(stdout_name) = &node.stdout_name {
            let edges_from_stdout = planned
                .graph
                .out_edges(node_id)
                .filter(|edge| &edge.edge.from_output == stdout_name)
                .count();
            if edges_from_stdout > 0 {
                let ports = (0..edges_from_stdout)
                    .map(|_| pool.pop())
                    .collect::<Result<Vec<_>, _>>()?;
                planned.graph.node_mut(node_id).egress.insert(
                    stdout_name.clone(),
                    ports.iter().map(|p| EgressBinding::Port(*p)).collect(),
                );
                ports
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        };

        steps.push(LaunchStep::Worker(WorkerStep {
            label: label.clone(),
            name: node.name.clone(),
            command: node.command.as_str().to_string(),
            stdin_port,
            stdout_fanout_ports,
            pid_file: logs_dir.join(format!("{label}-{}.pid", node.name)),
            err_log: logs_dir.join(format!("{label}-{}.err", node.name)),
        }));
    }

    for graph_edge in planned.graph.edges().to_vec().iter() {
        let edge = &graph_edge.edge;
        let from_port = pop_port(&mut planned, graph_edge.from, Side::Egress, &edge.from_output);
        let to_port = pop_port(&mut planned, graph_edge.to, Side::Ingress, &edge.to_input);

        let from_label = planned.graph.node(graph_edge.from).label.clone().unwrap_or_default();
        let to_label = planned.graph.node(graph_edge.to).label.clone().unwrap_or_default();
        let log_base = format!("l_{from_label}-{to_label}-{}", edge.name);

        let log = match edge.edge_type {
            EdgeType::Binary => Some(EdgeLog {
                edge_type: EdgeType::Binary,
                path: logs_dir.join(format!("{log_base}.data")),
            }),
            EdgeType::Text => Some(EdgeLog {
                edge_type: EdgeType::Text,
                path: logs_dir.join(format!("{log_base}.log")),
            }),
            EdgeType::None => Some(EdgeLog {
                edge_type: EdgeType::None,
                path: logs_dir.join(format!("{log_base}.log")),
            }),
        };

        steps.push(LaunchStep::EdgePipe(EdgePipeStep {
            from_port,
            to_port,
            log,
        }));
    }

    steps.push(LaunchStep::Entrypoints(entrypoints));
    steps.push(LaunchStep::Epilogue {
        mode,
        component_count: planned.graph.node_count(),
    });

    Ok(LaunchPlan {
        steps,
        logs_dir,
        mode,
    })
}

enum Side {
    Ingress,
    Egress,
}

/// Pop one concrete port from a node's ingress/egress binding list for
/// `port_name`, mirroring the original emitter's draining pass. Panics if
/// the binding list is empty or not port-typed, which would indicate a
/// planner bug (every edge endpoint is guaranteed a concrete port by the
/// time edges are lowered).
fn pop_port(planned: &mut PlannedGraph, node: pipeline_graph::NodeId, side: Side, port_name: &str) -> u16 {
    let node = planned.graph.node_mut(node);
    match side {
        Side::Egress => match node.egress.get_mut(port_name).and_then(|ports| ports.pop()) {
            Some(EgressBinding::Port(port)) => port,
            other => unreachable!("edge endpoint `{port_name}` was not a concrete port: {other:?}"),
        },
        Side::Ingress => match node.ingress.get_mut(port_name).and_then(|ports| ports.pop()) {
            Some(IngressBinding::Port(port)) => port,
            other => unreachable!("edge endpoint `{port_name}` was not a concrete port: {other:?}"),
        },
    }
}
