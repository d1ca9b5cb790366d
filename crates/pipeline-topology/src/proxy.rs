use indexmap::IndexMap;
use pipeline_graph::{EgressBinding, Graph, IngressBinding, NodeId};
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::port_pool::PortPool;

/// An auto-inserted stage that replicates one output to N consumers, or
/// breaks a self-loop (a node that both listens and emits on the same
/// external port) into a linear chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProxyStep {
    /// `listen(listen_port) | connect(connect_port) | tee -> fan_out_ports`
    ///
    /// `connect_port` is the node's own externally-bound port (unchanged by
    /// planning); `listen_port` and `fan_out_ports` are fresh.
    SelfLoop {
        node: NodeId,
        listen_port: u16,
        connect_port: u16,
        fan_out_ports: Vec<u16>,
    },
    /// `listen(listen_port) | tee -> fan_out_ports`
    ///
    /// `listen_port` is the node's own originally-declared output port.
    FanOut {
        node: NodeId,
        listen_port: u16,
        fan_out_ports: Vec<u16>,
    },
}

/// Walk nodes in topological order and, for each output with more than one
/// consumer (or a self-loop), allocate fresh ports and rewrite the node's
/// ingress/egress bindings to them, recording a proxy step to bridge the
/// old port to the new ones.
pub fn insert_proxies(
    graph: &mut Graph,
    order: &[NodeId],
    pool: &mut PortPool,
) -> Result<Vec<ProxyStep>, PlanError> {
    let mut proxies = Vec::new();

    for &node_id in order {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for edge in graph.out_edges(node_id) {
            *counts.entry(edge.edge.from_output.clone()).or_insert(0) += 1;
        }

        for (output_name, k) in counts {
            let egress_binding = graph.node(node_id).egress[&output_name][0];

            let self_loop_port = match egress_binding {
                EgressBinding::Stdout => None,
                EgressBinding::Port(port) => {
                    let is_self_loop = graph
                        .node(node_id)
                        .ingress
                        .values()
                        .any(|bindings| bindings.contains(&IngressBinding::Port(port)));
                    is_self_loop.then_some(port)
                }
            };

            if let Some(original_port) = self_loop_port {
                let fan_out_ports = (0..k).map(|_| pool.pop()).collect::<Result<Vec<_>, _>>()?;
                let new_input_port = pool.pop()?;

                let node = graph.node_mut(node_id);
                node.egress.insert(
                    output_name.clone(),
                    fan_out_ports.iter().map(|p| EgressBinding::Port(*p)).collect(),
                );
                let input_name = node
                    .ingress
                    .iter()
                    .find(|(_, bindings)| bindings.contains(&IngressBinding::Port(original_port)))
                    .map(|(name, _)| name.clone())
                    .expect("self-loop check above guarantees a matching ingress entry");
                node.ingress
                    .insert(input_name, vec![IngressBinding::Port(new_input_port)]);

                proxies.push(ProxyStep::SelfLoop {
                    node: node_id,
                    listen_port: new_input_port,
                    connect_port: original_port,
                    fan_out_ports,
                });
            } else if k > 1 && egress_binding != EgressBinding::Stdout {
                let EgressBinding::Port(original_port) = egress_binding else {
                    unreachable!("stdout excluded above")
                };
                let fan_out_ports = (0..k).map(|_| pool.pop()).collect::<Result<Vec<_>, _>>()?;

                graph.node_mut(node_id).egress.insert(
                    output_name.clone(),
                    fan_out_ports.iter().map(|p| EgressBinding::Port(*p)).collect(),
                );

                proxies.push(ProxyStep::FanOut {
                    node: node_id,
                    listen_port: original_port,
                    fan_out_ports,
                });
            }
        }
    }

    Ok(proxies)
}
