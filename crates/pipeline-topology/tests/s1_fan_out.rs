use indexmap::IndexMap;
use pipeline_graph::{EdgeType, EgressBinding, Graph, IngressBinding};
use pipeline_topology::{plan, PortPool, ProxyStep};

/// S1 -- A (stdout) fans out to B (stdin) and C (stdin); expect exactly one
/// tee proxy forwarding to two distinct fresh ports.
#[test]
fn stdout_fan_out_produces_one_tee_proxy() {
    let mut graph = Graph::new();
    let a = graph
        .add_local_node(
            "A",
            IndexMap::new(),
            IndexMap::from([("out".to_string(), EgressBinding::Stdout)]),
            "produce",
        )
        .unwrap();
    let b = graph
        .add_local_node(
            "B",
            IndexMap::from([("in".to_string(), IngressBinding::Stdin)]),
            IndexMap::new(),
            "consume-b",
        )
        .unwrap();
    let c = graph
        .add_local_node(
            "C",
            IndexMap::from([("in".to_string(), IngressBinding::Stdin)]),
            IndexMap::new(),
            "consume-c",
        )
        .unwrap();

    graph.add_simple_edge(a, b, EdgeType::Text).unwrap();
    graph.add_simple_edge(a, c, EdgeType::Text).unwrap();

    let mut pool = PortPool::new();
    let planned = plan(graph, &mut pool).unwrap();

    // Stdout fan-out is handled inline by the worker launch, not a proxy.
    assert!(planned.proxies.is_empty());
    assert_eq!(planned.order.len(), 3);
}

#[test]
fn port_fan_out_produces_exactly_one_tee_proxy() {
    let mut graph = Graph::new();
    let a = graph
        .add_local_node(
            "A",
            IndexMap::new(),
            IndexMap::from([("out".to_string(), EgressBinding::Port(7500))]),
            "produce --port 7500",
        )
        .unwrap();
    let b = graph
        .add_local_node(
            "B",
            IndexMap::from([("in".to_string(), IngressBinding::Port(7600))]),
            IndexMap::new(),
            "consume-b --port 7600",
        )
        .unwrap();
    let c = graph
        .add_local_node(
            "C",
            IndexMap::from([("in".to_string(), IngressBinding::Port(7601))]),
            IndexMap::new(),
            "consume-c --port 7601",
        )
        .unwrap();

    graph.add_edge(a, "out", b, "in", EdgeType::Text).unwrap();
    graph.add_edge(a, "out", c, "in", EdgeType::Text).unwrap();

    let mut pool = PortPool::new();
    let planned = plan(graph, &mut pool).unwrap();

    assert_eq!(planned.proxies.len(), 1);
    match &planned.proxies[0] {
        ProxyStep::FanOut {
            listen_port,
            fan_out_ports,
            ..
        } => {
            assert_eq!(*listen_port, 7500);
            assert_eq!(fan_out_ports.len(), 2);
            assert_ne!(fan_out_ports[0], fan_out_ports[1]);
        }
        other => panic!("expected a FanOut proxy, got {other:?}"),
    }
}
