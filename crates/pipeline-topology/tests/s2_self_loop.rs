use indexmap::IndexMap;
use pipeline_graph::{EdgeType, EgressBinding, Graph, IngressBinding};
use pipeline_topology::{plan, PortPool, ProxyStep};

/// S2 -- node X with ingress {in: 7000} and egress {out: 7000}, one edge
/// X -> Y (Y's in = 7001). Expect a fresh input port p1 and output port p2;
/// a self-loop proxy bridging them through the original port 7000; and Y's
/// ingress untouched (still `connect(7001)` at edge-lowering time).
#[test]
fn self_loop_breaks_into_a_proxy_chain() {
    let mut graph = Graph::new();
    let x = graph
        .add_local_node(
            "X",
            IndexMap::from([("in".to_string(), IngressBinding::Port(7000))]),
            IndexMap::from([("out".to_string(), EgressBinding::Port(7000))]),
            "feedback-stage --port 7000",
        )
        .unwrap();
    let y = graph
        .add_local_node(
            "Y",
            IndexMap::from([("in".to_string(), IngressBinding::Port(7001))]),
            IndexMap::new(),
            "sink --port 7001",
        )
        .unwrap();

    graph.add_edge(x, "out", y, "in", EdgeType::Text).unwrap();

    let mut pool = PortPool::new();
    let planned = plan(graph, &mut pool).unwrap();

    assert_eq!(planned.proxies.len(), 1);
    let (p1, p2) = match &planned.proxies[0] {
        ProxyStep::SelfLoop {
            listen_port,
            connect_port,
            fan_out_ports,
            ..
        } => {
            assert_eq!(*connect_port, 7000);
            assert_eq!(fan_out_ports.len(), 1);
            (*listen_port, fan_out_ports[0])
        }
        other => panic!("expected a SelfLoop proxy, got {other:?}"),
    };
    assert_ne!(p1, p2);
    assert_ne!(p1, 7000);
    assert_ne!(p2, 7000);

    let x_node = planned.graph.node(x);
    assert_eq!(x_node.ingress["in"], vec![IngressBinding::Port(p1)]);
    assert_eq!(x_node.egress["out"], vec![EgressBinding::Port(p2)]);

    let y_node = planned.graph.node(y);
    assert_eq!(y_node.ingress["in"], vec![IngressBinding::Port(7001)]);
}
