use indexmap::IndexMap;
use pipeline_graph::{EdgeType, EgressBinding, Graph, IngressBinding};
use pipeline_topology::{plan, PortPool};

fn sample_graph() -> Graph {
    let mut graph = Graph::new();
    let recorder = graph
        .add_local_node(
            "recorder",
            IndexMap::new(),
            IndexMap::from([("audio".to_string(), EgressBinding::Stdout)]),
            "record",
        )
        .unwrap();
    let asr = graph
        .add_local_node(
            "asr",
            IndexMap::from([("audio".to_string(), IngressBinding::Stdin)]),
            IndexMap::from([("text".to_string(), EgressBinding::Stdout)]),
            "asr",
        )
        .unwrap();
    let diarizer = graph
        .add_local_node(
            "diarizer",
            IndexMap::from([("audio".to_string(), IngressBinding::Stdin)]),
            IndexMap::from([("turns".to_string(), EgressBinding::Stdout)]),
            "diarize",
        )
        .unwrap();
    let merger = graph
        .add_local_node(
            "merger",
            IndexMap::from([
                ("text".to_string(), IngressBinding::Port(8003)),
                ("turns".to_string(), IngressBinding::Port(8004)),
            ]),
            IndexMap::from([("merged".to_string(), EgressBinding::Stdout)]),
            "merge",
        )
        .unwrap();

    graph.add_simple_edge(recorder, asr, EdgeType::Binary).unwrap();
    graph.add_simple_edge(recorder, diarizer, EdgeType::Binary).unwrap();
    graph.add_edge(asr, "text", merger, "text", EdgeType::Text).unwrap();
    graph
        .add_edge(diarizer, "turns", merger, "turns", EdgeType::Text)
        .unwrap();
    graph
}

#[test]
fn labels_are_monotone_along_every_edge() {
    let planned = plan(sample_graph(), &mut PortPool::new()).unwrap();
    for edge in planned.graph.edges() {
        let from_label = planned.graph.node(edge.from).label.clone().unwrap();
        let to_label = planned.graph.node(edge.to).label.clone().unwrap();
        assert!(from_label <= to_label, "{from_label} should precede {to_label}");
    }
}

#[test]
fn every_port_appears_at_most_once_across_proxy_outputs() {
    let planned = plan(sample_graph(), &mut PortPool::new()).unwrap();
    let mut seen = Vec::new();
    for proxy in &planned.proxies {
        let ports: Vec<u16> = match proxy {
            pipeline_topology::ProxyStep::SelfLoop {
                listen_port,
                fan_out_ports,
                ..
            } => std::iter::once(*listen_port).chain(fan_out_ports.iter().copied()).collect(),
            pipeline_topology::ProxyStep::FanOut { fan_out_ports, .. } => fan_out_ports.clone(),
        };
        for port in ports {
            assert!(!seen.contains(&port), "port {port} reused across proxies");
            seen.push(port);
        }
    }
}

#[test]
fn planning_is_deterministic_given_identical_input() {
    let first = plan(sample_graph(), &mut PortPool::new()).unwrap();
    let second = plan(sample_graph(), &mut PortPool::new()).unwrap();

    let first_labels: Vec<_> = first
        .order
        .iter()
        .map(|id| first.graph.node(*id).name.clone())
        .collect();
    let second_labels: Vec<_> = second
        .order
        .iter()
        .map(|id| second.graph.node(*id).name.clone())
        .collect();
    assert_eq!(first_labels, second_labels);
    assert_eq!(first.monitoring, second.monitoring);
}
