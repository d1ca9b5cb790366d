use indexmap::IndexMap;
use pipeline_graph::{EdgeType, EgressBinding, Graph, GraphError, IngressBinding};

/// S3 -- two edges into the same input of one node must be rejected by
/// `sanity_check`, recommending an external multiplexer.
#[test]
fn two_producers_into_one_input_is_a_conflict() {
    let mut graph = Graph::new();

    let a = graph
        .add_local_node(
            "a",
            IndexMap::new(),
            IndexMap::from([("out".to_string(), EgressBinding::Stdout)]),
            "echo a",
        )
        .unwrap();
    let b = graph
        .add_local_node(
            "b",
            IndexMap::new(),
            IndexMap::from([("out".to_string(), EgressBinding::Port(7100))]),
            "echo b",
        )
        .unwrap();
    let m = graph
        .add_local_node(
            "m",
            IndexMap::from([("in".to_string(), IngressBinding::Port(7200))]),
            IndexMap::new(),
            "cat",
        )
        .unwrap();

    graph.add_edge(a, "out", m, "in", EdgeType::Text).unwrap();
    graph.add_edge(b, "out", m, "in", EdgeType::Text).unwrap();

    let err = graph.sanity_check().unwrap_err();
    assert!(matches!(err, GraphError::FanInConflict { .. }));
}

#[test]
fn distinct_inputs_on_the_same_node_are_fine() {
    let mut graph = Graph::new();

    let a = graph
        .add_local_node(
            "a",
            IndexMap::new(),
            IndexMap::from([("out".to_string(), EgressBinding::Stdout)]),
            "echo a",
        )
        .unwrap();
    let b = graph
        .add_local_node(
            "b",
            IndexMap::new(),
            IndexMap::from([("out".to_string(), EgressBinding::Port(7100))]),
            "echo b",
        )
        .unwrap();
    let m = graph
        .add_local_node(
            "m",
            IndexMap::from([
                ("in1".to_string(), IngressBinding::Port(7200)),
                ("in2".to_string(), IngressBinding::Port(7201)),
            ]),
            IndexMap::new(),
            "cat",
        )
        .unwrap();

    graph.add_edge(a, "out", m, "in1", EdgeType::Text).unwrap();
    graph.add_edge(b, "out", m, "in2", EdgeType::Text).unwrap();

    assert!(graph.sanity_check().is_ok());
}

#[test]
fn node_with_no_ports_is_rejected() {
    let mut graph = Graph::new();
    let err = graph
        .add_local_node("empty", IndexMap::new(), IndexMap::new(), "true")
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::EmptyNode {
            name: "empty".to_string()
        }
    );
}

#[test]
fn simple_edge_rejects_ambiguous_nodes() {
    let mut graph = Graph::new();
    let multi = graph
        .add_local_node(
            "multi",
            IndexMap::new(),
            IndexMap::from([
                ("a".to_string(), EgressBinding::Port(7300)),
                ("b".to_string(), EgressBinding::Port(7301)),
            ]),
            "echo",
        )
        .unwrap();
    let sink = graph
        .add_local_node(
            "sink",
            IndexMap::from([("in".to_string(), IngressBinding::Stdin)]),
            IndexMap::new(),
            "cat",
        )
        .unwrap();

    let err = graph.add_simple_edge(multi, sink, EdgeType::Text).unwrap_err();
    assert!(matches!(err, GraphError::Ambiguous { .. }));
}
