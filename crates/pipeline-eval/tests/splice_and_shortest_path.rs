use std::collections::HashMap;

use indexmap::IndexMap;
use pipeline_eval::{plan_evaluations, StaticFixtureIndex};
use pipeline_graph::{EdgeType, EgressBinding, Graph, IngressBinding};
use pipeline_launch::LaunchStep;
use pipeline_topology::PortPool;
use tempfile::tempdir;

/// A -> B -> C, with a stray D branch B doesn't lead to; the evaluation
/// component covers B.audio -> C.text, so only B and C (plus the spliced
/// source/sink) should survive shortest-path restriction.
fn sample_graph() -> (Graph, pipeline_graph::NodeId, pipeline_graph::NodeId) {
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
            IndexMap::from([("audio".to_string(), IngressBinding::Stdin)]),
            IndexMap::from([("text".to_string(), EgressBinding::Stdout)]),
            "asr",
        )
        .unwrap();
    let c = graph
        .add_local_node(
            "C",
            IndexMap::from([("text".to_string(), IngressBinding::Stdin)]),
            IndexMap::from([("result".to_string(), EgressBinding::Stdout)]),
            "report",
        )
        .unwrap();
    let d = graph
        .add_local_node(
            "D",
            IndexMap::from([("ignored".to_string(), IngressBinding::Stdin)]),
            IndexMap::new(),
            "dead-end",
        )
        .unwrap();

    graph.add_simple_edge(a, b, EdgeType::Binary).unwrap();
    graph.add_edge(b, "text", c, "text", EdgeType::Text).unwrap();
    graph.add_edge(b, "text", d, "ignored", EdgeType::Text).unwrap();

    (graph, b, c)
}

#[test]
fn evaluation_restricts_to_the_covered_component_only() {
    let (graph, b, c) = sample_graph();
    let component = pipeline_graph::Component::new("asr-eval", b, "audio", c, "result", "fixtures.idx", "asr").unwrap();

    let source_dir = tempdir().unwrap().keep();
    let src_path = source_dir.join("sample.wav");
    std::fs::write(&src_path, b"not really audio").unwrap();

    let mut bundle = HashMap::new();
    bundle.insert("SRC".to_string(), src_path);
    let index = StaticFixtureIndex::new(vec![bundle]);

    let eval_dir = tempdir().unwrap().keep();
    let mut pool = PortPool::new();
    let plans = plan_evaluations(&graph, &component, &index, &eval_dir, &mut pool).unwrap();

    assert_eq!(plans.len(), 1);
    let plan = &plans[0];
    assert_eq!(plan.fixture_name, "asr-eval-0");

    let worker_names: Vec<String> = plan
        .launch_plan
        .steps
        .iter()
        .filter_map(|step| match step {
            LaunchStep::Worker(worker) => Some(worker.name.clone()),
            _ => None,
        })
        .collect();

    // B and C, plus the spliced source/sink -- never A or D.
    assert_eq!(worker_names.len(), 4);
    assert!(worker_names.contains(&"B".to_string()));
    assert!(worker_names.contains(&"C".to_string()));
    assert!(!worker_names.contains(&"A".to_string()));
    assert!(!worker_names.contains(&"D".to_string()));
}

#[test]
fn missing_src_entry_is_rejected() {
    let (graph, b, c) = sample_graph();
    let component = pipeline_graph::Component::new("asr-eval", b, "audio", c, "result", "fixtures.idx", "asr").unwrap();
    let index = StaticFixtureIndex::new(vec![HashMap::new()]);

    let eval_dir = tempdir().unwrap().keep();
    let mut pool = PortPool::new();
    let err = plan_evaluations(&graph, &component, &index, &eval_dir, &mut pool).unwrap_err();
    assert!(matches!(err, pipeline_eval::EvalError::MissingSource { .. }));
}
