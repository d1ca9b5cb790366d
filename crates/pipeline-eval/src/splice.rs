use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use pipeline_graph::{Component, ComponentKind, EdgeType, EgressBinding, Graph, IngressBinding, NodeId};

use crate::error::EvalError;

/// Clone `graph`, splice in a file-driven source node that decodes `src`
/// into 16 kHz mono PCM and feeds it into the component's source input, and
/// a sink node that writes the component's target output to `out`, then
/// restrict the result to the shortest path between the two splice points.
pub fn splice_fixture(
    graph: &Graph,
    component: &Component,
    src: &Path,
    out: &Path,
    fixture_name: &str,
) -> Result<(Graph, PathBuf), EvalError> {
    let mut spliced = graph.clone();

    let edge_type = match component.kind {
        ComponentKind::Asr => EdgeType::Binary,
        ComponentKind::Mt | ComponentKind::Smt => EdgeType::Text,
    };

    let source_name = format!("eval-source-{fixture_name}");
    let source_id = spliced.add_local_node(
        &source_name,
        IndexMap::new(),
        IndexMap::from([("out".to_string(), EgressBinding::Stdout)]),
        format!("ffmpeg -y -i {} -ar 16000 -ac 1 -f s16le -", src.display()),
    )?;
    spliced.add_edge(source_id, "out", component.source_node, &component.source_input, edge_type)?;

    let sink_name = format!("eval-sink-{fixture_name}");
    let sink_id = spliced.add_local_node(
        &sink_name,
        IndexMap::from([("in".to_string(), IngressBinding::Stdin)]),
        IndexMap::new(),
        format!("cat > {}", out.display()),
    )?;
    spliced.add_edge(
        component.target_node,
        &component.target_output,
        sink_id,
        "in",
        EdgeType::Text,
    )?;

    let path = shortest_path(&spliced, source_id, sink_id).ok_or(EvalError::NoPath {
        source: source_name,
        sink: sink_name,
    })?;

    Ok((restrict_to_path(&spliced, &path), out.to_path_buf()))
}

/// Breadth-first search over `graph`'s out-edges; returns the node sequence
/// of the shortest (fewest-hops) path from `source` to `sink`, if any.
fn shortest_path(graph: &Graph, source: NodeId, sink: NodeId) -> Option<Vec<NodeId>> {
    let mut queue = VecDeque::from([source]);
    let mut predecessor: IndexMap<NodeId, NodeId> = IndexMap::new();
    predecessor.insert(source, source);

    while let Some(current) = queue.pop_front() {
        if current == sink {
            break;
        }
        for edge in graph.out_edges(current) {
            if !predecessor.contains_key(&edge.to) {
                predecessor.insert(edge.to, current);
                queue.push_back(edge.to);
            }
        }
    }

    if !predecessor.contains_key(&sink) {
        return None;
    }

    let mut path = vec![sink];
    let mut cursor = sink;
    while cursor != source {
        cursor = predecessor[&cursor];
        path.push(cursor);
    }
    path.reverse();
    Some(path)
}

/// Build a fresh graph containing only the nodes of `path` and the edges
/// directly connecting consecutive pairs in it.
fn restrict_to_path(graph: &Graph, path: &[NodeId]) -> Graph {
    let mut restricted = Graph::new();
    let mut translated: IndexMap<NodeId, NodeId> = IndexMap::new();

    for &old_id in path {
        let node = graph.node(old_id).clone();
        let new_id = restricted.insert_existing_node(node);
        translated.insert(old_id, new_id);
    }

    for window in path.windows(2) {
        let (from, to) = (window[0], window[1]);
        for edge in graph.out_edges(from) {
            if edge.to == to {
                restricted.insert_existing_edge(translated[&from], translated[&to], edge.edge.clone());
            }
        }
    }

    restricted
}
