//! A `serde`-deserializable JSON/YAML document (nodes, edges, components,
//! preamble) that the CLI accepts as sugar over the Graph Builder's own
//! calls (`addLocalNode`/`addEdge`/`addComponent`/`setPreamble`). This
//! format does not change planner semantics -- it's purely a declarative
//! way to author the same graph a program would otherwise build by calling
//! `pipeline-graph` directly.

use std::path::Path;

use indexmap::IndexMap;
use pipeline_graph::{EgressBinding, Graph, GraphError, IngressBinding, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("failed to read graph description {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse graph description {path} as JSON or YAML: {json_error} / {yaml_error}")]
    Parse {
        path: String,
        json_error: String,
        yaml_error: String,
    },

    #[error("node `{node}` binding `{value}` on {direction} `{port}` is neither `stdin`/`stdout` nor a port number")]
    BadBinding {
        node: String,
        port: String,
        direction: &'static str,
        value: String,
    },

    #[error("edge from `{node}` references a node that was never declared")]
    UnknownNode { node: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default)]
    pub ingress: IndexMap<String, String>,
    #[serde(default)]
    pub egress: IndexMap<String, String>,
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDescription {
    pub from: String,
    pub from_output: String,
    pub to: String,
    pub to_input: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDescription {
    pub name: String,
    pub source_node: String,
    pub source_input: String,
    pub target_node: String,
    pub target_output: String,
    pub index_file: String,
    pub kind: String,
}

/// The full declarative description of a graph, deserialized from JSON or
/// YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDescription {
    #[serde(default)]
    pub preamble: String,
    pub nodes: Vec<NodeDescription>,
    #[serde(default)]
    pub edges: Vec<EdgeDescription>,
    #[serde(default)]
    pub components: Vec<ComponentDescription>,
}

impl GraphDescription {
    /// Load a graph description from a file, trying JSON first and falling
    /// back to YAML (a `.json`/`.yaml`/`.yml` extension is advisory only --
    /// content is what decides parsing).
    pub fn load(path: &Path) -> Result<GraphDescription, DescriptionError> {
        let text = std::fs::read_to_string(path).map_err(|source| DescriptionError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    pub fn parse(text: &str, path: &str) -> Result<GraphDescription, DescriptionError> {
        match serde_json::from_str(text) {
            Ok(description) => Ok(description),
            Err(json_error) => serde_yaml::from_str(text).map_err(|yaml_error| DescriptionError::Parse {
                path: path.to_string(),
                json_error: json_error.to_string(),
                yaml_error: yaml_error.to_string(),
            }),
        }
    }
}

/// Build a [`Graph`] from a [`GraphDescription`], returning the
/// name-to-[`NodeId`] mapping so commands can resolve component endpoints
/// or CLI-supplied node names afterward.
pub fn build_graph(description: &GraphDescription) -> Result<(Graph, IndexMap<String, NodeId>), DescriptionError> {
    let mut graph = Graph::new();
    graph.set_preamble(&description.preamble);

    let mut ids = IndexMap::new();
    for node in &description.nodes {
        let ingress = parse_ingress(&node.name, &node.ingress)?;
        let egress = parse_egress(&node.name, &node.egress)?;
        let id = graph.add_local_node(&node.name, ingress, egress, &node.command)?;
        ids.insert(node.name.clone(), id);
    }

    for edge in &description.edges {
        let from = *ids.get(&edge.from).ok_or_else(|| DescriptionError::UnknownNode {
            node: edge.from.clone(),
        })?;
        let to = *ids.get(&edge.to).ok_or_else(|| DescriptionError::UnknownNode {
            node: edge.to.clone(),
        })?;
        let edge_type = pipeline_graph::EdgeType::parse(&edge.edge_type)?;
        graph.add_edge(from, &edge.from_output, to, &edge.to_input, edge_type)?;
    }

    for component in &description.components {
        let source_node = *ids.get(&component.source_node).ok_or_else(|| DescriptionError::UnknownNode {
            node: component.source_node.clone(),
        })?;
        let target_node = *ids.get(&component.target_node).ok_or_else(|| DescriptionError::UnknownNode {
            node: component.target_node.clone(),
        })?;
        graph.add_component(
            &component.name,
            source_node,
            &component.source_input,
            target_node,
            &component.target_output,
            &component.index_file,
            &component.kind,
        )?;
    }

    Ok((graph, ids))
}

fn parse_ingress(node: &str, raw: &IndexMap<String, String>) -> Result<IndexMap<String, IngressBinding>, DescriptionError> {
    raw.iter()
        .map(|(port, value)| Ok((port.clone(), parse_ingress_binding(node, port, value)?)))
        .collect()
}

fn parse_egress(node: &str, raw: &IndexMap<String, String>) -> Result<IndexMap<String, EgressBinding>, DescriptionError> {
    raw.iter()
        .map(|(port, value)| Ok((port.clone(), parse_egress_binding(node, port, value)?)))
        .collect()
}

fn parse_ingress_binding(node: &str, port: &str, value: &str) -> Result<IngressBinding, DescriptionError> {
    if value == "stdin" {
        return Ok(IngressBinding::Stdin);
    }
    value.parse().map(IngressBinding::Port).map_err(|_| DescriptionError::BadBinding {
        node: node.to_string(),
        port: port.to_string(),
        direction: "input",
        value: value.to_string(),
    })
}

fn parse_egress_binding(node: &str, port: &str, value: &str) -> Result<EgressBinding, DescriptionError> {
    if value == "stdout" {
        return Ok(EgressBinding::Stdout);
    }
    value.parse().map(EgressBinding::Port).map_err(|_| DescriptionError::BadBinding {
        node: node.to_string(),
        port: port.to_string(),
        direction: "output",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "preamble": "echo starting",
        "nodes": [
            { "name": "A", "egress": { "out": "stdout" }, "command": "produce" },
            { "name": "B", "ingress": { "in": "stdin" }, "command": "consume" }
        ],
        "edges": [
            { "from": "A", "from_output": "out", "to": "B", "to_input": "in", "type": "text" }
        ]
    }"#;

    #[test]
    fn parses_json_and_builds_a_graph() {
        let description = GraphDescription::parse(JSON, "test.json").unwrap();
        let (graph, ids) = build_graph(&description).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert!(ids.contains_key("A"));
        assert!(ids.contains_key("B"));
    }

    #[test]
    fn parses_equivalent_yaml() {
        let yaml = "
nodes:
  - name: A
    egress: { out: stdout }
    command: produce
  - name: B
    ingress: { in: stdin }
    command: consume
edges:
  - from: A
    from_output: out
    to: B
    to_input: in
    type: text
";
        let description = GraphDescription::parse(yaml, "test.yaml").unwrap();
        let (graph, _) = build_graph(&description).unwrap();
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn rejects_edges_to_unknown_nodes() {
        let description = GraphDescription {
            nodes: vec![NodeDescription {
                name: "A".to_string(),
                ingress: IndexMap::new(),
                egress: IndexMap::from([("out".to_string(), "stdout".to_string())]),
                command: "produce".to_string(),
            }],
            edges: vec![EdgeDescription {
                from: "A".to_string(),
                from_output: "out".to_string(),
                to: "ghost".to_string(),
                to_input: "in".to_string(),
                edge_type: "text".to_string(),
            }],
            components: vec![],
            preamble: String::new(),
        };
        assert!(matches!(build_graph(&description), Err(DescriptionError::UnknownNode { .. })));
    }
}
