use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::edge::{Edge, EdgeType};
use crate::error::GraphError;
use crate::node::{EgressBinding, IngressBinding, Node, NodeCommand};

/// A handle to a node returned by [`Graph::add_local_node`].
///
/// Opaque and cheap to copy; stable for the lifetime of the `Graph` it came
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

/// One directed edge of the multigraph, with the endpoints it connects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub edge: Edge,
}

/// A directed multigraph of [`Node`]s connected by typed [`Edge`]s.
///
/// This is the value the Graph Builder accumulates and the Topology Planner
/// consumes. Per the design notes, it is a hand-rolled adjacency-list
/// structure (no graph library): `nodes` is insertion-ordered so that
/// topological-sort tie-breaking by insertion order is just "iterate in
/// order".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<GraphEdge>,
    components: Vec<Component>,
    preamble: String,
    next_id: usize,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Declare a node with a finished command string.
    pub fn add_local_node(
        &mut self,
        name: impl Into<String>,
        ingress: IndexMap<String, IngressBinding>,
        egress: IndexMap<String, EgressBinding>,
        command: impl Into<String>,
    ) -> Result<NodeId, GraphError> {
        self.insert_node(name, ingress, egress, NodeCommand::Literal(command.into()))
    }

    /// Declare a node whose command is a template string with `{name}`
    /// placeholders, rendered eagerly against `vars`.
    pub fn add_local_node_templated(
        &mut self,
        name: impl Into<String>,
        ingress: IndexMap<String, IngressBinding>,
        egress: IndexMap<String, EgressBinding>,
        template: &str,
        vars: &IndexMap<String, String>,
    ) -> Result<NodeId, GraphError> {
        let name = name.into();
        let command = NodeCommand::render_template(&name, template, vars)?;
        self.insert_node(name, ingress, egress, command)
    }

    fn insert_node(
        &mut self,
        name: impl Into<String>,
        ingress: IndexMap<String, IngressBinding>,
        egress: IndexMap<String, EgressBinding>,
        command: NodeCommand,
    ) -> Result<NodeId, GraphError> {
        let node = Node::new(name.into(), ingress, egress, command)?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        Ok(id)
    }

    pub fn set_preamble(&mut self, preamble: impl Into<String>) {
        self.preamble = preamble.into();
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[&id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[&id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Add a multigraph edge from `source`'s `source_output` to `target`'s
    /// `target_input`.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        source_output: &str,
        target: NodeId,
        target_input: &str,
        edge_type: EdgeType,
    ) -> Result<(), GraphError> {
        if !self.nodes[&source].egress.contains_key(source_output) {
            return Err(GraphError::UnknownPort {
                node: self.nodes[&source].name.clone(),
                port: source_output.to_string(),
                direction: "output",
            });
        }
        if !self.nodes[&target].ingress.contains_key(target_input) {
            return Err(GraphError::UnknownPort {
                node: self.nodes[&target].name.clone(),
                port: target_input.to_string(),
                direction: "input",
            });
        }
        self.edges.push(GraphEdge {
            from: source,
            to: target,
            edge: Edge::new(source_output, target_input, edge_type),
        });
        Ok(())
    }

    /// Convenience for connecting two single-port nodes.
    pub fn add_simple_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: EdgeType,
    ) -> Result<(), GraphError> {
        let source_node = &self.nodes[&source];
        if source_node.egress.len() > 1 {
            return Err(GraphError::Ambiguous {
                node: source_node.name.clone(),
                direction: "output",
            });
        }
        let target_node = &self.nodes[&target];
        if target_node.ingress.len() > 1 {
            return Err(GraphError::Ambiguous {
                node: target_node.name.clone(),
                direction: "input",
            });
        }
        let source_output = self.nodes[&source]
            .egress
            .keys()
            .next()
            .expect("non-empty by add_simple_edge's own check below")
            .clone();
        let target_input = self.nodes[&target]
            .ingress
            .keys()
            .next()
            .expect("non-empty by add_simple_edge's own check below")
            .clone();
        self.add_edge(source, &source_output, target, &target_input, edge_type)
    }

    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        source_node: NodeId,
        source_input: impl Into<String>,
        target_node: NodeId,
        target_output: impl Into<String>,
        index_file: impl Into<String>,
        kind: &str,
    ) -> Result<(), GraphError> {
        let component = Component::new(
            name,
            source_node,
            source_input,
            target_node,
            target_output,
            index_file,
            kind,
        )?;
        self.components.push(component);
        Ok(())
    }

    /// Insert an already-built [`Node`] directly, bypassing the builder's
    /// own validation. Used by the evaluation planner to copy nodes from one
    /// graph into a freshly spliced subgraph without re-deriving their
    /// `stdin_name`/`stdout_name`/bindings.
    pub fn insert_existing_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Append an edge whose endpoints are already known to be valid, bypassing
    /// `add_edge`'s port-existence checks. Used when copying edges between
    /// nodes that were themselves copied with [`Graph::insert_existing_node`].
    pub fn insert_existing_edge(&mut self, from: NodeId, to: NodeId, edge: Edge) {
        self.edges.push(GraphEdge { from, to, edge });
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.to == id).count()
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.from == id).count()
    }

    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.to == id)
    }

    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// For every node with more than one incoming edge, verify that the set
    /// of distinct destination input names equals the in-degree -- i.e. no
    /// two edges land on the same input.
    pub fn sanity_check(&self) -> Result<(), GraphError> {
        for (id, node) in self.nodes() {
            let in_degree = self.in_degree(id);
            if in_degree > 1 {
                let mut distinct: Vec<&str> = Vec::new();
                for edge in self.in_edges(id) {
                    let input = edge.edge.to_input.as_str();
                    if !distinct.contains(&input) {
                        distinct.push(input);
                    }
                }
                if distinct.len() < in_degree {
                    return Err(GraphError::FanInConflict {
                        node: node.name.clone(),
                        inputs: distinct.join(" "),
                    });
                }
            }
        }
        Ok(())
    }
}
