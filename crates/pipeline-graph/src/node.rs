use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// A binding on a node's input side: either the node's standard input, or a
/// loopback TCP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngressBinding {
    Stdin,
    Port(u16),
}

/// A binding on a node's output side: either the node's standard output, or a
/// loopback TCP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EgressBinding {
    Stdout,
    Port(u16),
}

/// A node's shell command, either finished or a named-placeholder template.
///
/// Rust has no safe analogue of the original implementation's re-evaluation
/// of an f-string against the builder's own attributes, so templates are
/// rendered eagerly at construction time against an explicit variable map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCommand {
    Literal(String),
}

impl NodeCommand {
    /// Render a template string by replacing every `{name}` placeholder with
    /// the corresponding entry of `vars`. Literal braces are not supported;
    /// this is deliberately simpler than `format!`, since the set of
    /// variables is author-supplied and small.
    pub fn render_template(
        node: &str,
        template: &str,
        vars: &IndexMap<String, String>,
    ) -> Result<NodeCommand, GraphError> {
        let mut rendered = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find('}') else {
                rendered.push_str(&rest[open..]);
                rest = "";
                break;
            };
            let key = &after_open[..close];
            let value = vars.get(key).ok_or_else(|| GraphError::TemplateVar {
                node: node.to_string(),
                key: key.to_string(),
            })?;
            rendered.push_str(value);
            rest = &after_open[close + 1..];
        }
        rendered.push_str(rest);
        Ok(NodeCommand::Literal(rendered))
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeCommand::Literal(s) => s,
        }
    }
}

/// An opaque worker process: a unique name, named ingress/egress bindings,
/// and a command to invoke it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub ingress: IndexMap<String, Vec<IngressBinding>>,
    pub egress: IndexMap<String, Vec<EgressBinding>>,
    pub stdin_name: Option<String>,
    pub stdout_name: Option<String>,
    pub command: NodeCommand,
    /// Zero-padded topological position, assigned by the topology planner.
    pub label: Option<String>,
}

impl Node {
    pub(crate) fn new(
        name: String,
        ingress: IndexMap<String, IngressBinding>,
        egress: IndexMap<String, EgressBinding>,
        command: NodeCommand,
    ) -> Result<Node, GraphError> {
        if ingress.is_empty() && egress.is_empty() {
            return Err(GraphError::EmptyNode { name });
        }
        let stdin_name = ingress
            .iter()
            .find(|(_, binding)| matches!(binding, IngressBinding::Stdin))
            .map(|(name, _)| name.clone());
        let stdout_name = egress
            .iter()
            .find(|(_, binding)| matches!(binding, EgressBinding::Stdout))
            .map(|(name, _)| name.clone());

        Ok(Node {
            name,
            ingress: ingress
                .into_iter()
                .map(|(key, binding)| (key, vec![binding]))
                .collect(),
            egress: egress
                .into_iter()
                .map(|(key, binding)| (key, vec![binding]))
                .collect(),
            stdin_name,
            stdout_name,
            command,
            label: None,
        })
    }

    pub fn in_degree_capacity(&self) -> usize {
        self.ingress.len()
    }

    pub fn out_degree_capacity(&self) -> usize {
        self.egress.len()
    }
}
