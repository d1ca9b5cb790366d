use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// The kind of payload an edge carries, which determines how the launch
/// plan logs it (see `pipeline-launch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeType {
    Text,
    Binary,
    None,
}

impl EdgeType {
    pub fn parse(given: &str) -> Result<EdgeType, GraphError> {
        match given {
            "text" => Ok(EdgeType::Text),
            "binary" => Ok(EdgeType::Binary),
            "none" => Ok(EdgeType::None),
            other => Err(GraphError::BadType {
                given: other.to_string(),
            }),
        }
    }
}

/// A directed connection between one node's output and another's input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from_output: String,
    pub to_input: String,
    pub name: String,
    pub edge_type: EdgeType,
}

impl Edge {
    pub fn new(from_output: impl Into<String>, to_input: impl Into<String>, edge_type: EdgeType) -> Edge {
        let from_output = from_output.into();
        let to_input = to_input.into();
        let name = format!("{from_output}2{to_input}");
        Edge {
            from_output,
            to_input,
            name,
            edge_type,
        }
    }
}
