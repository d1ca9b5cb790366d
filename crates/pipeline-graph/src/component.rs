use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::NodeId;

/// The family of external fixture evaluation a [`Component`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Asr,
    Mt,
    Smt,
}

impl ComponentKind {
    pub fn parse(given: &str) -> Result<ComponentKind, String> {
        match given {
            "asr" => Ok(ComponentKind::Asr),
            "mt" => Ok(ComponentKind::Mt),
            "smt" => Ok(ComponentKind::Smt),
            other => Err(other.to_string()),
        }
    }
}

/// A named sub-region of the graph where the evaluation planner splices in
/// file-driven fixtures: `sourceNode.sourceInput` is where decoded fixture
/// bytes enter, `targetNode.targetOutput` is where the result is collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub source_node: NodeId,
    pub source_input: String,
    pub target_node: NodeId,
    pub target_output: String,
    pub index_file: String,
    pub kind: ComponentKind,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        source_node: NodeId,
        source_input: impl Into<String>,
        target_node: NodeId,
        target_output: impl Into<String>,
        index_file: impl Into<String>,
        kind: &str,
    ) -> Result<Component, GraphError> {
        let name = name.into();
        let kind = ComponentKind::parse(kind).map_err(|kind| GraphError::UnsupportedComponentKind {
            name: name.clone(),
            kind,
        })?;
        Ok(Component {
            name,
            source_node,
            source_input: source_input.into(),
            target_node,
            target_output: target_output.into(),
            index_file: index_file.into(),
            kind,
        })
    }
}
