use thiserror::Error;

/// Errors raised while building or validating a [`crate::Graph`].
///
/// Every variant is raised synchronously during construction and is never
/// recovered from; a caller that receives one should abort planning rather
/// than attempt to patch the graph up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node was declared with neither inputs nor outputs.
    #[error("node `{name}` has no inputs or outputs")]
    EmptyNode { name: String },

    /// An edge referenced a port name that the node did not declare.
    #[error("node `{node}` does not have a `{port}` {direction}")]
    UnknownPort {
        node: String,
        port: String,
        direction: &'static str,
    },

    /// An edge type string was not one of `text`, `binary`, `none`.
    #[error("unsupported edge type: `{given}`")]
    BadType { given: String },

    /// `add_simple_edge` was used on a node with more than one port.
    #[error("node `{node}` has more than one {direction}; use add_edge and specify it")]
    Ambiguous { node: String, direction: &'static str },

    /// A node has more than one incoming edge landing on the same input name.
    ///
    /// The runtime model has no merge primitive: multiple producers into one
    /// input must be externally arbitrated (e.g. by an `octocat`-style
    /// multiplexer stage).
    #[error(
        "multiple incoming edges to input(s) [{inputs}] of node `{node}`; did you mean to use an external multiplexer?"
    )]
    FanInConflict { node: String, inputs: String },

    /// A `Component` was declared with a kind outside `{asr, mt, smt}`.
    #[error("component `{name}` has unsupported kind: `{kind}`")]
    UnsupportedComponentKind { name: String, kind: String },

    /// A launch mode string was not one of `tail`, `monitor`, `silent`, `none`.
    #[error("unsupported pipeline mode: `{mode}`")]
    UnsupportedMode { mode: String },

    /// A command template referenced a variable that was not supplied.
    #[error("command template for node `{node}` references undefined variable `{key}`")]
    TemplateVar { node: String, key: String },
}
