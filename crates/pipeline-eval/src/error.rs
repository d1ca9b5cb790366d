use std::path::PathBuf;

use pipeline_graph::GraphError;
use pipeline_topology::PlanError;
use thiserror::Error;

/// Errors raised while planning or running a fixture evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("no path from `{source}` to `{sink}` in the graph")]
    NoPath { source: String, sink: String },

    #[error("fixture index {index_file} produced no usable bundles")]
    EmptyIndex { index_file: String },

    #[error("fixture bundle for `{component}` is missing its `SRC` entry")]
    MissingSource { component: String },

    #[error("fixture path `{path}` has no file name to copy it under")]
    InvalidFixturePath { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
