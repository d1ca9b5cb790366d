use std::path::PathBuf;

use pipeline_topology::PlanError;
use thiserror::Error;

/// Errors raised while emitting or executing a launch plan.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("failed to create logs directory {path}: {source}")]
    LogsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preamble command exited with {code}")]
    PreambleFailed { code: i32 },

    #[error("failed to spawn worker {name}: {source}")]
    SpawnWorker {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind TCP listener on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error while piping edge data: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker {name} exited with status {status}")]
    WorkerFailed { name: String, status: String },
}
