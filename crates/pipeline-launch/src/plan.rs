use std::path::PathBuf;

use pipeline_graph::{EdgeType, GraphError};
use pipeline_topology::ProxyStep;
use serde::{Deserialize, Serialize};

/// How the emitted plan's epilogue should behave once the concurrent body
/// is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchMode {
    /// Follow every worker's `.err` log (the default).
    Tail,
    /// Run the terminal RUNNING/FREE port monitor.
    Monitor,
    /// Keep the process tree alive without surfacing logs (`--silent`).
    Silent,
    /// No epilogue program at all; used by the evaluation planner, which
    /// appends its own idle-timeout reaper instead.
    None,
}

impl LaunchMode {
    pub fn parse(given: &str) -> Result<LaunchMode, GraphError> {
        match given {
            "tail" => Ok(LaunchMode::Tail),
            "monitor" => Ok(LaunchMode::Monitor),
            "silent" => Ok(LaunchMode::Silent),
            "none" => Ok(LaunchMode::None),
            other => Err(GraphError::UnsupportedMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// How an edge's payload is logged as it passes through its pipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeLog {
    pub edge_type: EdgeType,
    pub path: PathBuf,
}

/// One worker invocation, with its concrete stdin/stdout wiring and log
/// destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerStep {
    pub label: String,
    pub name: String,
    pub command: String,
    pub stdin_port: Option<u16>,
    pub stdout_fanout_ports: Vec<u16>,
    pub pid_file: PathBuf,
    pub err_log: PathBuf,
}

/// One inter-node pipe lowered from a graph edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgePipeStep {
    pub from_port: u16,
    pub to_port: u16,
    pub log: Option<EdgeLog>,
}

/// A node announced as an external entry point: no incoming edges, a
/// `stdin` input, and at least one outgoing edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrypointInfo {
    pub node_name: String,
    pub stdin_port: u16,
}

/// One step of a materialized launch plan. A [`LaunchPlan`] is an ordered
/// sequence of these; the whole sequence is a value with no I/O baked in --
/// only `pipeline_launch::runner` interprets it against real processes and
/// sockets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LaunchStep {
    Prologue { logs_dir: PathBuf },
    Preamble(String),
    Proxy(ProxyStep),
    Worker(WorkerStep),
    EdgePipe(EdgePipeStep),
    Entrypoints(Vec<EntrypointInfo>),
    Epilogue { mode: LaunchMode, component_count: usize },
}

/// The full materialized plan for one graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchPlan {
    pub steps: Vec<LaunchStep>,
    pub logs_dir: PathBuf,
    pub mode: LaunchMode,
}
