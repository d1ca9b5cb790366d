//! The orchestrator author's declarative surface: a CLI that loads a graph
//! description, drives the planner crates, and either prints, executes, or
//! evaluates the resulting launch plan -- plus a standalone entry point for
//! the diarization merger.

pub mod cli;
pub mod errors;
pub mod eval;
pub mod graph_description;
pub mod json_fixture_index;
pub mod logging;
pub mod merge;
pub mod plan;
pub mod run;

pub use cli::{Cli, Command};
