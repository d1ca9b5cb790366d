//! Lowers a planned graph into a concrete [`LaunchPlan`] and, optionally,
//! executes it: spawning worker processes and wiring the loopback TCP
//! plumbing (proxies and edge pipes) that connects them.
//!
//! The emitter (`emit`) is pure; the executor (`runner`) is the only part of
//! this crate that touches the filesystem, the network, or a child process.

mod emit;
mod error;
mod plan;
mod runner;

pub use emit::emit;
pub use error::RunError;
pub use plan::{EdgeLog, EdgePipeStep, EntrypointInfo, LaunchMode, LaunchPlan, LaunchStep, WorkerStep};
pub use runner::run;
