//! Shared re-exports used across the pipeline crates.
//!
//! Following the rest of the workspace's convention of a thin `common` crate,
//! downstream crates depend on this instead of pinning their own versions of
//! widely used third-party crates.

pub use chrono;
pub use clap;
pub use color_eyre;
pub use eyre;
pub use itertools;
pub use thiserror;
pub use tokio;
pub use tracing;

/// Format a `chrono` timestamp the way stderr/log lines are prefixed
/// throughout the launch plan: `[YYYY-MM-DD HH:MM:SS]`.
pub fn timestamp_prefix(now: chrono::DateTime<chrono::Local>) -> String {
    format!("[{}]", now.format("%Y-%m-%d %H:%M:%S"))
}

/// Format a launch timestamp suitable for use as a log directory name:
/// `YYYYMMDD-HHMMSS`.
pub fn launch_timestamp(now: chrono::DateTime<chrono::Local>) -> String {
    now.format("%Y%m%d-%H%M%S").to_string()
}
