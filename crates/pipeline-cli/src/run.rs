//! `pipeline run` -- plan and execute a graph description in one step.

use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use pipeline_launch::{emit, LaunchMode};
use pipeline_topology::{plan as plan_topology, PortPool};

use crate::graph_description::{build_graph, GraphDescription};

#[derive(Debug, Parser)]
pub struct Cli {
    /// Path to a JSON or YAML graph description.
    graph_description: PathBuf,

    /// Replace the trailing log tail with an idle `tail -f /dev/null`, for
    /// running as a foreground container process without log noise.
    #[arg(long)]
    silent: bool,

    /// Run the terminal RUNNING/FREE port monitor instead of tailing logs.
    #[arg(long, conflicts_with = "silent")]
    monitor: bool,

    /// Directory the launch plan's logs are rooted under.
    #[arg(long, default_value = "logs")]
    logs_dir: PathBuf,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let description = GraphDescription::load(&self.graph_description)?;
        let (graph, _ids) = build_graph(&description)?;
        let preamble = graph.preamble().to_string();

        let mode = if self.silent {
            LaunchMode::Silent
        } else if self.monitor {
            LaunchMode::Monitor
        } else {
            LaunchMode::Tail
        };

        let mut pool = PortPool::new();
        let planned = plan_topology(graph, &mut pool)?;
        let launch_plan = emit(planned, self.logs_dir, preamble, mode, &mut pool)?;
        pipeline_launch::run(launch_plan).await?;
        Ok(())
    }
}
