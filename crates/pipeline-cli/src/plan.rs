//! `pipeline plan` -- load a graph description, run the planner, and either
//! print the resulting launch plan as JSON or execute it.

use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use pipeline_launch::{emit, LaunchMode, LaunchPlan};
use pipeline_topology::{plan as plan_topology, PortPool};

use crate::graph_description::{build_graph, GraphDescription};

#[derive(Debug, Parser)]
pub struct Cli {
    /// Path to a JSON or YAML graph description.
    graph_description: PathBuf,

    /// The epilogue behavior to plan for: tail, monitor, silent, or none.
    #[arg(long, default_value = "tail")]
    mode: String,

    /// Directory the launch plan's logs are rooted under.
    #[arg(long, default_value = "logs")]
    logs_dir: PathBuf,

    /// Execute the plan immediately instead of printing it as JSON.
    #[arg(long)]
    execute: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let description = GraphDescription::load(&self.graph_description)?;
        let (graph, _ids) = build_graph(&description)?;
        let preamble = graph.preamble().to_string();

        let mut pool = PortPool::new();
        let planned = plan_topology(graph, &mut pool)?;
        let mode = LaunchMode::parse(&self.mode)?;
        let launch_plan = emit(planned, self.logs_dir.clone(), preamble, mode, &mut pool)?;

        if self.execute {
            pipeline_launch::run(launch_plan).await?;
        } else {
            print_plan(&launch_plan)?;
        }
        Ok(())
    }
}

#[allow(clippy::print_stdout)]
fn print_plan(plan: &LaunchPlan) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(plan)?);
    Ok(())
}
