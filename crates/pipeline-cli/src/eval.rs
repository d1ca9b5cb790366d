//! `pipeline eval` -- run the evaluation planner against a testset, one
//! one-shot plan per fixture bundle per component.

use std::path::PathBuf;

use clap::Parser;
use eyre::{eyre, Result};
use pipeline_eval::{plan_evaluations, run_reaper};
use pipeline_topology::PortPool;
use tracing::{info, warn};

use crate::graph_description::{build_graph, GraphDescription};
use crate::json_fixture_index::JsonFixtureIndex;

#[derive(Debug, Parser)]
pub struct Cli {
    /// Path to a JSON or YAML graph description, with `components` declared.
    graph_description: PathBuf,

    /// Host-visible directory evaluation logs and outputs are written under.
    #[arg(long)]
    host_dir: PathBuf,

    /// Container-visible mirror of `host_dir`, recorded for logging only --
    /// the evaluation planner itself only ever touches `host_dir`.
    #[arg(long)]
    container_dir: PathBuf,

    /// Directory fixture index files and their referenced source media are
    /// resolved relative to.
    #[arg(long)]
    testset_dir: PathBuf,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let description = GraphDescription::load(&self.graph_description)?;
        let (graph, _ids) = build_graph(&description)?;

        let mut pool = PortPool::new();
        let index = JsonFixtureIndex::new(self.testset_dir.clone());

        info!(container_dir = %self.container_dir.display(), "evaluation host/container directory mapping");

        for component in graph.components() {
            let eval_dir = self.host_dir.join(&component.name);
            std::fs::create_dir_all(&eval_dir)?;

            let plans = plan_evaluations(&graph, component, &index, &eval_dir, &mut pool)?;
            for eval_plan in plans {
                info!(fixture = %eval_plan.fixture_name, "running evaluation fixture");
                let out_path = eval_plan.out_path.clone();
                let logs_dir = eval_plan.launch_plan.logs_dir.clone();

                let mut run_handle = tokio::spawn(pipeline_launch::run(eval_plan.launch_plan));

                tokio::select! {
                    result = &mut run_handle => {
                        result.map_err(|err| eyre!("evaluation fixture task panicked: {err}"))??;
                    }
                    _ = run_reaper(out_path, || async move {
                        warn!(logs = %logs_dir.display(), "evaluation fixture idle for 30s, shutting it down");
                    }) => {
                        run_handle.abort();
                    }
                }
            }
        }
        Ok(())
    }
}
