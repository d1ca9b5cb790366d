//! Plans one-shot fixture evaluations: splices file-driven source/sink nodes
//! into a cloned subgraph, restricts it to the shortest path between them,
//! and emits a `None`-mode launch plan plus an idle-timeout reaper (§4.4 of
//! the orchestrator design).

mod error;
mod fixture;
mod reaper;
mod splice;

use std::path::{Path, PathBuf};

use pipeline_graph::{Component, Graph};
use pipeline_launch::{emit, LaunchMode, LaunchPlan};
use pipeline_topology::{plan, PortPool};

pub use error::EvalError;
pub use fixture::{copy_fixture_files, FixtureBundle, FixtureIndex, StaticFixtureIndex};
pub use reaper::run_reaper;

/// One evaluation run: a ready-to-execute launch plan, the file its sink
/// node writes to, and the fixture name it was derived from.
#[derive(Debug, Clone)]
pub struct EvalPlan {
    pub launch_plan: LaunchPlan,
    pub out_path: PathBuf,
    pub fixture_name: String,
}

/// Enumerate `component`'s fixtures via `index`, and emit one [`EvalPlan`]
/// per bundle, with logs and outputs rooted under `eval_dir`.
pub fn plan_evaluations(
    graph: &Graph,
    component: &Component,
    index: &dyn FixtureIndex,
    eval_dir: &Path,
    pool: &mut PortPool,
) -> Result<Vec<EvalPlan>, EvalError> {
    let bundles = index.enumerate(Path::new(&component.index_file))?;
    if bundles.is_empty() {
        return Err(EvalError::EmptyIndex {
            index_file: component.index_file.clone(),
        });
    }

    let mut plans = Vec::with_capacity(bundles.len());
    for (i, bundle) in bundles.iter().enumerate() {
        let fixture_name = format!("{}-{i}", component.name);

        let fixture_dir = eval_dir.join(format!("{fixture_name}-fixture"));
        let copied = fixture::copy_fixture_files(bundle, &fixture_dir)?;
        let src = copied.get("SRC").ok_or_else(|| EvalError::MissingSource {
            component: component.name.clone(),
        })?;
        let out_path = eval_dir.join(format!("{fixture_name}.out"));

        let (spliced, out_path) = splice::splice_fixture(graph, component, src, &out_path, &fixture_name)?;
        let planned = plan(spliced, pool)?;
        let logs_dir = eval_dir.join(&fixture_name);
        let launch_plan = emit(planned, logs_dir, String::new(), LaunchMode::None, pool)?;

        plans.push(EvalPlan {
            launch_plan,
            out_path,
            fixture_name,
        });
    }

    Ok(plans)
}
