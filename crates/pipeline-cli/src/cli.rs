use clap::{Parser, Subcommand};
use eyre::Result;

use crate::logging::{LoggingFormat, LoggingLevel};
use crate::{eval, merge, plan, run};

/// CLI subcommands and global options for the dataflow pipeline
/// orchestrator.
#[derive(Debug, Parser)]
#[command(name = "pipeline", author, version, about = "Dataflow pipeline orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// The minimum log level to output
    #[arg(long, default_value = "info", global = true)]
    pub log_level: LoggingLevel,

    /// An additional `EnvFilter` directive string for other crates, e.g.
    /// `tokio=debug`.
    #[arg(long, default_value = "", global = true)]
    pub log_filter: String,

    /// The log format to use. `auto` is `pretty` on a terminal and `json`
    /// otherwise.
    #[arg(long, default_value = "auto", global = true)]
    pub log_format: LoggingFormat,

    /// The details to include in error reports: `auto`, `all`, `none`, or a
    /// comma-separated list of `location`, `span`, `env`.
    #[arg(long, default_value = "auto", global = true)]
    pub error_details: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a graph description and print or execute its launch plan
    Plan(plan::Cli),
    /// Plan and execute a graph description in one step
    Run(run::Cli),
    /// Run the evaluation planner against a testset
    Eval(eval::Cli),
    /// Run the diarization merger standalone
    Merge(merge::Cli),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Plan(cli) => cli.run().await,
            Command::Run(cli) => cli.run().await,
            Command::Eval(cli) => cli.run().await,
            Command::Merge(cli) => cli.run().await,
        }
    }
}
