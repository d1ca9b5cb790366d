use clap::Parser;
use eyre::Result;
use pipeline_cli::{errors, logging, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    errors::setup(&cli.error_details)?;
    logging::setup(cli.log_level, &cli.log_filter, cli.log_format)?;

    cli.run().await
}
