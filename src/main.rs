use anyhow::Result;
use clap::Parser;

use whydig::cli;
use whydig::session::launch;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let config = args.into_config();

    launch(&config).await
}
