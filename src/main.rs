use anyhow::Result;
use clap::Parser;
use ordledger::cli::{init_tracing, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.run().await
}
