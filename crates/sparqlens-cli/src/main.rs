use anyhow::Result;
use clap::Parser;
use sparqlens_cli::{Cli, init_tracing, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(output) = run(&cli).await? {
        print!("{output}");
    }

    Ok(())
}
