use clap::Parser;
use gita_gpt::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gita_gpt::logging::init();
    let cli = Cli::parse();
    cli::execute(cli).await
}
