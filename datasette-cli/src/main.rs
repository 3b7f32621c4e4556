use anyhow::Result;
use clap::Parser;

use datasette_cli::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    cli::run(Cli::parse()).await
}
