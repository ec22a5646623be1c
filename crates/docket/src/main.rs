use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    dispatch(cli.command).await
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Ingest(args) => cli::ingest::run(args).await,
        Commands::List { db } => cli::list::run(db.as_deref()).await,
        Commands::History { limit, db } => cli::history::run(limit, db.as_deref()).await,
        Commands::Clear { yes, db } => cli::clear::run(yes, db.as_deref()).await,
    }
}
