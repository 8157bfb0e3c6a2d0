mod cli;
mod mcp;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stderr keeps stdout free for the stdio transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crud_mcp=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, apps } => {
            cli::run_http_server(&cli.db, &host, port, &apps).await?;
        }
        Commands::Stdio { apps } => {
            cli::run_stdio_server(&cli.db, &apps).await?;
        }
        Commands::Scan { apps } => {
            cli::scan(&cli.db, &apps)?;
        }
    }

    Ok(())
}
