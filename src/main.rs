//! scorecast - Main Entry Point

use clap::Parser;
use scorecast::cli::{cmd_prepare, cmd_serve, cmd_train, Cli, Commands};
use scorecast::server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::default();

    match cli.command {
        Some(Commands::Prepare { filename }) => cmd_prepare(&config, &filename)?,
        Some(Commands::Train { filename }) => cmd_train(&config, &filename)?,
        Some(Commands::Serve { host, port }) => cmd_serve(config, host, port).await?,
        None => cmd_serve(config, None, None).await?,
    }

    Ok(())
}
