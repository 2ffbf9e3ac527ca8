//! Command-line interface

use clap::{Parser, Subcommand};

use crate::server::{AppState, ServerConfig};

#[derive(Parser)]
#[command(name = "scorecast", about = "Student-performance dataset preparation and model serving")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a raw CSV from the raw-data area into a clean numeric table
    Prepare {
        /// File name inside the raw-data directory
        filename: String,
    },
    /// Train both candidate models on an encoded CSV and persist the best
    Train {
        /// File name inside the processed-data directory
        filename: String,
    },
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

pub fn cmd_prepare(config: &ServerConfig, filename: &str) -> anyhow::Result<()> {
    let state = AppState::new(config);
    let (_, summary) = state.encoder.prepare(filename)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub fn cmd_train(config: &ServerConfig, filename: &str) -> anyhow::Result<()> {
    let state = AppState::new(config);
    let report = state.trainer.train_and_persist(filename)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn cmd_serve(
    mut config: ServerConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    crate::server::run_server(config).await
}
