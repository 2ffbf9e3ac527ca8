//! HTTP service
//!
//! Thin axum layer over the encoder, trainer, and predictor. Each
//! request runs its operation to completion before responding; the only
//! internal parallelism is rayon inside forest fitting.

mod api;
mod error;
mod handlers;

pub use api::create_router;
pub use error::ServerError;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::data::DatasetEncoder;
use crate::model::{Predictor, Trainer};
use crate::schema::EncodingSchema;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let raw_dir = PathBuf::from(
            std::env::var("RAW_DATA_DIR").unwrap_or_else(|_| "data/raw".to_string()),
        );
        let processed_dir = PathBuf::from(
            std::env::var("PROCESSED_DATA_DIR").unwrap_or_else(|_| "data/processed".to_string()),
        );
        let model_path = processed_dir.join("model.json");
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            raw_dir,
            processed_dir,
            model_path,
        }
    }
}

/// Shared application state: the three operation handles, all stateless
/// beyond their configured paths.
pub struct AppState {
    pub encoder: DatasetEncoder,
    pub trainer: Trainer,
    pub predictor: Predictor,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let schema = EncodingSchema::student_performance();
        let target = schema.target.clone();
        Self {
            encoder: DatasetEncoder::new(
                schema,
                config.raw_dir.clone(),
                config.processed_dir.clone(),
            ),
            trainer: Trainer::new(
                config.processed_dir.clone(),
                config.model_path.clone(),
                target,
            ),
            predictor: Predictor::new(config.model_path.clone()),
        }
    }
}

/// Start the server with the given configuration.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.raw_dir)?;
    std::fs::create_dir_all(&config.processed_dir)?;

    let state = Arc::new(AppState::new(&config));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        raw_dir = %config.raw_dir.display(),
        processed_dir = %config.processed_dir.display(),
        model_path = %config.model_path.display(),
        address = %addr,
        "scorecast server starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "listening (press ctrl+c to stop)");

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        info!("shutdown signal received, stopping");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("server shut down cleanly");
    Ok(())
}
