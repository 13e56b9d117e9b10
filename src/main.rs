mod api;
mod config;
mod error;
mod export;
mod inference;
mod ingest;
mod model;
mod pipeline;
mod report;
mod state;
mod types;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::UploadLatency;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::model::{Classifier, LogisticModel};
use crate::state::{SessionStore, SessionSweeper};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Model: loaded once, shared read-only by every request ---
    let model: Arc<dyn Classifier> = Arc::new(LogisticModel::load(&cfg.model_path)?);
    info!(
        "Model ready: {} v{} from {}",
        model.name(),
        model.version(),
        cfg.model_path
    );

    // --- Per-session results + TTL sweeper ---
    let sessions = SessionStore::new();
    let sweeper = SessionSweeper::new(Arc::clone(&sessions), cfg.session_ttl);
    tokio::spawn(async move { sweeper.run().await });
    info!(
        "Session results expire after {}s idle",
        cfg.session_ttl.as_secs()
    );

    // --- HTTP ---
    let state = ApiState {
        model,
        sessions,
        health: Arc::new(HealthState::new()),
        latency: Arc::new(UploadLatency::new()),
        inference_timeout: cfg.inference_timeout,
        max_upload_bytes: cfg.max_upload_bytes,
    };
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(
        "Dashboard listening on {bind_addr} (max upload {} bytes, inference timeout {}s)",
        cfg.max_upload_bytes,
        cfg.inference_timeout.as_secs()
    );

    axum::serve(listener, app).await?;
    Ok(())
}
