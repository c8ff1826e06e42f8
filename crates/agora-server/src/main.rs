mod config;
mod snapshot;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use agora_api::auth::{AppState, AppStateInner};
use agora_core::{JwtAuth, Messaging};
use agora_store::Store;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Load the workspace snapshot
    let store = Arc::new(Store::open(&config.data_path)?);

    // Shared state
    let jwt = Arc::new(JwtAuth::new(config.jwt_secret.clone(), config.token_ttl_days));
    let messaging = Messaging::start(store.clone(), jwt.clone());
    let app_state: AppState = Arc::new(AppStateInner { messaging, jwt });

    tokio::spawn(snapshot::run_snapshot_loop(
        store.clone(),
        config.data_path.clone(),
        config.snapshot_secs,
    ));

    let app = agora_api::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Agora server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Final flush so nothing accepted since the last tick is lost.
    snapshot::flush(store, config.data_path.clone()).await?;
    info!("Snapshot written to {}", config.data_path.display());

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable ({}), waiting for Ctrl+C only", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
