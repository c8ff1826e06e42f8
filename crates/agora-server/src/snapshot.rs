use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use agora_store::Store;

/// Background task that writes the workspace to disk on an interval.
pub async fn run_snapshot_loop(store: Arc<Store>, path: PathBuf, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // First tick fires immediately; nothing has changed yet.
    interval.tick().await;

    loop {
        interval.tick().await;

        match flush(store.clone(), path.clone()).await {
            Ok(()) => debug!("Snapshot written to {}", path.display()),
            Err(e) => warn!("Snapshot error: {:#}", e),
        }
    }
}

/// Runs the blocking file write off the async runtime.
pub async fn flush(store: Arc<Store>, path: PathBuf) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || store.save(&path)).await?
}
