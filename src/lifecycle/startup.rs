//! Store opening and background upkeep tasks.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::auth::AuthService;
use crate::config::StorageConfig;
use crate::observability::metrics;
use crate::store::{StoreResult, UserStore, WalletStore, USERS_FILE, WALLETS_FILE};

/// Open both stores. Without a data directory they are memory-only.
pub fn open_stores(config: &StorageConfig) -> StoreResult<(UserStore, WalletStore)> {
    match &config.data_dir {
        Some(dir) => {
            let dir = Path::new(dir);
            std::fs::create_dir_all(dir)?;
            let users = UserStore::load_from_file(&dir.join(USERS_FILE))?;
            let wallets = WalletStore::load_from_file(&dir.join(WALLETS_FILE))?;
            tracing::info!(
                data_dir = %dir.display(),
                users = users.len(),
                wallets = wallets.wallet_count(),
                "Stores opened"
            );
            Ok((users, wallets))
        }
        None => {
            tracing::warn!("No data_dir configured, records will not survive a restart");
            Ok((UserStore::new(None), WalletStore::new(None)))
        }
    }
}

/// Snapshot both stores. Failures are logged, not propagated.
pub fn save_stores(users: &UserStore, wallets: &WalletStore) {
    if let Err(e) = users.save_to_file() {
        tracing::error!(error = %e, "Failed to save users");
    }
    if let Err(e) = wallets.save_to_file() {
        tracing::error!(error = %e, "Failed to save wallets");
    }
}

/// Run `save_stores` on the blocking pool so file IO stays off the runtime.
async fn flush_stores(users: &UserStore, wallets: &WalletStore) {
    let (users, wallets) = (users.clone(), wallets.clone());
    if let Err(e) = tokio::task::spawn_blocking(move || save_stores(&users, &wallets)).await {
        tracing::error!(error = %e, "Store flush task failed");
    }
}

/// Periodically snapshot the stores until shutdown, then save once more.
pub fn spawn_flush_task(
    users: UserStore,
    wallets: WalletStore,
    interval_secs: u64,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if interval_secs == 0 {
            let _ = shutdown_rx.recv().await;
        } else {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => flush_stores(&users, &wallets).await,
                    _ = shutdown_rx.recv() => break,
                }
            }
        }
        flush_stores(&users, &wallets).await;
        tracing::info!("Stores flushed on shutdown");
    })
}

/// Drop expired revocation entries on an interval until shutdown.
pub fn spawn_prune_task(
    auth: Arc<AuthService>,
    interval_secs: u64,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    auth.prune_revoked();
                    metrics::record_revoked_tokens(auth.blacklist().len());
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    })
}
