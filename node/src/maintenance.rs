//! Periodic housekeeping: the expiry sweep followed by the storage budget.

use std::sync::Arc;
use std::time::Duration;

use econexus_governance::{CleanupReport, ProposalStore, StorageReport};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    pub cleanup: CleanupReport,
    pub storage: StorageReport,
}

/// One maintenance pass. Sweeping runs first so compaction measures the
/// store after expired proposals are gone.
pub fn run_maintenance(store: &ProposalStore) -> MaintenanceReport {
    let cleanup = store.cleanup_expired();
    let storage = store.enforce_storage_limits();
    if cleanup.removed_count > 0 || storage.cleaned() {
        tracing::info!(
            removed = cleanup.removed_count,
            kept = cleanup.kept_count,
            compacted = storage.cleaned(),
            "maintenance pass changed the store"
        );
    } else {
        tracing::debug!(kept = cleanup.kept_count, "maintenance pass: nothing to do");
    }
    MaintenanceReport { cleanup, storage }
}

/// Run [`run_maintenance`] every `period` until a shutdown signal arrives.
/// The first pass runs immediately.
pub fn spawn_maintenance(
    store: Arc<ProposalStore>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::info!("maintenance task shutting down");
                    break;
                }
                _ = interval.tick() => {
                    run_maintenance(&store);
                }
            }
        }
    })
}
