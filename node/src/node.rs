//! The DAO node: owns the LMDB environment, the proposal store and the
//! background maintenance task.

use std::sync::Arc;

use tokio::task::JoinHandle;

use econexus_governance::ProposalStore;
use econexus_store::KvStore;
use econexus_store_lmdb::LmdbEnvironment;
use econexus_types::{Clock, SystemClock};

use crate::config::NodeConfig;
use crate::maintenance::{run_maintenance, spawn_maintenance, MaintenanceReport};
use crate::shutdown::ShutdownController;
use crate::NodeError;

pub struct DaoNode {
    config: NodeConfig,
    env: Arc<LmdbEnvironment>,
    store: Arc<ProposalStore>,
    shutdown: ShutdownController,
    task_handles: Vec<JoinHandle<()>>,
}

impl DaoNode {
    /// Open the node's storage under `config.data_dir` using wall-clock time.
    pub fn open(config: NodeConfig) -> Result<Self, NodeError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Open with an injected clock.
    pub fn with_clock(config: NodeConfig, clock: Arc<dyn Clock>) -> Result<Self, NodeError> {
        let env = Arc::new(LmdbEnvironment::open(
            &config.data_dir,
            config.map_size_bytes(),
        )?);
        let kv: Arc<dyn KvStore> = env.clone();
        let store = Arc::new(ProposalStore::open(kv, clock, config.store_params())?);

        tracing::info!(
            data_dir = %config.data_dir.display(),
            retention_days = config.retention_days,
            "EcoNexus node opened"
        );

        Ok(Self {
            config,
            env,
            store,
            shutdown: ShutdownController::new(),
            task_handles: Vec::new(),
        })
    }

    pub fn store(&self) -> &Arc<ProposalStore> {
        &self.store
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Number of raw entries in the LMDB environment.
    pub fn entry_count(&self) -> Result<u64, NodeError> {
        Ok(self.env.len()?)
    }

    /// Run a maintenance pass on the calling thread.
    pub fn maintain_now(&self) -> MaintenanceReport {
        run_maintenance(&self.store)
    }

    /// Start background tasks. Must be called from within a tokio runtime.
    /// Does nothing once the node has been stopped.
    pub fn start(&mut self) {
        if self.shutdown.is_triggered() {
            tracing::warn!("node already stopped, not starting background tasks");
            return;
        }
        match self.config.maintenance_interval() {
            Some(period) => {
                let handle =
                    spawn_maintenance(Arc::clone(&self.store), period, self.shutdown.subscribe());
                self.task_handles.push(handle);
                tracing::info!(period_secs = period.as_secs(), "maintenance task started");
            }
            None => tracing::info!("periodic maintenance disabled"),
        }
    }

    /// Stop background tasks and flush the store.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        tracing::info!("EcoNexus node stopping");
        self.shutdown.shutdown();

        for handle in self.task_handles.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "background task failed");
            }
        }

        self.store.flush()?;
        tracing::info!("EcoNexus node stopped");
        Ok(())
    }

    /// Flush without touching background tasks. For one-shot CLI commands.
    pub fn close(&self) -> Result<(), NodeError> {
        self.store.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for DaoNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaoNode")
            .field("data_dir", &self.config.data_dir)
            .field("tasks", &self.task_handles.len())
            .finish()
    }
}
