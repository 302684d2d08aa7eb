//! Stop signal shared by the node's background tasks.
//!
//! The daemon parks on [`ShutdownController::wait_for_signal`]; each
//! maintenance loop holds a receiver from [`ShutdownController::subscribe`]
//! and leaves its `select!` when the signal fires. The signal is latched, so
//! [`ShutdownController::is_triggered`] stays true after it has been sent.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::signal;
use tokio::sync::broadcast;

pub struct ShutdownController {
    tx: broadcast::Sender<()>,
    triggered: AtomicBool,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Whether the stop signal has been sent.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Send the stop signal. Only the first call notifies subscribers.
    pub fn shutdown(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        // Zero receivers just means no task was started.
        let _ = self.tx.send(());
    }

    /// Block until Ctrl-C or SIGTERM, then send the stop signal.
    ///
    /// Without a SIGTERM handler the daemon still stops on Ctrl-C.
    pub async fn wait_for_signal(&self) {
        #[cfg(unix)]
        let sigterm = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting on Ctrl-C only");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        let source = tokio::select! {
            _ = signal::ctrl_c() => "SIGINT",
            _ = sigterm => "SIGTERM",
        };
        tracing::info!(signal = source, "stop requested");

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
