use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::RunnerHandle;
use crate::Network;

/// Holds the launched fleet until someone stops it.
#[derive(Default)]
pub(crate) struct Fleet {
    slot: Mutex<Option<Arc<dyn Network>>>,
}

impl Fleet {
    pub(crate) fn install(
        &self,
        network: Arc<dyn Network>,
    ) {
        *self.slot.lock() = Some(network);
    }

    /// Stops the fleet if it is still installed. Stop failures are logged.
    pub(crate) async fn stop_once(&self) {
        let network = self.slot.lock().take();
        let Some(network) = network else {
            return;
        };
        info!("stopping cluster");
        match network.stop().await {
            Ok(()) => info!("cluster stopped"),
            Err(e) => warn!("failed to stop cluster: {}", e),
        }
    }
}

impl RunnerHandle {
    /// Cancels the run, stops the fleet and waits for the background task.
    ///
    /// Safe to call repeatedly and from several tasks at once.
    pub async fn shutdown(&self) {
        if !self.stop_logged.swap(true, Ordering::SeqCst) {
            info!("shutting down");
        }
        self.cancel.cancel();
        self.fleet.stop_once().await;

        {
            let mut task = self.task.lock().await;
            if let Some(join) = task.take() {
                match join.await {
                    Ok(()) => debug!("runner task exited"),
                    Err(e) => error!("runner task failed: {}", e),
                }
            }
        }

        // The launch may have completed while we were waiting on the task.
        self.fleet.stop_once().await;
    }
}
