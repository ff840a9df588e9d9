//! Races readiness, interrupts and orchestration errors.

use std::future::pending;
use std::future::Future;

use tracing::error;
use tracing::info;

use super::Orchestrator;
use super::RunnerHandle;
use crate::Result;

/// Starts `orchestrator` and drives it until `interrupt` resolves or the run
/// fails.
pub async fn run<F>(
    orchestrator: Orchestrator,
    interrupt: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let handle = orchestrator.start()?;
    drive(&handle, interrupt).await
}

/// Before readiness: an error ends the run with that error, an interrupt
/// ends it successfully. After readiness the cluster is left running until
/// interrupted, even once provisioning has finished. Every exit path shuts
/// the runner down.
pub async fn drive<F>(
    handle: &RunnerHandle,
    interrupt: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let error_rx = handle.take_errors();
    let errors = async move {
        if let Some(rx) = error_rx {
            if let Ok(e) = rx.await {
                return e;
            }
        }
        // No error can arrive any more.
        pending().await
    };
    tokio::pin!(errors);
    tokio::pin!(interrupt);

    let mut ready_rx = handle.ready();
    let ready = async move {
        if ready_rx.wait_for(|ready| *ready).await.is_err() {
            pending::<()>().await;
        }
    };

    tokio::select! {
        biased;
        e = &mut errors => {
            error!("failed before the cluster became ready: {}", e);
            handle.shutdown().await;
            return Err(e);
        }
        _ = &mut interrupt => {
            info!("interrupted before the cluster became ready");
            handle.shutdown().await;
            return Ok(());
        }
        _ = ready => {
            info!("cluster is healthy; interrupt to stop");
        }
    }

    let outcome = tokio::select! {
        biased;
        e = &mut errors => {
            error!("run failed: {}", e);
            Err(e)
        }
        _ = &mut interrupt => {
            info!("interrupt received");
            Ok(())
        }
    };
    handle.shutdown().await;
    outcome
}
