//! Background task that launches the fleet, waits for it to become healthy,
//! provisions it and writes the cluster record.

use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::shutdown::Fleet;
use crate::constants::LOGS_DIR_PREFIX;
use crate::util::random_name;
use crate::ClusterConfig;
use crate::ClusterLauncher;
use crate::Error;
use crate::HealthWaiter;
use crate::LaunchSpec;
use crate::OutputError;
use crate::PollError;
use crate::Provisioner;
use crate::Result;
use crate::RunnerConfig;
use crate::RunnerState;

/// Returns the configured log directory, or creates a fresh
/// `runnerlogs<random>` directory under the system temp dir.
pub fn resolve_logs_dir(cluster: &ClusterConfig) -> Result<PathBuf> {
    let dir = match &cluster.log_dir {
        Some(dir) => dir.clone(),
        None => std::env::temp_dir().join(format!("{LOGS_DIR_PREFIX}{}", random_name(8))),
    };
    std::fs::create_dir_all(&dir).map_err(|source| OutputError::Io {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Capacity-one slot: the first recorded error wins, later ones are logged
/// and dropped. Cancellation is never recorded.
pub(crate) struct ErrorSlot {
    tx: Mutex<Option<oneshot::Sender<Error>>>,
    cancel: CancellationToken,
}

impl ErrorSlot {
    pub(crate) fn new(
        tx: oneshot::Sender<Error>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
            cancel,
        }
    }

    pub(crate) fn record(
        &self,
        e: Error,
    ) {
        if e.is_cancelled() || self.cancel.is_cancelled() {
            debug!("not recording error after stop: {}", e);
            return;
        }
        let sender = self.tx.lock().take();
        match sender {
            Some(tx) => {
                error!("run aborted: {}", e);
                if let Err(e) = tx.send(e) {
                    warn!("error receiver is gone, dropping: {}", e);
                }
            }
            None => warn!("dropping later error: {}", e),
        }
    }
}

pub struct Orchestrator {
    config: Arc<RunnerConfig>,
    launcher: Arc<dyn ClusterLauncher>,
}

impl Orchestrator {
    pub fn new(
        config: RunnerConfig,
        launcher: Arc<dyn ClusterLauncher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            launcher,
        }
    }

    /// Spawns the background task and hands back its control surface.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Result<RunnerHandle> {
        let logs_dir = resolve_logs_dir(&self.config.cluster)?;
        info!("logs directory: {}", logs_dir.display());

        let cancel = CancellationToken::new();
        let (ready_tx, ready_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(RunnerState::Starting);
        let (error_tx, error_rx) = oneshot::channel();
        let fleet = Arc::new(Fleet::default());

        let task = RunnerTask {
            config: self.config,
            launcher: self.launcher,
            logs_dir: logs_dir.clone(),
            cancel: cancel.clone(),
            ready: ready_tx,
            state: state_tx,
            errors: ErrorSlot::new(error_tx, cancel.clone()),
            fleet: fleet.clone(),
        };
        let join = tokio::spawn(task.run());

        Ok(RunnerHandle {
            cancel,
            ready: ready_rx,
            state: state_rx,
            errors: Mutex::new(Some(error_rx)),
            fleet,
            task: tokio::sync::Mutex::new(Some(join)),
            logs_dir,
            stop_logged: AtomicBool::new(false),
        })
    }
}

/// Shared between the driver, the signal listener and the background task.
pub struct RunnerHandle {
    pub(super) cancel: CancellationToken,
    pub(super) ready: watch::Receiver<bool>,
    pub(super) state: watch::Receiver<RunnerState>,
    pub(super) errors: Mutex<Option<oneshot::Receiver<Error>>>,
    pub(super) fleet: Arc<Fleet>,
    pub(super) task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    pub(super) logs_dir: PathBuf,
    pub(super) stop_logged: AtomicBool,
}

impl RunnerHandle {
    /// Flips to `true` once, when every node is healthy.
    pub fn ready(&self) -> watch::Receiver<bool> {
        self.ready.clone()
    }

    pub fn state(&self) -> watch::Receiver<RunnerState> {
        self.state.clone()
    }

    /// The first-error receiver. Only the first caller gets it.
    pub fn take_errors(&self) -> Option<oneshot::Receiver<Error>> {
        self.errors.lock().take()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }
}

struct RunnerTask {
    config: Arc<RunnerConfig>,
    launcher: Arc<dyn ClusterLauncher>,
    logs_dir: PathBuf,
    cancel: CancellationToken,
    ready: watch::Sender<bool>,
    state: watch::Sender<RunnerState>,
    errors: ErrorSlot,
    fleet: Arc<Fleet>,
}

impl RunnerTask {
    async fn run(self) {
        if let Err(e) = self.drive().await {
            self.set_state(RunnerState::Aborting);
            self.errors.record(e);
        }
    }

    async fn drive(&self) -> Result<()> {
        self.set_state(RunnerState::Starting);
        let spec = self.launch_spec();
        info!(
            nodes = spec.node_count,
            binary = %spec.binary.display(),
            "launching cluster"
        );
        let network = self.launcher.launch(&spec).await?;
        self.fleet.install(network.clone());
        self.checkpoint("launch")?;

        self.set_state(RunnerState::WaitingHealthy);
        let waiter =
            HealthWaiter::new(network, self.config.poll.health_timeout(), self.cancel.clone());
        let view = waiter.wait(&self.ready).await?;

        self.set_state(RunnerState::Provisioning);
        let mut provisioner = Provisioner::new(self.config.clone(), view, self.cancel.clone());
        provisioner.run_all().await?;
        self.checkpoint("provisioning")?;

        self.set_state(RunnerState::WritingOutput);
        let info = provisioner.cluster_info(&self.logs_dir)?;
        match &self.config.output.path {
            Some(path) => {
                info.write_and_echo(path)?;
            }
            None => info!("no output path configured, skipping cluster info"),
        }

        self.set_state(RunnerState::Done);
        info!("cluster is up; waiting for interrupt");
        Ok(())
    }

    fn launch_spec(&self) -> LaunchSpec {
        let cluster = &self.config.cluster;
        let whitelisted_subnets = self.config.fixture.expected_subnet().map(str::to_string);
        LaunchSpec {
            node_count: cluster.node_count,
            binary: cluster.avalanchego_path.clone(),
            logs_dir: self.logs_dir.clone(),
            http_port_base: cluster.http_port_base,
            network_id: cluster.network_id.clone(),
            node_log_level: cluster.node_log_level.clone(),
            whitelisted_subnets: whitelisted_subnets.into_iter().collect(),
            rpc_timeout: cluster.rpc_timeout(),
        }
    }

    fn checkpoint(
        &self,
        after: &str,
    ) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(PollError::Cancelled {
                what: after.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn set_state(
        &self,
        state: RunnerState,
    ) {
        let previous = self.state.send_replace(state);
        if previous != state {
            info!(from = %previous, to = %state, "runner state");
        }
    }
}
