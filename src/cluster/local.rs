//! Local fleet supervisor: one child process per node on the loopback interface.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::certs::write_staking_key_pair;
use crate::command::Bootstrap;
use crate::command::NodeCommand;
use crate::constants::HEALTH_PATH;
use crate::constants::HEALTH_PROBE_INTERVAL_MS;
use crate::constants::NODE_CONFIG_FILE;
use crate::constants::NODE_NAME_PREFIX;
use crate::ClusterError;
use crate::ClusterLauncher;
use crate::JsonRpcClient;
use crate::LaunchSpec;
use crate::Network;
use crate::NodeSpec;
use crate::Result;
use crate::RpcError;

/// Starts a [`LocalNetwork`].
#[derive(Debug, Default, Clone)]
pub struct LocalLauncher;

#[async_trait]
impl ClusterLauncher for LocalLauncher {
    async fn launch(
        &self,
        spec: &LaunchSpec,
    ) -> Result<Arc<dyn Network>> {
        let network = LocalNetwork::start(spec)?;
        Ok(Arc::new(network))
    }
}

pub struct LocalNetwork {
    nodes: Vec<NodeSpec>,
    children: Mutex<Vec<(String, Child)>>,
    http: reqwest::Client,
}

/// Per-node config file contents.
pub fn node_config(
    log_dir: &Path,
    log_level: &str,
    whitelisted_subnets: &[String],
) -> Value {
    json!({
        "network-peer-list-gossip-frequency": "250ms",
        "network-max-reconnect-delay": "1s",
        "public-ip": "127.0.0.1",
        "health-check-frequency": "2s",
        "api-admin-enabled": true,
        "api-ipcs-enabled": true,
        "index-enabled": true,
        "log-display-level": log_level,
        "log-level": log_level,
        "log-dir": log_dir.display().to_string(),
        "whitelisted-subnets": whitelisted_subnets.join(","),
    })
}

fn prepare_err(path: &Path) -> impl FnOnce(std::io::Error) -> ClusterError + '_ {
    move |source| ClusterError::Prepare {
        path: path.to_path_buf(),
        source,
    }
}

impl LocalNetwork {
    /// Writes certs and config for every node and spawns the processes.
    ///
    /// Node 1 is the bootstrap beacon for the others. Children are killed
    /// when dropped, so a failure halfway through leaves nothing behind.
    pub fn start(spec: &LaunchSpec) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(spec.rpc_timeout).build().map_err(|source| {
            RpcError::Transport {
                method: "health".to_string(),
                endpoint: HEALTH_PATH.to_string(),
                source,
            }
        })?;

        let mut nodes = Vec::with_capacity(spec.node_count);
        let mut children = Vec::with_capacity(spec.node_count);
        let mut bootstrap: Option<Bootstrap> = None;

        for index in 0..spec.node_count {
            let name = format!("{NODE_NAME_PREFIX}{}", index + 1);
            let node_dir = spec.logs_dir.join(&name);
            let staking_dir = node_dir.join("staking");
            std::fs::create_dir_all(&staking_dir).map_err(prepare_err(&staking_dir))?;

            let cert = write_staking_key_pair(
                &staking_dir.join("staker.key"),
                &staking_dir.join("staker.crt"),
            )?;

            let config_path = node_dir.join(NODE_CONFIG_FILE);
            let config = node_config(
                &node_dir.join("logs"),
                &spec.node_log_level,
                &spec.whitelisted_subnets,
            );
            std::fs::write(&config_path, config.to_string()).map_err(prepare_err(&config_path))?;

            let http_port = spec.http_port_base + (index as u16) * 2;
            let command = NodeCommand::new(
                name.clone(),
                &spec.binary,
                &spec.network_id,
                &spec.node_log_level,
                http_port,
                http_port + 1,
                spec.node_count,
                &node_dir.join("db"),
                &cert,
                bootstrap.as_ref(),
            )
            .arg("config-file", config_path.display().to_string());

            if bootstrap.is_none() {
                bootstrap = Some(Bootstrap {
                    ip: format!("127.0.0.1:{}", command.staking_port),
                    node_id: cert.node_id.clone(),
                });
            }

            let child = spawn_node(&command)?;
            info!(node = %name, node_id = %cert.node_id, uri = %command.uri(), "spawned node");

            let uri = command.uri();
            nodes.push(NodeSpec {
                name: name.clone(),
                node_id: cert.node_id,
                client: Arc::new(JsonRpcClient::new(uri.clone(), spec.rpc_timeout)?),
                uri,
            });
            children.push((name, child));
        }

        Ok(Self {
            nodes,
            children: Mutex::new(children),
            http,
        })
    }

    async fn is_healthy(
        &self,
        node: &NodeSpec,
    ) -> bool {
        let url = format!("{}{}", node.uri, HEALTH_PATH);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(node = %node.name, status = %response.status(), "node not healthy yet");
                false
            }
            Err(e) => {
                debug!(node = %node.name, "health check failed: {}", e);
                false
            }
        }
    }
}

fn spawn_node(command: &NodeCommand) -> Result<Child> {
    let mut child = Command::new(&command.binary)
        .args(command.to_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ClusterError::Launch {
            node: command.name.clone(),
            source,
        })?;

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_output(command.name.clone(), stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_output(command.name.clone(), stderr));
    }
    Ok(child)
}

/// Re-emits every line a node prints as a tracing event tagged with its name.
async fn forward_output<R>(
    node: String,
    stream: R,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => info!(node = %node, "{}", line),
            Ok(None) => break,
            Err(e) => {
                warn!(node = %node, "stopped reading node output: {}", e);
                break;
            }
        }
    }
}

#[async_trait]
impl Network for LocalNetwork {
    async fn wait_healthy(&self) -> Result<()> {
        loop {
            {
                let mut children = self.children.lock().await;
                for (name, child) in children.iter_mut() {
                    let exited = child.try_wait().map_err(|source| ClusterError::Launch {
                        node: name.clone(),
                        source,
                    })?;
                    if let Some(status) = exited {
                        error!(node = %name, %status, "node exited");
                        return Err(ClusterError::NodeExited {
                            node: name.clone(),
                            status: status.to_string(),
                        }
                        .into());
                    }
                }
            }

            let checks = join_all(self.nodes.iter().map(|node| self.is_healthy(node))).await;
            let healthy = checks.into_iter().filter(|ok| *ok).count();
            if healthy == self.nodes.len() {
                info!("all {} nodes healthy", healthy);
                return Ok(());
            }
            debug!("{}/{} nodes healthy", healthy, self.nodes.len());

            tokio::time::sleep(Duration::from_millis(HEALTH_PROBE_INTERVAL_MS)).await;
        }
    }

    async fn list_nodes(&self) -> Result<Vec<NodeSpec>> {
        Ok(self.nodes.clone())
    }

    async fn stop(&self) -> Result<()> {
        let mut children = self.children.lock().await;
        let mut first_error = None;

        for (name, mut child) in children.drain(..) {
            if let Ok(Some(status)) = child.try_wait() {
                debug!(node = %name, %status, "node already exited");
                continue;
            }
            match child.kill().await {
                Ok(()) => info!(node = %name, "node stopped"),
                Err(source) => {
                    error!(node = %name, "failed to stop node: {}", source);
                    first_error.get_or_insert(ClusterError::Stop { node: name, source });
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
