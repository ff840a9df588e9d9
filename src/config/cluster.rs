use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_HTTP_PORT;
use crate::constants::LOCAL_NETWORK_ID;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    /// Number of nodes started by the local launcher
    #[serde(default = "default_node_count")]
    pub node_count: usize,

    /// Path to the node binary
    #[serde(default = "default_avalanchego_path")]
    pub avalanchego_path: PathBuf,

    /// Root log directory; a fresh `runnerlogs*` temp dir is used when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// HTTP port of the first node; node `i` listens on `base + 2 * i`
    #[serde(default = "default_http_port_base")]
    pub http_port_base: u16,

    /// `local`, `mainnet`, `fuji` or a numeric network id
    #[serde(default = "default_network_id")]
    pub network_id: String,

    /// Log level passed to every node process
    #[serde(default = "default_node_log_level")]
    pub node_log_level: String,

    /// Per-request timeout for node RPC calls
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_count: default_node_count(),
            avalanchego_path: default_avalanchego_path(),
            log_dir: None,
            http_port_base: default_http_port_base(),
            network_id: default_network_id(),
            node_log_level: default_node_log_level(),
            rpc_timeout_ms: default_rpc_timeout_ms(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.node_count == 0 {
            return Err(Error::InvalidConfig("node_count must be at least 1".into()));
        }

        let last_port = self.http_port_base as usize + self.node_count * 2;
        if self.http_port_base == 0 || last_port > u16::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "http_port_base {} cannot host {} nodes",
                self.http_port_base, self.node_count
            )));
        }

        if self.avalanchego_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("avalanchego_path cannot be empty".into()));
        }

        if self.rpc_timeout_ms == 0 {
            return Err(Error::InvalidConfig("rpc_timeout_ms must be > 0".into()));
        }

        self.numeric_network_id()?;
        Ok(())
    }

    /// Network id stamped into every locally built transaction.
    pub fn numeric_network_id(&self) -> Result<u32> {
        match self.network_id.as_str() {
            "local" => Ok(LOCAL_NETWORK_ID),
            "mainnet" => Ok(1),
            "fuji" => Ok(5),
            other => other.parse().map_err(|_| {
                Error::InvalidConfig(format!("unknown network_id {other:?}"))
            }),
        }
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn http_port(
        &self,
        index: usize,
    ) -> u16 {
        self.http_port_base + (index as u16) * 2
    }

    pub fn staking_port(
        &self,
        index: usize,
    ) -> u16 {
        self.http_port(index) + 1
    }
}

fn default_node_count() -> usize {
    5
}
fn default_avalanchego_path() -> PathBuf {
    PathBuf::from("avalanchego")
}
fn default_http_port_base() -> u16 {
    DEFAULT_HTTP_PORT
}
fn default_network_id() -> String {
    "local".to_string()
}
fn default_node_log_level() -> String {
    "INFO".to_string()
}
fn default_rpc_timeout_ms() -> u64 {
    10_000
}
