//! Waits for the fleet to become healthy and builds the node table.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::constants::AVAX_SYMBOL;
use crate::ClusterError;
use crate::Network;
use crate::NodeApi;
use crate::NodeSpec;
use crate::PollError;
use crate::Result;

/// A healthy member of the fleet. Read-only once built.
#[derive(Clone)]
pub struct NodeHandle {
    pub name: String,
    pub node_id: String,
    pub uri: String,
    pub client: Arc<dyn NodeApi>,
}

impl From<NodeSpec> for NodeHandle {
    fn from(spec: NodeSpec) -> Self {
        Self {
            name: spec.name,
            node_id: spec.node_id,
            uri: spec.uri,
            client: spec.client,
        }
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("name", &self.name)
            .field("node_id", &self.node_id)
            .field("uri", &self.uri)
            .finish()
    }
}

/// Ids every node agrees on, fetched once from the first node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainMetadata {
    pub avax_asset_id: String,
    pub x_chain_id: String,
    pub c_chain_id: String,
}

/// Healthy fleet: nodes ordered by name plus chain metadata.
#[derive(Debug, Clone)]
pub struct ClusterView {
    nodes: Vec<NodeHandle>,
    pub meta: ChainMetadata,
}

impl ClusterView {
    pub fn new(
        mut nodes: Vec<NodeHandle>,
        meta: ChainMetadata,
    ) -> Result<Self> {
        if nodes.is_empty() {
            return Err(ClusterError::NoNodes.into());
        }
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { nodes, meta })
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    /// Node that issues one-off transactions.
    pub fn first(&self) -> &NodeHandle {
        &self.nodes[0]
    }

    /// Node URIs in lexicographic order.
    pub fn sorted_uris(&self) -> Vec<String> {
        crate::util::sorted(self.nodes.iter().map(|n| n.uri.clone()).collect())
    }
}

pub struct HealthWaiter {
    network: Arc<dyn Network>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl HealthWaiter {
    pub fn new(
        network: Arc<dyn Network>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            network,
            timeout,
            cancel,
        }
    }

    /// Resolves with the complete node table, then flips `ready` to true.
    ///
    /// Nothing is published on failure; the partial table is dropped.
    pub async fn wait(
        &self,
        ready: &watch::Sender<bool>,
    ) -> Result<ClusterView> {
        info!("waiting up to {:?} for the cluster to become healthy", self.timeout);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(cancelled("cluster health"));
            }
            result = tokio::time::timeout(self.timeout, self.network.wait_healthy()) => {
                result.map_err(|_| ClusterError::HealthTimeout(self.timeout))??;
            }
        }

        let specs = self.guard("node list", self.network.list_nodes()).await?;
        let nodes: Vec<NodeHandle> = specs.into_iter().map(NodeHandle::from).collect();
        if nodes.is_empty() {
            return Err(ClusterError::NoNodes.into());
        }
        for node in &nodes {
            info!(node = %node.name, node_id = %node.node_id, uri = %node.uri, "node healthy");
        }

        let first = nodes
            .iter()
            .min_by(|a, b| a.name.cmp(&b.name))
            .map(|n| n.client.clone())
            .ok_or(ClusterError::NoNodes)?;
        let meta = ChainMetadata {
            avax_asset_id: self.guard("AVAX asset id", first.get_asset_id(AVAX_SYMBOL)).await?,
            x_chain_id: self.guard("X-chain id", first.get_blockchain_id("X")).await?,
            c_chain_id: self.guard("C-chain id", first.get_blockchain_id("C")).await?,
        };
        info!(
            avax_asset_id = %meta.avax_asset_id,
            x_chain_id = %meta.x_chain_id,
            c_chain_id = %meta.c_chain_id,
            "fetched chain metadata"
        );

        let view = ClusterView::new(nodes, meta)?;
        ready.send_if_modified(|is_ready| !std::mem::replace(is_ready, true));
        info!("cluster ready with {} nodes", view.nodes().len());
        Ok(view)
    }

    async fn guard<T>(
        &self,
        what: &str,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(cancelled(what)),
            result = fut => result,
        }
    }
}

fn cancelled(what: &str) -> crate::Error {
    PollError::Cancelled {
        what: what.to_string(),
    }
    .into()
}
