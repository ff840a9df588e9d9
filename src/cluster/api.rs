//! Seams between the orchestration core and the supervised fleet.
//!
//! The core only talks to [`ClusterLauncher`], [`Network`] and [`NodeApi`];
//! the local process supervisor and the JSON-RPC client are one
//! implementation of each.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::AddValidatorRequest;
use crate::Blockchain;
use crate::BlockchainStatus;
use crate::Chain;
use crate::CreateBlockchainRequest;
use crate::CreateSubnetRequest;
use crate::LaunchSpec;
use crate::NodeSpec;
use crate::Result;
use crate::SendRequest;
use crate::Subnet;
use crate::TxStatus;
use crate::UserPass;
use crate::Utxo;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterLauncher: Send + Sync {
    /// Starts every node and returns as soon as the processes are spawned.
    async fn launch(
        &self,
        spec: &LaunchSpec,
    ) -> Result<Arc<dyn Network>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Network: Send + Sync {
    /// Resolves once every node reports healthy. Callers bound the wait.
    async fn wait_healthy(&self) -> Result<()>;

    async fn list_nodes(&self) -> Result<Vec<NodeSpec>>;

    /// Stops every node. Calling it on a stopped network is a no-op.
    async fn stop(&self) -> Result<()>;
}

/// Per-node RPC surface.
///
/// Every method is a single request; retrying and confirmation are the
/// caller's business.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NodeApi: Send + Sync {
    async fn create_user(
        &self,
        user: &UserPass,
    ) -> Result<()>;

    /// Imports `private_key` into the user's keystore; returns the chain address.
    async fn import_key(
        &self,
        chain: Chain,
        user: &UserPass,
        private_key: &str,
    ) -> Result<String>;

    async fn create_address(
        &self,
        chain: Chain,
        user: &UserPass,
    ) -> Result<String>;

    async fn list_addresses(
        &self,
        chain: Chain,
        user: &UserPass,
    ) -> Result<Vec<String>>;

    /// Balance in nAVAX
    async fn get_balance(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<u64>;

    /// Issues an X-chain transfer; returns the tx id.
    async fn send(
        &self,
        request: &SendRequest,
    ) -> Result<String>;

    /// Lists UTXOs owned by `addresses`. With `source` set, lists the atomic
    /// UTXOs exported from `source` to `chain`.
    async fn get_utxos(
        &self,
        chain: Chain,
        addresses: &[String],
        source: Option<Chain>,
    ) -> Result<Vec<Utxo>>;

    /// Issues a signed, serialized tx on the X- or P-chain; returns its id.
    async fn issue_tx(
        &self,
        chain: Chain,
        tx: &[u8],
    ) -> Result<String>;

    async fn get_tx_status(
        &self,
        chain: Chain,
        tx_id: &str,
    ) -> Result<TxStatus>;

    /// Returns the tx id, which is also the subnet id.
    async fn create_subnet(
        &self,
        request: &CreateSubnetRequest,
    ) -> Result<String>;

    async fn get_subnets(&self) -> Result<Vec<Subnet>>;

    async fn add_subnet_validator(
        &self,
        request: &AddValidatorRequest,
    ) -> Result<String>;

    /// Returns the tx id, which is also the blockchain id.
    async fn create_blockchain(
        &self,
        request: &CreateBlockchainRequest,
    ) -> Result<String>;

    async fn get_blockchains(&self) -> Result<Vec<Blockchain>>;

    async fn get_blockchain_status(
        &self,
        blockchain_id: &str,
    ) -> Result<BlockchainStatus>;

    /// `chain` is an alias (`X`) or a blockchain id.
    async fn is_bootstrapped(
        &self,
        chain: &str,
    ) -> Result<bool>;

    /// Asset id behind an X-chain asset alias such as `AVAX`.
    async fn get_asset_id(
        &self,
        alias: &str,
    ) -> Result<String>;

    async fn get_blockchain_id(
        &self,
        alias: &str,
    ) -> Result<String>;

    async fn get_node_id(&self) -> Result<String>;
}
