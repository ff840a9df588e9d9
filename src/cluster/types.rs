use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::WEI_PER_NANO_AVAX;
use crate::NodeApi;

/// The three built-in namespaces of every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Chain {
    /// Exchange chain (UTXO, AVAX transfers)
    X,
    /// Platform chain (staking, subnets, blockchains)
    P,
    /// Contract chain (EVM)
    C,
}

impl Chain {
    pub const ALL: [Chain; 3] = [Chain::X, Chain::P, Chain::C];

    pub fn alias(self) -> &'static str {
        match self {
            Chain::X => "X",
            Chain::P => "P",
            Chain::C => "C",
        }
    }

    /// Status a tx issued on this chain reports once it is final.
    pub fn final_status(self) -> TxStatus {
        match self {
            Chain::P => TxStatus::Committed,
            Chain::X | Chain::C => TxStatus::Accepted,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// Keystore credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPass {
    pub username: String,
    pub password: String,
}

impl UserPass {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for UserPass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("UserPass")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Processing,
    Accepted,
    Committed,
    Rejected,
    Dropped,
    Unknown(String),
}

impl TxStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "Processing" => TxStatus::Processing,
            "Accepted" => TxStatus::Accepted,
            "Committed" => TxStatus::Committed,
            "Rejected" => TxStatus::Rejected,
            "Dropped" => TxStatus::Dropped,
            other => TxStatus::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainStatus {
    Validating,
    Created,
    Preferred,
    Syncing,
    Unknown(String),
}

impl BlockchainStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "Validating" => BlockchainStatus::Validating,
            "Created" => BlockchainStatus::Created,
            "Preferred" => BlockchainStatus::Preferred,
            "Syncing" => BlockchainStatus::Syncing,
            other => BlockchainStatus::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub id: String,
    pub control_keys: Vec<String>,
    pub threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blockchain {
    pub id: String,
    pub name: String,
    pub subnet_id: String,
    pub vm_id: String,
}

/// Unspent secp256k1 transfer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// cb58 id of the producing tx
    pub tx_id: String,
    pub output_index: u32,
    /// cb58 asset id
    pub asset_id: String,
    pub amount: u64,
    pub locktime: u64,
    pub threshold: u32,
    /// 20-byte owner address hashes
    pub addresses: Vec<[u8; 20]>,
}

impl Utxo {
    /// Unlocked at `now` and spendable by the single signature of `owner`.
    pub fn spendable_by(
        &self,
        owner: &[u8; 20],
        now: u64,
    ) -> bool {
        self.locktime <= now && self.threshold == 1 && self.addresses.contains(owner)
    }
}

/// X-chain AVAX transfer signed by the keystore user.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub user: UserPass,
    pub from: Vec<String>,
    pub change_addr: String,
    pub to: String,
    pub amount: u64,
    pub memo: String,
}

#[derive(Debug, Clone)]
pub struct CreateSubnetRequest {
    pub user: UserPass,
    pub from: Vec<String>,
    pub change_addr: String,
    pub control_keys: Vec<String>,
    pub threshold: u32,
}

#[derive(Debug, Clone)]
pub struct AddValidatorRequest {
    pub user: UserPass,
    pub from: Vec<String>,
    pub change_addr: String,
    pub node_id: String,
    pub subnet_id: String,
    /// unix seconds
    pub start_time: u64,
    /// unix seconds
    pub end_time: u64,
    pub weight: u64,
}

#[derive(Debug, Clone)]
pub struct CreateBlockchainRequest {
    pub user: UserPass,
    pub from: Vec<String>,
    pub change_addr: String,
    pub subnet_id: String,
    pub vm_id: String,
    pub fx_ids: Vec<String>,
    pub name: String,
    pub genesis: Vec<u8>,
}

/// One member of the fleet as reported by [`crate::Network::list_nodes`].
#[derive(Clone)]
pub struct NodeSpec {
    pub name: String,
    pub node_id: String,
    pub uri: String,
    pub client: Arc<dyn NodeApi>,
}

impl fmt::Debug for NodeSpec {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("NodeSpec")
            .field("name", &self.name)
            .field("node_id", &self.node_id)
            .field("uri", &self.uri)
            .finish()
    }
}

/// Everything a launcher needs to start the fleet.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub node_count: usize,
    pub binary: PathBuf,
    pub logs_dir: PathBuf,
    pub http_port_base: u16,
    pub network_id: String,
    pub node_log_level: String,
    pub whitelisted_subnets: Vec<String>,
    pub rpc_timeout: Duration,
}

/// Converts an EVM balance in wei to nAVAX, saturating at `u64::MAX`.
pub fn wei_to_nano_avax(wei: u128) -> u64 {
    u64::try_from(wei / WEI_PER_NANO_AVAX).unwrap_or(u64::MAX)
}
