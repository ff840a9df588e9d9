//! Error hierarchy for the cluster runner.
//!
//! Errors are grouped by the layer that produces them: the supervised fleet,
//! the per-node RPC surface, fixture assertions, confirmation polling,
//! provisioning preconditions and output persistence.

use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;

use crate::Chain;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration source could not be loaded or deserialized
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration loaded but failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Fleet launch, health and supervision failures
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// A single RPC call against a node failed
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Observed value differs from the expected fixture value
    #[error(transparent)]
    Fixture(#[from] FixtureMismatch),

    /// Confirmation wait ended without success
    #[error(transparent)]
    Poll(#[from] PollError),

    /// Provisioning precondition failures
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// Persisting or loading the cluster record failed
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Key, id or UTXO bytes could not be decoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Error {
    /// True when the error only reports that waiting was abandoned.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Poll(PollError::Cancelled { .. }))
    }

    /// Fixture mismatches are configuration errors and must never be retried.
    pub fn is_fixture_mismatch(&self) -> bool {
        matches!(self, Error::Fixture(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Failed to launch node {node}: {source}")]
    Launch {
        node: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Certificate generation failed: {0}")]
    Certificate(String),

    #[error("Node {node} exited before the cluster became healthy ({status})")]
    NodeExited { node: String, status: String },

    #[error("Cluster did not become healthy within {0:?}")]
    HealthTimeout(Duration),

    #[error("Cluster reported no nodes")]
    NoNodes,

    #[error("Failed to stop node {node}: {source}")]
    Stop {
        node: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Request could not be delivered or the response body not read
    #[error("{method} request to {endpoint} failed: {source}")]
    Transport {
        method: String,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Node answered with a JSON-RPC error object
    #[error("{method} returned error {code}: {message}")]
    Server {
        method: String,
        code: i64,
        message: String,
    },

    /// Response did not have the expected shape
    #[error("{method} returned an undecodable response: {reason}")]
    Decode { method: String, reason: String },

    /// Call succeeded at transport level but the node refused the operation
    #[error("{method} was not accepted by the node")]
    Refused { method: String },

    /// The namespace does not support the requested operation
    #[error("{method} is not available on the {chain}-chain")]
    Unsupported { method: &'static str, chain: Chain },
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureMismatch {
    #[error("unexpected {chain}-chain funded address {got:?} in {node} (expected {expected:?})")]
    GenesisAddress {
        chain: Chain,
        node: String,
        got: String,
        expected: String,
    },

    #[error("unexpected {chain}-chain address {got:?} for wallet {wallet} in {node} (expected {expected:?})")]
    WalletAddress {
        wallet: String,
        chain: Chain,
        node: String,
        got: String,
        expected: String,
    },

    #[error("unexpected subnet id {got:?} (expected {expected:?})")]
    SubnetId { got: String, expected: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("timed out after {waited:?} ({attempts} attempts) waiting for {what}")]
    Timeout {
        what: String,
        waited: Duration,
        attempts: u32,
    },

    #[error("aborted while waiting for {what}")]
    Cancelled { what: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("wallet {wallet} holds {available} on the {chain}-chain, {needed} required")]
    InsufficientFunds {
        wallet: String,
        chain: Chain,
        needed: u64,
        available: u64,
    },

    #[error("{0} has not been provisioned yet")]
    Missing(&'static str),

    #[error("utxo {tx_id}:{output_index} cannot be spent by the wallet key")]
    Unspendable { tx_id: String, output_index: u32 },

    #[error("failed to read genesis file {path}: {source}")]
    Genesis {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("invalid base58: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("checksum mismatch")]
    Checksum,

    #[error("input too short: {0} bytes")]
    TooShort(usize),

    #[error("expected prefix {0:?}")]
    MissingPrefix(&'static str),

    #[error("unsupported codec version {0}")]
    CodecVersion(u16),

    #[error("secp256k1: {0}")]
    Secp256k1(#[from] secp256k1::Error),
}
