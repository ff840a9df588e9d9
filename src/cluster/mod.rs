//! Fleet-facing side of the runner: the launcher/network/node traits, the
//! local process supervisor and the JSON-RPC node client.

mod api;
pub mod certs;
pub(crate) mod codec;
pub mod command;
pub mod local;
pub mod rpc;
pub mod tx;
mod types;
pub mod utxo;

pub use api::*;
pub use certs::StakingCert;
pub use local::LocalLauncher;
pub use local::LocalNetwork;
pub use rpc::JsonRpcClient;
pub use types::*;

#[cfg(test)]
mod rpc_test;
