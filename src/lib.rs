//! Local multi-node cluster runner.
//!
//! Launches a fleet of nodes, waits for it to become healthy, provisions
//! keystore users, funded wallets, cross-chain transfers and an optional
//! subnet with a custom blockchain, then writes the cluster record to disk
//! and keeps the fleet running until interrupted.

mod cluster;
mod config;
pub mod constants;
mod errors;
mod runner;
pub mod utils;

pub use cluster::*;
pub use config::*;
pub use errors::*;
pub use runner::*;
pub use utils::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
