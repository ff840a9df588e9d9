//! Fakes and fixtures shared by the unit tests.
mod fake_cluster;
mod tx_decoder;

use std::path::Path;

pub use fake_cluster::*;
pub use tx_decoder::*;

use crate::RunnerConfig;

/// Small fleet and wallet pool, logs under `dir`, no subnet and no output.
pub fn test_config(
    dir: &Path,
    node_count: usize,
) -> RunnerConfig {
    let mut config = RunnerConfig::default();
    config.cluster.node_count = node_count;
    config.cluster.log_dir = Some(dir.join("logs"));
    config.provision.wallet_count = 2;
    config
}

/// [`test_config`] with the subnet steps enabled and an output file.
pub fn test_config_with_subnet(
    dir: &Path,
    node_count: usize,
) -> RunnerConfig {
    let genesis = dir.join("vm-genesis.json");
    std::fs::write(&genesis, br#"{"data":"genesis"}"#).expect("write VM genesis");

    let mut config = test_config(dir, node_count);
    config.subnet.genesis_path = Some(genesis);
    config.output.path = Some(dir.join("out").join("cluster.json"));
    config
}
