use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_VM_ID;
use crate::Error;
use crate::Result;

/// Custom subnet + blockchain provisioned after the transfers.
///
/// The steps only run when both a VM id and a genesis file are configured.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubnetConfig {
    #[serde(default = "default_vm_name")]
    pub vm_name: String,

    #[serde(default = "default_vm_id")]
    pub vm_id: String,

    #[serde(default)]
    pub genesis_path: Option<PathBuf>,

    #[serde(default = "default_validator_weight")]
    pub validator_weight: u64,

    /// Validation starts this long after the validator tx is issued
    #[serde(default = "default_validator_start_delay_secs")]
    pub validator_start_delay_secs: u64,

    #[serde(default = "default_validator_duration_secs")]
    pub validator_duration_secs: u64,
}

impl Default for SubnetConfig {
    fn default() -> Self {
        Self {
            vm_name: default_vm_name(),
            vm_id: default_vm_id(),
            genesis_path: None,
            validator_weight: default_validator_weight(),
            validator_start_delay_secs: default_validator_start_delay_secs(),
            validator_duration_secs: default_validator_duration_secs(),
        }
    }
}

impl SubnetConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled() {
            return Ok(());
        }

        if self.vm_name.is_empty() {
            return Err(Error::InvalidConfig(
                "vm_name is required when a subnet is provisioned".into(),
            ));
        }

        if self.validator_weight == 0 {
            return Err(Error::InvalidConfig("validator_weight must be > 0".into()));
        }

        if self.validator_duration_secs == 0 {
            return Err(Error::InvalidConfig("validator_duration_secs must be > 0".into()));
        }

        Ok(())
    }

    /// True when the subnet/blockchain steps should run.
    pub fn enabled(&self) -> bool {
        !self.vm_id.is_empty() && self.genesis_path.is_some()
    }

    pub fn validator_start_delay(&self) -> Duration {
        Duration::from_secs(self.validator_start_delay_secs)
    }

    pub fn validator_duration(&self) -> Duration {
        Duration::from_secs(self.validator_duration_secs)
    }
}

fn default_vm_name() -> String {
    "timestampvm".to_string()
}
fn default_vm_id() -> String {
    DEFAULT_VM_ID.to_string()
}
fn default_validator_weight() -> u64 {
    50
}
fn default_validator_start_delay_secs() -> u64 {
    30
}
fn default_validator_duration_secs() -> u64 {
    30 * 24 * 60 * 60
}
