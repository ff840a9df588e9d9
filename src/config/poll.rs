use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Timing of every confirmation wait.
///
/// The interval is constant; the runner never backs off.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Deadline for tx, address, subnet and blockchain confirmations
    #[serde(default = "default_tx_confirm_timeout_ms")]
    pub tx_confirm_timeout_ms: u64,

    /// Deadline for the whole fleet to report healthy
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            tx_confirm_timeout_ms: default_tx_confirm_timeout_ms(),
            health_timeout_ms: default_health_timeout_ms(),
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<()> {
        if self.check_interval_ms == 0 {
            return Err(Error::InvalidConfig("check_interval_ms must be > 0".into()));
        }

        if self.tx_confirm_timeout_ms < self.check_interval_ms {
            return Err(Error::InvalidConfig(format!(
                "tx_confirm_timeout_ms ({}) must not be shorter than check_interval_ms ({})",
                self.tx_confirm_timeout_ms, self.check_interval_ms
            )));
        }

        if self.health_timeout_ms == 0 {
            return Err(Error::InvalidConfig("health_timeout_ms must be > 0".into()));
        }

        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn tx_confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.tx_confirm_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }
}

fn default_check_interval_ms() -> u64 {
    1_000
}
fn default_tx_confirm_timeout_ms() -> u64 {
    60_000
}
fn default_health_timeout_ms() -> u64 {
    120_000
}
