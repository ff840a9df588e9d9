use serde::Deserialize;
use serde::Serialize;

use crate::constants::MILLI_AVAX;
use crate::constants::NANO_AVAX_PER_AVAX;
use crate::Error;
use crate::Result;

/// Wallet pool size and transfer amounts. All amounts are in nAVAX.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProvisionConfig {
    #[serde(default = "default_wallet_count")]
    pub wallet_count: usize,

    /// Length of the random wallet display names
    #[serde(default = "default_wallet_name_len")]
    pub wallet_name_len: usize,

    /// Sent from the genesis X address to the first wallet
    #[serde(default = "default_transfer_amount")]
    pub transfer_amount: u64,

    /// Moved by the first wallet from the X-chain to the P-chain
    #[serde(default = "default_export_amount")]
    pub export_amount: u64,

    #[serde(default = "default_tx_fee")]
    pub tx_fee: u64,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            wallet_count: default_wallet_count(),
            wallet_name_len: default_wallet_name_len(),
            transfer_amount: default_transfer_amount(),
            export_amount: default_export_amount(),
            tx_fee: default_tx_fee(),
        }
    }
}

impl ProvisionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.wallet_count == 0 {
            return Err(Error::InvalidConfig(
                "wallet_count must be at least 1 (transfers target the first wallet)".into(),
            ));
        }

        if self.wallet_name_len == 0 {
            return Err(Error::InvalidConfig("wallet_name_len must be > 0".into()));
        }

        if self.transfer_amount == 0 {
            return Err(Error::InvalidConfig("transfer_amount must be > 0".into()));
        }

        if self.export_amount.saturating_add(self.tx_fee) >= self.transfer_amount {
            return Err(Error::InvalidConfig(format!(
                "export_amount ({}) plus tx_fee ({}) must stay below transfer_amount ({})",
                self.export_amount, self.tx_fee, self.transfer_amount
            )));
        }

        Ok(())
    }
}

fn default_wallet_count() -> usize {
    5
}
fn default_wallet_name_len() -> usize {
    10
}
fn default_transfer_amount() -> u64 {
    100_000 * NANO_AVAX_PER_AVAX
}
fn default_export_amount() -> u64 {
    50_000 * NANO_AVAX_PER_AVAX
}
fn default_tx_fee() -> u64 {
    MILLI_AVAX
}
