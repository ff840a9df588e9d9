//! Persisted cluster record.
//!
//! Written once at the end of a successful run, owner read/write only, then
//! read back and echoed so the operator can copy the values out of the log.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::file_io::write_with_mode;
use crate::file_io::OWNER_RW;
use crate::Chain;
use crate::OutputError;
use crate::Result;
use crate::Wallet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: String,
    /// nAVAX
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub name: String,
    /// `PrivateKey-<cb58>`
    pub private_key: String,
    pub private_key_hex: String,
    /// EVM hex address shared by every EVM-style chain
    pub common_address: String,
    pub x_chain: Account,
    pub p_chain: Account,
    pub c_chain: Account,
}

impl From<&Wallet> for WalletInfo {
    fn from(wallet: &Wallet) -> Self {
        let account = |chain: Chain| Account {
            address: wallet.known_address(chain).unwrap_or_default().to_string(),
            balance: wallet.balance(chain),
        };
        Self {
            name: wallet.name.clone(),
            private_key: wallet.key.encoded().to_string(),
            private_key_hex: hex::encode(wallet.key.as_bytes()),
            common_address: wallet.known_address(Chain::C).unwrap_or_default().to_string(),
            x_chain: account(Chain::X),
            p_chain: account(Chain::P),
            c_chain: account(Chain::C),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    /// Node URIs in lexicographic order
    pub uris: Vec<String>,
    /// `/ext/bc/<blockchain-id>`, absent when no blockchain was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub pid: u32,
    pub logs_dir: PathBuf,
    /// node name -> address
    pub x_chain_secondary_addresses: BTreeMap<String, String>,
    pub p_chain_secondary_addresses: BTreeMap<String, String>,
    pub genesis_wallet: WalletInfo,
    pub wallets: Vec<WalletInfo>,
}

impl ClusterInfo {
    pub fn save(
        &self,
        path: &Path,
    ) -> Result<()> {
        let buf = serde_json::to_vec_pretty(self).map_err(OutputError::from)?;
        write_with_mode(path, &buf, OWNER_RW).map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved cluster info to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let buf = std::fs::read(path).map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&buf).map_err(OutputError::from)?)
    }

    /// Saves, reads the file back and prints it to stdout.
    pub fn write_and_echo(
        &self,
        path: &Path,
    ) -> Result<ClusterInfo> {
        self.save(path)?;
        let loaded = Self::load(path)?;
        let pretty = serde_json::to_string_pretty(&loaded).map_err(OutputError::from)?;
        println!("cat {}", path.display());
        println!("{pretty}");
        Ok(loaded)
    }
}
