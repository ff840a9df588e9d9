//! Ordered provisioning of a healthy cluster.
//!
//! Every step issues its RPCs raced against the stop token and does not
//! return before the preceding confirmation succeeded. The token is checked
//! between steps.

mod confirm;
mod fund;
mod keystore;
mod subnet;
mod transfer;
mod wallets;


pub use transfer::select_inputs;
pub use transfer::InputSelection;

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::ClusterInfo;
use crate::ClusterView;
use crate::PollError;
use crate::Poller;
use crate::ProvisionError;
use crate::Result;
use crate::RunnerConfig;
use crate::UserPass;
use crate::Wallet;
use crate::WalletInfo;

pub struct Provisioner {
    config: Arc<RunnerConfig>,
    user: UserPass,
    view: ClusterView,
    poller: Poller,
    cancel: CancellationToken,

    genesis: Option<Wallet>,
    wallets: Vec<Wallet>,
    /// node name -> secondary X address created on that node
    x_secondary: BTreeMap<String, String>,
    /// node name -> secondary P address created on that node
    p_secondary: BTreeMap<String, String>,
    subnet_id: Option<String>,
    blockchain_id: Option<String>,
}

impl Provisioner {
    pub fn new(
        config: Arc<RunnerConfig>,
        view: ClusterView,
        cancel: CancellationToken,
    ) -> Self {
        let poller = Poller::new(
            config.poll.check_interval(),
            config.poll.tx_confirm_timeout(),
            cancel.clone(),
        );
        let user = UserPass::new(&config.fixture.username, &config.fixture.password);
        Self {
            config,
            user,
            view,
            poller,
            cancel,
            genesis: None,
            wallets: Vec::new(),
            x_secondary: BTreeMap::new(),
            p_secondary: BTreeMap::new(),
            subnet_id: None,
            blockchain_id: None,
        }
    }

    /// Runs every step in order. Subnet, validators and blockchain only run
    /// when a VM id and a genesis file are configured.
    pub async fn run_all(&mut self) -> Result<()> {
        self.checkpoint("create keystore users")?;
        self.create_users().await?;

        self.checkpoint("fund from genesis key")?;
        self.fund_from_genesis().await?;

        self.checkpoint("create secondary addresses")?;
        self.create_secondary_addresses().await?;

        self.checkpoint("create wallets")?;
        self.create_wallets().await?;

        self.checkpoint("transfer to wallet")?;
        self.transfer_to_wallet().await?;

        self.checkpoint("export and import")?;
        self.export_import().await?;
        self.refresh_balances().await?;

        if !self.config.subnet.enabled() {
            info!("no VM genesis configured, skipping subnet and blockchain");
            return Ok(());
        }

        self.checkpoint("create subnet")?;
        self.create_subnet().await?;

        self.checkpoint("add subnet validators")?;
        self.add_subnet_validators().await?;

        self.checkpoint("create blockchain")?;
        self.create_blockchain().await?;

        self.checkpoint("wait for blockchain bootstrap")?;
        self.wait_blockchain_bootstrapped().await?;

        Ok(())
    }

    /// Persisted snapshot of everything provisioned so far.
    pub fn cluster_info(
        &self,
        logs_dir: &Path,
    ) -> Result<ClusterInfo> {
        let genesis = self.genesis.as_ref().ok_or(ProvisionError::Missing("genesis wallet"))?;
        Ok(ClusterInfo {
            uris: self.view.sorted_uris(),
            endpoint: self.blockchain_id.as_ref().map(|id| format!("/ext/bc/{id}")),
            pid: std::process::id(),
            logs_dir: logs_dir.to_path_buf(),
            x_chain_secondary_addresses: self.x_secondary.clone(),
            p_chain_secondary_addresses: self.p_secondary.clone(),
            genesis_wallet: WalletInfo::from(genesis),
            wallets: self.wallets.iter().map(WalletInfo::from).collect(),
        })
    }

    pub fn subnet_id(&self) -> Option<&str> {
        self.subnet_id.as_deref()
    }

    fn checkpoint(
        &self,
        step: &str,
    ) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(PollError::Cancelled {
                what: step.to_string(),
            }
            .into());
        }
        info!(step, "starting step");
        Ok(())
    }

    /// Races a single RPC with the stop token.
    async fn guard<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PollError::Cancelled { what: what.to_string() }.into()),
            result = fut => result,
        }
    }

    fn genesis(&self) -> Result<&Wallet> {
        self.genesis.as_ref().ok_or_else(|| ProvisionError::Missing("genesis wallet").into())
    }

    fn first_wallet(&self) -> Result<&Wallet> {
        self.wallets.first().ok_or_else(|| ProvisionError::Missing("wallet pool").into())
    }
}
