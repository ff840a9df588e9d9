use tracing::info;

use super::Provisioner;
use crate::time::get_duration_since_epoch;
use crate::tx::decode_id;
use crate::tx::spend_all;
use crate::tx::BaseTx;
use crate::tx::TransferOutput;
use crate::tx::UnsignedTx;
use crate::tx::PLATFORM_CHAIN_ID;
use crate::Chain;
use crate::ProvisionError;
use crate::Result;
use crate::SendRequest;
use crate::Utxo;

const TRANSFER_MEMO: &str = "hi!";

/// UTXOs picked to cover an amount plus the fee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSelection {
    pub inputs: Vec<Utxo>,
    pub total: u64,
}

/// Takes `asset_id` UTXOs that `owner` alone can spend at `now`, in order,
/// until their sum exceeds `target + fee`. A zero `target` takes every
/// matching UTXO.
pub fn select_inputs(
    utxos: &[Utxo],
    asset_id: &str,
    owner: &[u8; 20],
    now: u64,
    target: u64,
    fee: u64,
) -> InputSelection {
    let needed = target.saturating_add(fee);
    let mut selection = InputSelection::default();
    let spendable = utxos
        .iter()
        .filter(|u| u.asset_id == asset_id && u.spendable_by(owner, now));
    for utxo in spendable {
        if target != 0 && selection.total > needed {
            break;
        }
        selection.total = selection.total.saturating_add(utxo.amount);
        selection.inputs.push(utxo.clone());
    }
    selection
}

impl Provisioner {
    /// Sends `transfer_amount` from the genesis X address to the first wallet.
    pub(super) async fn transfer_to_wallet(&self) -> Result<()> {
        let genesis = self.genesis()?;
        let wallet = self.first_wallet()?;
        let from = genesis.address(Chain::X)?.to_string();
        let to = wallet.address(Chain::X)?.to_string();
        let amount = self.config.provision.transfer_amount;

        let node = self.view.first();
        let request = SendRequest {
            user: self.user.clone(),
            from: vec![from.clone()],
            change_addr: from,
            to: to.clone(),
            amount,
            memo: TRANSFER_MEMO.to_string(),
        };
        let tx_id = self.guard("send to wallet", node.client.send(&request)).await?;
        info!(node = %node.name, %to, amount, %tx_id, "issued X-chain transfer");

        self.confirm_tx(node, Chain::X, &tx_id).await?;
        Ok(())
    }

    /// Moves `export_amount` of the first wallet from its X address to its
    /// P address: an export built from the selected X-chain inputs, then an
    /// import of the resulting atomic UTXOs. Both are signed with the wallet
    /// key and issued as raw txs.
    pub(super) async fn export_import(&self) -> Result<()> {
        let provision = &self.config.provision;
        let fee = provision.tx_fee;
        let amount = provision.export_amount;
        let network_id = self.config.cluster.numeric_network_id()?;
        let asset_id = self.view.meta.avax_asset_id.as_str();
        let node = self.view.first();

        let wallet = self.first_wallet()?;
        let owner = wallet.key.short_address()?;
        let x_address = wallet.address(Chain::X)?.to_string();
        let p_address = wallet.address(Chain::P)?.to_string();
        let now = get_duration_since_epoch().as_secs();

        let utxos = self
            .guard(
                "list X-chain utxos",
                node.client.get_utxos(Chain::X, std::slice::from_ref(&x_address), None),
            )
            .await?;
        let selection = select_inputs(&utxos, asset_id, &owner, now, amount, fee);
        let needed = amount.saturating_add(fee);
        if selection.total < needed {
            return Err(ProvisionError::InsufficientFunds {
                wallet: wallet.name.clone(),
                chain: Chain::X,
                needed,
                available: selection.total,
            }
            .into());
        }
        info!(
            wallet = %wallet.name,
            inputs = selection.inputs.len(),
            total = selection.total,
            "selected X-chain inputs for export"
        );

        let asset = decode_id(asset_id)?;
        let x_chain = decode_id(&self.view.meta.x_chain_id)?;
        let change = selection.total - needed;
        let export = UnsignedTx::Export {
            base: BaseTx {
                network_id,
                blockchain_id: x_chain,
                outputs: (change > 0)
                    .then(|| TransferOutput::owned_by(asset, change, owner))
                    .into_iter()
                    .collect(),
                inputs: spend_all(&selection.inputs, &owner)?,
                memo: Vec::new(),
            },
            destination_chain: PLATFORM_CHAIN_ID,
            exported: vec![TransferOutput::owned_by(asset, amount, owner)],
        }
        .sign(&wallet.key)?;
        let tx_id = self
            .guard("export X to P", node.client.issue_tx(Chain::X, &export.bytes))
            .await?;
        info!(node = %node.name, %tx_id, amount, change, "issued export");
        self.confirm_tx_everywhere(Chain::X, &tx_id).await?;

        let client = &node.client;
        let owners = std::slice::from_ref(&p_address);
        let atomic = self
            .poller
            .poll_until(&format!("atomic utxos for {p_address}"), move || async move {
                let utxos = client.get_utxos(Chain::P, owners, Some(Chain::X)).await?;
                let selection = select_inputs(&utxos, asset_id, &owner, now, 0, 0);
                Ok((!selection.inputs.is_empty()).then_some(selection))
            })
            .await?;
        if atomic.total <= fee {
            return Err(ProvisionError::InsufficientFunds {
                wallet: wallet.name.clone(),
                chain: Chain::P,
                needed: fee.saturating_add(1),
                available: atomic.total,
            }
            .into());
        }
        let imported = atomic.total - fee;
        info!(
            wallet = %wallet.name,
            inputs = atomic.inputs.len(),
            amount = imported,
            "importing atomic utxos on the P-chain"
        );

        let import = UnsignedTx::Import {
            base: BaseTx {
                network_id,
                blockchain_id: PLATFORM_CHAIN_ID,
                outputs: vec![TransferOutput::owned_by(asset, imported, owner)],
                inputs: Vec::new(),
                memo: Vec::new(),
            },
            source_chain: x_chain,
            imported: spend_all(&atomic.inputs, &owner)?,
        }
        .sign(&wallet.key)?;
        let tx_id = self
            .guard("import X to P", node.client.issue_tx(Chain::P, &import.bytes))
            .await?;
        info!(node = %node.name, %tx_id, "issued import");
        self.confirm_tx_everywhere(Chain::P, &tx_id).await?;
        Ok(())
    }
}
