use tracing::debug;
use tracing::info;

use super::Provisioner;
use crate::BlockchainStatus;
use crate::Chain;
use crate::NodeHandle;
use crate::Result;
use crate::TxStatus;

impl Provisioner {
    /// Polls `node` until `tx_id` reaches the chain's final status.
    ///
    /// Non-final statuses, including `Rejected`, keep polling until the deadline.
    pub(super) async fn confirm_tx(
        &self,
        node: &NodeHandle,
        chain: Chain,
        tx_id: &str,
    ) -> Result<()> {
        let want = chain.final_status();
        let client = &node.client;
        let name = node.name.as_str();
        let what = format!("{chain}-chain tx {tx_id} on {name}");

        let want_ref = &want;
        self.poller
            .poll_until(&what, move || async move {
                let status = client.get_tx_status(chain, tx_id).await?;
                if &status == want_ref {
                    return Ok(Some(()));
                }
                if status == TxStatus::Rejected || status == TxStatus::Dropped {
                    debug!(node = %name, %chain, tx_id, ?status, "tx not accepted");
                }
                Ok(None)
            })
            .await?;
        info!(node = %name, %chain, tx_id, "confirmed {:?}", want);
        Ok(())
    }

    pub(super) async fn confirm_tx_everywhere(
        &self,
        chain: Chain,
        tx_id: &str,
    ) -> Result<()> {
        for node in self.view.nodes() {
            self.confirm_tx(node, chain, tx_id).await?;
        }
        Ok(())
    }

    /// Polls `node` until `address` shows up in the user's listed addresses.
    pub(super) async fn confirm_address(
        &self,
        node: &NodeHandle,
        chain: Chain,
        address: &str,
    ) -> Result<()> {
        let client = &node.client;
        let user = &self.user;
        let what = format!("{chain}-chain address {address} on {}", node.name);

        self.poller
            .poll_until(&what, move || async move {
                let listed = client.list_addresses(chain, user).await?;
                Ok(listed.iter().any(|a| a == address).then_some(()))
            })
            .await?;
        debug!(node = %node.name, %chain, address, "address listed");
        Ok(())
    }

    pub(super) async fn confirm_subnet(
        &self,
        node: &NodeHandle,
        subnet_id: &str,
    ) -> Result<()> {
        let client = &node.client;
        let what = format!("subnet {subnet_id} on {}", node.name);

        self.poller
            .poll_until(&what, move || async move {
                let subnets = client.get_subnets().await?;
                Ok(subnets.iter().any(|s| s.id == subnet_id).then_some(()))
            })
            .await?;
        info!(node = %node.name, subnet_id, "subnet visible");
        Ok(())
    }

    /// Blockchain listed under `subnet_id` with id `blockchain_id` and status `Validating`.
    pub(super) async fn confirm_blockchain(
        &self,
        node: &NodeHandle,
        subnet_id: &str,
        blockchain_id: &str,
    ) -> Result<()> {
        let client = &node.client;
        let name = node.name.as_str();

        self.poller
            .poll_until(
                &format!("blockchain {blockchain_id} listed on {name}"),
                move || async move {
                    let chains = client.get_blockchains().await?;
                    Ok(chains
                        .iter()
                        .any(|b| b.id == blockchain_id && b.subnet_id == subnet_id)
                        .then_some(()))
                },
            )
            .await?;

        self.poller
            .poll_until(
                &format!("blockchain {blockchain_id} validating on {name}"),
                move || async move {
                    let status = client.get_blockchain_status(blockchain_id).await?;
                    if status != BlockchainStatus::Validating {
                        debug!(node = %name, blockchain_id, ?status, "blockchain not validating yet");
                        return Ok(None);
                    }
                    Ok(Some(()))
                },
            )
            .await?;
        info!(node = %name, blockchain_id, "blockchain validating");
        Ok(())
    }

    pub(super) async fn confirm_bootstrapped(
        &self,
        node: &NodeHandle,
        chain: &str,
    ) -> Result<()> {
        let client = &node.client;
        let what = format!("{chain} bootstrapped on {}", node.name);

        self.poller
            .poll_until(&what, move || async move {
                Ok(client.is_bootstrapped(chain).await?.then_some(()))
            })
            .await?;
        info!(node = %node.name, chain, "bootstrapped");
        Ok(())
    }
}
