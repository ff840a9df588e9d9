use tracing::info;

use super::Provisioner;
use crate::util::random_name;
use crate::Chain;
use crate::FixtureMismatch;
use crate::PrivateKey;
use crate::Result;
use crate::Wallet;

impl Provisioner {
    /// Creates one extra X and P address per node, each confirmed on the
    /// node that created it.
    pub(super) async fn create_secondary_addresses(&mut self) -> Result<()> {
        for node in self.view.nodes() {
            for chain in [Chain::X, Chain::P] {
                let address = self
                    .guard("create address", node.client.create_address(chain, &self.user))
                    .await?;
                self.confirm_address(node, chain, &address).await?;
                info!(node = %node.name, %chain, %address, "created secondary address");

                let table = match chain {
                    Chain::X => &mut self.x_secondary,
                    _ => &mut self.p_secondary,
                };
                table.insert(node.name.clone(), address);
            }
        }
        Ok(())
    }

    /// Generates the wallet pool and imports every key on every node.
    ///
    /// All nodes must map a key to the same address on a given chain.
    pub(super) async fn create_wallets(&mut self) -> Result<()> {
        let provision = &self.config.provision;
        let mut wallets: Vec<Wallet> = (0..provision.wallet_count)
            .map(|_| Wallet::new(random_name(provision.wallet_name_len), PrivateKey::generate()))
            .collect();

        for wallet in wallets.iter_mut() {
            self.import_wallet(wallet).await?;
        }

        for wallet in &wallets {
            for node in self.view.nodes() {
                for chain in [Chain::X, Chain::P] {
                    self.confirm_address(node, chain, wallet.address(chain)?).await?;
                }
            }
        }

        for wallet in wallets.iter_mut() {
            self.fetch_balances(wallet).await?;
        }

        info!("created {} wallets", wallets.len());
        self.wallets = wallets;
        Ok(())
    }

    async fn import_wallet(
        &self,
        wallet: &mut Wallet,
    ) -> Result<()> {
        for node in self.view.nodes() {
            for chain in Chain::ALL {
                let address = self
                    .guard(
                        "import wallet key",
                        node.client.import_key(chain, &self.user, wallet.key.encoded()),
                    )
                    .await?;
                match wallet.known_address(chain) {
                    Some(known) if known != address => {
                        return Err(FixtureMismatch::WalletAddress {
                            wallet: wallet.name.clone(),
                            chain,
                            node: node.name.clone(),
                            got: address,
                            expected: known.to_string(),
                        }
                        .into());
                    }
                    Some(_) => {}
                    None => {
                        info!(wallet = %wallet.name, %chain, %address, "imported wallet key");
                        wallet.set_address(chain, address);
                    }
                }
            }
        }
        Ok(())
    }
}
