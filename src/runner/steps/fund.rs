use tracing::info;

use super::Provisioner;
use crate::Chain;
use crate::FixtureMismatch;
use crate::PrivateKey;
use crate::Result;
use crate::Wallet;

/// Display name of the funded genesis identity
const GENESIS_WALLET_NAME: &str = "ewoq";

impl Provisioner {
    /// Imports the genesis key on every chain of every node and checks each
    /// returned address against the fixture. A mismatch aborts immediately.
    pub(super) async fn fund_from_genesis(&mut self) -> Result<()> {
        let key = PrivateKey::from_encoded(&self.config.fixture.genesis_private_key)?;
        let mut wallet = Wallet::new(GENESIS_WALLET_NAME, key);

        for node in self.view.nodes() {
            for chain in Chain::ALL {
                let address = self
                    .guard(
                        "import genesis key",
                        node.client.import_key(chain, &self.user, wallet.key.encoded()),
                    )
                    .await?;
                let expected = self.config.fixture.expected_address(chain);
                if address != expected {
                    return Err(FixtureMismatch::GenesisAddress {
                        chain,
                        node: node.name.clone(),
                        got: address,
                        expected: expected.to_string(),
                    }
                    .into());
                }
                info!(node = %node.name, %chain, %address, "imported genesis key");
                wallet.set_address(chain, address);
            }
        }

        for node in self.view.nodes() {
            for chain in [Chain::X, Chain::P] {
                self.confirm_address(node, chain, wallet.address(chain)?).await?;
            }
        }

        self.fetch_balances(&mut wallet).await?;
        self.genesis = Some(wallet);
        Ok(())
    }

    /// Reads the wallet's balance on every chain from the first node.
    pub(super) async fn fetch_balances(
        &self,
        wallet: &mut Wallet,
    ) -> Result<()> {
        let node = self.view.first();
        for chain in Chain::ALL {
            let address = wallet.address(chain)?.to_string();
            let balance = self
                .guard("fetch balance", node.client.get_balance(chain, &address))
                .await?;
            info!(wallet = %wallet.name, %chain, %address, balance, "balance");
            wallet.set_balance(chain, balance);
        }
        Ok(())
    }

    /// Refreshes the genesis wallet and every pool wallet.
    pub(super) async fn refresh_balances(&mut self) -> Result<()> {
        let mut genesis = self.genesis()?.clone();
        self.fetch_balances(&mut genesis).await?;
        self.genesis = Some(genesis);

        let mut wallets = std::mem::take(&mut self.wallets);
        let result = async {
            for wallet in wallets.iter_mut() {
                self.fetch_balances(wallet).await?;
            }
            Ok::<(), crate::Error>(())
        }
        .await;
        self.wallets = wallets;
        result
    }
}
