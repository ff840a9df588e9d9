use tracing::info;

use super::Provisioner;
use crate::time::unix_secs_after;
use crate::AddValidatorRequest;
use crate::Chain;
use crate::CreateBlockchainRequest;
use crate::CreateSubnetRequest;
use crate::FixtureMismatch;
use crate::ProvisionError;
use crate::Result;

impl Provisioner {
    /// Creates a subnet controlled by the genesis P address (threshold 1).
    pub(super) async fn create_subnet(&mut self) -> Result<()> {
        let genesis_p = self.genesis()?.address(Chain::P)?.to_string();
        let node = self.view.first();

        let request = CreateSubnetRequest {
            user: self.user.clone(),
            from: vec![genesis_p.clone()],
            change_addr: genesis_p.clone(),
            control_keys: vec![genesis_p],
            threshold: 1,
        };
        let subnet_id = self.guard("create subnet", node.client.create_subnet(&request)).await?;
        info!(node = %node.name, %subnet_id, "issued subnet creation");

        if let Some(expected) = self.config.fixture.expected_subnet() {
            if subnet_id != expected {
                return Err(FixtureMismatch::SubnetId {
                    got: subnet_id,
                    expected: expected.to_string(),
                }
                .into());
            }
        }

        for node in self.view.nodes() {
            self.confirm_tx(node, Chain::P, &subnet_id).await?;
            self.confirm_subnet(node, &subnet_id).await?;
        }

        self.subnet_id = Some(subnet_id);
        Ok(())
    }

    /// Adds every node as a validator of the subnet.
    pub(super) async fn add_subnet_validators(&self) -> Result<()> {
        let subnet_id = self.subnet()?;
        let genesis_p = self.genesis()?.address(Chain::P)?;
        let subnet = &self.config.subnet;

        for node in self.view.nodes() {
            let start_time = unix_secs_after(subnet.validator_start_delay());
            let end_time = start_time + subnet.validator_duration().as_secs();
            let request = AddValidatorRequest {
                user: self.user.clone(),
                from: vec![genesis_p.to_string()],
                change_addr: genesis_p.to_string(),
                node_id: node.node_id.clone(),
                subnet_id: subnet_id.to_string(),
                start_time,
                end_time,
                weight: subnet.validator_weight,
            };
            let tx_id = self
                .guard("add subnet validator", node.client.add_subnet_validator(&request))
                .await?;
            info!(
                node = %node.name,
                node_id = %node.node_id,
                %tx_id,
                start_time,
                end_time,
                "issued subnet validator"
            );
            self.confirm_tx(node, Chain::P, &tx_id).await?;
        }
        Ok(())
    }

    /// Creates the VM blockchain on the subnet from the configured genesis file.
    pub(super) async fn create_blockchain(&mut self) -> Result<()> {
        let subnet_id = self.subnet()?.to_string();
        let genesis_p = self.genesis()?.address(Chain::P)?.to_string();
        let subnet = &self.config.subnet;

        let path = subnet.genesis_path.as_ref().ok_or(ProvisionError::Missing("VM genesis"))?;
        let genesis = std::fs::read(path).map_err(|source| ProvisionError::Genesis {
            path: path.clone(),
            source,
        })?;

        let request = CreateBlockchainRequest {
            user: self.user.clone(),
            from: vec![genesis_p.clone()],
            change_addr: genesis_p,
            subnet_id: subnet_id.clone(),
            vm_id: subnet.vm_id.clone(),
            fx_ids: Vec::new(),
            name: subnet.vm_name.clone(),
            genesis,
        };
        let node = self.view.first();
        let blockchain_id = self
            .guard("create blockchain", node.client.create_blockchain(&request))
            .await?;
        info!(node = %node.name, %blockchain_id, vm = %subnet.vm_name, "issued blockchain creation");

        for node in self.view.nodes() {
            self.confirm_tx(node, Chain::P, &blockchain_id).await?;
            self.confirm_blockchain(node, &subnet_id, &blockchain_id).await?;
        }

        self.blockchain_id = Some(blockchain_id);
        Ok(())
    }

    pub(super) async fn wait_blockchain_bootstrapped(&self) -> Result<()> {
        let blockchain_id = self
            .blockchain_id
            .as_deref()
            .ok_or(ProvisionError::Missing("blockchain"))?;
        for node in self.view.nodes() {
            self.confirm_bootstrapped(node, blockchain_id).await?;
        }
        info!(blockchain_id, "blockchain bootstrapped on every node");
        Ok(())
    }

    fn subnet(&self) -> Result<&str> {
        self.subnet_id.as_deref().ok_or_else(|| ProvisionError::Missing("subnet").into())
    }
}
