use tracing::info;

use super::Provisioner;
use crate::Result;

impl Provisioner {
    /// Creates the fixture keystore user on every node.
    pub(super) async fn create_users(&self) -> Result<()> {
        for node in self.view.nodes() {
            self.guard("create keystore user", node.client.create_user(&self.user)).await?;
            info!(node = %node.name, username = %self.user.username, "created keystore user");
        }
        Ok(())
    }
}
