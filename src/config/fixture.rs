use serde::Deserialize;
use serde::Serialize;

use crate::constants::EWOQ_C_ADDRESS;
use crate::constants::EWOQ_PRIVATE_KEY;
use crate::constants::EWOQ_P_ADDRESS;
use crate::constants::EWOQ_X_ADDRESS;
use crate::constants::EXPECTED_SUBNET_ID;
use crate::constants::PRIVATE_KEY_PREFIX;
use crate::Chain;
use crate::Error;
use crate::Result;

/// Keystore credentials and the well-known funded identity baked into the
/// local network genesis.
#[derive(Serialize, Deserialize, Clone)]
pub struct FixtureConfig {
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// `PrivateKey-<cb58>` encoded genesis key
    #[serde(default = "default_genesis_private_key")]
    pub genesis_private_key: String,

    #[serde(default = "default_expected_x_address")]
    pub expected_x_address: String,

    #[serde(default = "default_expected_p_address")]
    pub expected_p_address: String,

    #[serde(default = "default_expected_c_address")]
    pub expected_c_address: String,

    /// The created subnet id must match this and every node whitelists it.
    /// An empty string turns both off.
    #[serde(default = "default_expected_subnet_id")]
    pub expected_subnet_id: Option<String>,
}

impl std::fmt::Debug for FixtureConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("FixtureConfig")
            .field("username", &self.username)
            .field("expected_x_address", &self.expected_x_address)
            .field("expected_p_address", &self.expected_p_address)
            .field("expected_c_address", &self.expected_c_address)
            .field("expected_subnet_id", &self.expected_subnet_id)
            .finish_non_exhaustive()
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            genesis_private_key: default_genesis_private_key(),
            expected_x_address: default_expected_x_address(),
            expected_p_address: default_expected_p_address(),
            expected_c_address: default_expected_c_address(),
            expected_subnet_id: default_expected_subnet_id(),
        }
    }
}

impl FixtureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(Error::InvalidConfig(
                "fixture username and password cannot be empty".into(),
            ));
        }

        if !self.genesis_private_key.starts_with(PRIVATE_KEY_PREFIX) {
            return Err(Error::InvalidConfig(format!(
                "genesis_private_key must start with {PRIVATE_KEY_PREFIX}"
            )));
        }

        for chain in Chain::ALL {
            if self.expected_address(chain).is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "expected {chain}-chain address cannot be empty"
                )));
            }
        }

        Ok(())
    }

    /// Subnet id to whitelist and check, unless opted out.
    pub fn expected_subnet(&self) -> Option<&str> {
        self.expected_subnet_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Address the genesis key must map to on `chain`.
    pub fn expected_address(
        &self,
        chain: Chain,
    ) -> &str {
        match chain {
            Chain::X => &self.expected_x_address,
            Chain::P => &self.expected_p_address,
            Chain::C => &self.expected_c_address,
        }
    }
}

fn default_username() -> String {
    "testuser".to_string()
}
fn default_password() -> String {
    "testinsecurerandomvmavax".to_string()
}
fn default_genesis_private_key() -> String {
    EWOQ_PRIVATE_KEY.to_string()
}
fn default_expected_x_address() -> String {
    EWOQ_X_ADDRESS.to_string()
}
fn default_expected_p_address() -> String {
    EWOQ_P_ADDRESS.to_string()
}
fn default_expected_c_address() -> String {
    EWOQ_C_ADDRESS.to_string()
}
fn default_expected_subnet_id() -> Option<String> {
    Some(EXPECTED_SUBNET_ID.to_string())
}
