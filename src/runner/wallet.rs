use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use ripemd::Ripemd160;
use secp256k1::Message;
use secp256k1::PublicKey;
use secp256k1::Secp256k1;
use secp256k1::SecretKey;
use sha2::Digest;
use sha2::Sha256;

use crate::constants::PRIVATE_KEY_PREFIX;
use crate::encoding::decode_prefixed;
use crate::encoding::encode_prefixed;
use crate::Chain;
use crate::EncodingError;
use crate::ProvisionError;
use crate::Result;

pub const PRIVATE_KEY_LEN: usize = 32;
pub const SHORT_ADDRESS_LEN: usize = 20;
pub const SIGNATURE_LEN: usize = 65;

/// secp256k1 private key in raw and `PrivateKey-<cb58>` form.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    bytes: [u8; PRIVATE_KEY_LEN],
    encoded: String,
}

impl PrivateKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; PRIVATE_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: [u8; PRIVATE_KEY_LEN]) -> Self {
        Self {
            encoded: encode_prefixed(&bytes, PRIVATE_KEY_PREFIX),
            bytes,
        }
    }

    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let raw = decode_prefixed(encoded, PRIVATE_KEY_PREFIX)?;
        let bytes: [u8; PRIVATE_KEY_LEN] =
            raw.as_slice().try_into().map_err(|_| EncodingError::TooShort(raw.len()))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_LEN] {
        &self.bytes
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    fn secret(&self) -> Result<SecretKey> {
        Ok(SecretKey::from_slice(&self.bytes).map_err(EncodingError::from)?)
    }

    /// ripemd160(sha256(compressed public key)), the owner id in outputs.
    pub fn short_address(&self) -> Result<[u8; SHORT_ADDRESS_LEN]> {
        let secp = Secp256k1::signing_only();
        let public = PublicKey::from_secret_key(&secp, &self.secret()?);
        Ok(Ripemd160::digest(Sha256::digest(public.serialize())).into())
    }

    /// Recoverable signature over `sha256(payload)`: `r || s || recovery id`.
    pub fn sign(
        &self,
        payload: &[u8],
    ) -> Result<[u8; SIGNATURE_LEN]> {
        let digest = Sha256::digest(payload);
        let message = Message::from_digest_slice(&digest).map_err(EncodingError::from)?;
        let secp = Secp256k1::signing_only();
        let (recovery_id, compact) =
            secp.sign_ecdsa_recoverable(&message, &self.secret()?).serialize_compact();

        let mut signature = [0u8; SIGNATURE_LEN];
        signature[..64].copy_from_slice(&compact);
        signature[64] = recovery_id.to_i32() as u8;
        Ok(signature)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// A key imported into every node's keystore, with the address it maps to
/// on each chain and the balances last observed there (nAVAX).
#[derive(Debug, Clone)]
pub struct Wallet {
    pub name: String,
    pub key: PrivateKey,
    addresses: BTreeMap<Chain, String>,
    balances: BTreeMap<Chain, u64>,
}

impl Wallet {
    pub fn new(
        name: impl Into<String>,
        key: PrivateKey,
    ) -> Self {
        Self {
            name: name.into(),
            key,
            addresses: BTreeMap::new(),
            balances: BTreeMap::new(),
        }
    }

    /// Address on `chain`; errors until the key has been imported there.
    pub fn address(
        &self,
        chain: Chain,
    ) -> Result<&str> {
        self.addresses
            .get(&chain)
            .map(String::as_str)
            .ok_or_else(|| ProvisionError::Missing("wallet address").into())
    }

    pub fn known_address(
        &self,
        chain: Chain,
    ) -> Option<&str> {
        self.addresses.get(&chain).map(String::as_str)
    }

    pub fn set_address(
        &mut self,
        chain: Chain,
        address: String,
    ) {
        self.addresses.insert(chain, address);
    }

    pub fn balance(
        &self,
        chain: Chain,
    ) -> u64 {
        self.balances.get(&chain).copied().unwrap_or_default()
    }

    pub fn set_balance(
        &mut self,
        chain: Chain,
        balance: u64,
    ) {
        self.balances.insert(chain, balance);
    }
}
