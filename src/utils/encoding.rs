//! Checksummed encodings used by the node APIs.
//!
//! Both variants append the last 4 bytes of `sha256(payload)`:
//! cb58 renders the result in base58 (keys, ids), the hex variant
//! renders it as `0x`-prefixed hex (UTXOs, genesis data).

use sha2::Digest;
use sha2::Sha256;

use crate::EncodingError;

const CHECKSUM_LEN: usize = 4;

type EncodingResult<T> = std::result::Result<T, EncodingError>;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

fn with_checksum(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&checksum(payload));
    buf
}

fn strip_checksum(mut raw: Vec<u8>) -> EncodingResult<Vec<u8>> {
    if raw.len() < CHECKSUM_LEN {
        return Err(EncodingError::TooShort(raw.len()));
    }
    let split = raw.len() - CHECKSUM_LEN;
    if raw[split..] != checksum(&raw[..split]) {
        return Err(EncodingError::Checksum);
    }
    raw.truncate(split);
    Ok(raw)
}

pub fn cb58_encode(payload: &[u8]) -> String {
    bs58::encode(with_checksum(payload)).into_string()
}

pub fn cb58_decode(encoded: &str) -> EncodingResult<Vec<u8>> {
    strip_checksum(bs58::decode(encoded).into_vec()?)
}

pub fn hex_encode_with_checksum(payload: &[u8]) -> String {
    format!("0x{}", hex::encode(with_checksum(payload)))
}

pub fn hex_decode_with_checksum(encoded: &str) -> EncodingResult<Vec<u8>> {
    let trimmed = encoded.strip_prefix("0x").unwrap_or(encoded);
    strip_checksum(hex::decode(trimmed)?)
}

/// Decodes `<prefix><cb58>` strings such as `PrivateKey-...` or `NodeID-...`.
pub fn decode_prefixed(
    encoded: &str,
    prefix: &'static str,
) -> EncodingResult<Vec<u8>> {
    let body = encoded.strip_prefix(prefix).ok_or(EncodingError::MissingPrefix(prefix))?;
    cb58_decode(body)
}

pub fn encode_prefixed(
    payload: &[u8],
    prefix: &str,
) -> String {
    format!("{prefix}{}", cb58_encode(payload))
}
