//! Decoding of codec-serialized UTXO records.
//!
//! Layout (big endian): codec version `u16`, tx id `[u8; 32]`, output index
//! `u32`, asset id `[u8; 32]`, output type id `u32`, then for a secp256k1
//! transfer output: amount `u64`, locktime `u64`, threshold `u32`, address
//! count `u32` and that many 20-byte addresses.

use super::codec::DecodeResult;
use super::codec::Reader;
use super::codec::CODEC_VERSION;
use super::tx::SECP256K1_TRANSFER_OUTPUT_TYPE_ID;
use crate::encoding::cb58_encode;
use crate::encoding::hex_decode_with_checksum;
use crate::EncodingError;
use crate::Utxo;

/// Decodes one UTXO. Outputs other than secp256k1 transfers yield `None`.
pub fn decode_utxo(bytes: &[u8]) -> DecodeResult<Option<Utxo>> {
    let mut r = Reader::new(bytes);

    let version = r.u16()?;
    if version != CODEC_VERSION {
        return Err(EncodingError::CodecVersion(version));
    }
    let tx_id: [u8; 32] = r.array()?;
    let output_index = r.u32()?;
    let asset_id: [u8; 32] = r.array()?;

    if r.u32()? != SECP256K1_TRANSFER_OUTPUT_TYPE_ID {
        return Ok(None);
    }

    let amount = r.u64()?;
    let locktime = r.u64()?;
    let threshold = r.u32()?;
    let count = r.u32()? as usize;
    let mut addresses = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        addresses.push(r.array::<20>()?);
    }

    Ok(Some(Utxo {
        tx_id: cb58_encode(&tx_id),
        output_index,
        asset_id: cb58_encode(&asset_id),
        amount,
        locktime,
        threshold,
        addresses,
    }))
}

/// Decodes the `0x`-prefixed, checksummed hex strings returned by `getUTXOs`.
pub fn decode_hex_utxos(encoded: &[String]) -> DecodeResult<Vec<Utxo>> {
    let mut utxos = Vec::with_capacity(encoded.len());
    for item in encoded {
        if let Some(utxo) = decode_utxo(&hex_decode_with_checksum(item)?)? {
            utxos.push(utxo);
        }
    }
    Ok(utxos)
}
