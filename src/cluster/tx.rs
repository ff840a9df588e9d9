//! Atomic export/import transactions assembled from selected UTXOs and
//! signed with a wallet key.
//!
//! Unsigned layout: codec version `u16`, tx type id `u32`, network id `u32`,
//! blockchain id, outputs, inputs, memo, then the type-specific tail (the
//! destination chain and exported outputs, or the source chain and imported
//! inputs). The signed form appends one secp256k1 credential per input.

use sha2::Digest;
use sha2::Sha256;

use super::codec::Writer;
use super::codec::CODEC_VERSION;
use crate::encoding::cb58_decode;
use crate::encoding::cb58_encode;
use crate::EncodingError;
use crate::PrivateKey;
use crate::ProvisionError;
use crate::Result;
use crate::Utxo;

pub const ID_LEN: usize = 32;

pub const SECP256K1_TRANSFER_INPUT_TYPE_ID: u32 = 5;
pub const SECP256K1_TRANSFER_OUTPUT_TYPE_ID: u32 = 7;
pub const SECP256K1_CREDENTIAL_TYPE_ID: u32 = 9;
pub const AVM_EXPORT_TX_TYPE_ID: u32 = 4;
pub const PLATFORM_IMPORT_TX_TYPE_ID: u32 = 17;

/// The P-chain's blockchain id is all zeroes.
pub const PLATFORM_CHAIN_ID: Id = [0u8; ID_LEN];

pub type Id = [u8; ID_LEN];

/// Decodes a cb58 tx, asset or blockchain id.
pub fn decode_id(encoded: &str) -> Result<Id> {
    let raw = cb58_decode(encoded)?;
    let id: Id = raw.as_slice().try_into().map_err(|_| EncodingError::TooShort(raw.len()))?;
    Ok(id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutput {
    pub asset_id: Id,
    pub amount: u64,
    pub locktime: u64,
    pub threshold: u32,
    pub addresses: Vec<[u8; 20]>,
}

impl TransferOutput {
    /// Unlocked output spendable by `owner` alone.
    pub fn owned_by(
        asset_id: Id,
        amount: u64,
        owner: [u8; 20],
    ) -> Self {
        Self {
            asset_id,
            amount,
            locktime: 0,
            threshold: 1,
            addresses: vec![owner],
        }
    }

    pub(crate) fn write(
        &self,
        w: &mut Writer,
    ) {
        w.bytes(&self.asset_id)
            .u32(SECP256K1_TRANSFER_OUTPUT_TYPE_ID)
            .u64(self.amount)
            .u64(self.locktime)
            .u32(self.threshold)
            .count(self.addresses.len());
        for address in &self.addresses {
            w.bytes(address);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInput {
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    pub amount: u64,
    pub sig_indices: Vec<u32>,
}

impl TransferInput {
    /// Spends `utxo` with the signature of `owner`.
    pub fn spend(
        utxo: &Utxo,
        owner: &[u8; 20],
    ) -> Result<Self> {
        let unspendable = || ProvisionError::Unspendable {
            tx_id: utxo.tx_id.clone(),
            output_index: utxo.output_index,
        };
        let index = utxo.addresses.iter().position(|a| a == owner).ok_or_else(unspendable)?;
        Ok(Self {
            tx_id: decode_id(&utxo.tx_id)?,
            output_index: utxo.output_index,
            asset_id: decode_id(&utxo.asset_id)?,
            amount: utxo.amount,
            sig_indices: vec![index as u32],
        })
    }

    pub(crate) fn write(
        &self,
        w: &mut Writer,
    ) {
        w.bytes(&self.tx_id)
            .u32(self.output_index)
            .bytes(&self.asset_id)
            .u32(SECP256K1_TRANSFER_INPUT_TYPE_ID)
            .u64(self.amount)
            .count(self.sig_indices.len());
        for index in &self.sig_indices {
            w.u32(*index);
        }
    }
}

/// Inputs for every UTXO in `utxos`, in the canonical (tx id, index) order.
pub fn spend_all(
    utxos: &[Utxo],
    owner: &[u8; 20],
) -> Result<Vec<TransferInput>> {
    let mut inputs = utxos
        .iter()
        .map(|utxo| TransferInput::spend(utxo, owner))
        .collect::<Result<Vec<_>>>()?;
    inputs.sort_by(|a, b| (a.tx_id, a.output_index).cmp(&(b.tx_id, b.output_index)));
    Ok(inputs)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outputs: Vec<TransferOutput>,
    pub inputs: Vec<TransferInput>,
    pub memo: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTx {
    /// X-chain export into the shared memory of `destination_chain`
    Export {
        base: BaseTx,
        destination_chain: Id,
        exported: Vec<TransferOutput>,
    },
    /// P-chain import of UTXOs exported from `source_chain`
    Import {
        base: BaseTx,
        source_chain: Id,
        imported: Vec<TransferInput>,
    },
}

/// Serialized, signed transaction and the id the node will report for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub id: String,
    pub bytes: Vec<u8>,
}

impl UnsignedTx {
    fn type_id(&self) -> u32 {
        match self {
            UnsignedTx::Export { .. } => AVM_EXPORT_TX_TYPE_ID,
            UnsignedTx::Import { .. } => PLATFORM_IMPORT_TX_TYPE_ID,
        }
    }

    fn base(&self) -> &BaseTx {
        match self {
            UnsignedTx::Export { base, .. } | UnsignedTx::Import { base, .. } => base,
        }
    }

    /// Every input that needs a credential, in credential order.
    fn signed_inputs(&self) -> impl Iterator<Item = &TransferInput> {
        let tail: &[TransferInput] = match self {
            UnsignedTx::Export { .. } => &[],
            UnsignedTx::Import { imported, .. } => imported,
        };
        self.base().inputs.iter().chain(tail)
    }

    pub fn bytes(&self) -> Vec<u8> {
        let base = self.base();
        let mut w = Writer::default();
        w.u16(CODEC_VERSION)
            .u32(self.type_id())
            .u32(base.network_id)
            .bytes(&base.blockchain_id)
            .count(base.outputs.len());
        for output in &base.outputs {
            output.write(&mut w);
        }
        w.count(base.inputs.len());
        for input in &base.inputs {
            input.write(&mut w);
        }
        w.count(base.memo.len()).bytes(&base.memo);

        match self {
            UnsignedTx::Export {
                destination_chain,
                exported,
                ..
            } => {
                w.bytes(destination_chain).count(exported.len());
                for output in exported {
                    output.write(&mut w);
                }
            }
            UnsignedTx::Import {
                source_chain,
                imported,
                ..
            } => {
                w.bytes(source_chain).count(imported.len());
                for input in imported {
                    input.write(&mut w);
                }
            }
        }
        w.finish()
    }

    /// Signs every input with `key`, which must own all of them.
    pub fn sign(
        &self,
        key: &PrivateKey,
    ) -> Result<SignedTx> {
        let unsigned = self.bytes();
        let signature = key.sign(&unsigned)?;

        let mut w = Writer::default();
        w.bytes(&unsigned).count(self.signed_inputs().count());
        for input in self.signed_inputs() {
            w.u32(SECP256K1_CREDENTIAL_TYPE_ID).count(input.sig_indices.len());
            for _ in &input.sig_indices {
                w.bytes(&signature);
            }
        }
        let bytes = w.finish();
        Ok(SignedTx {
            id: cb58_encode(&Sha256::digest(&bytes)),
            bytes,
        })
    }
}
