//! Reads back the export/import txs the provisioner issues, so the fake
//! ledger can apply them the way a node would.

use ripemd::Ripemd160;
use secp256k1::ecdsa::RecoverableSignature;
use secp256k1::ecdsa::RecoveryId;
use secp256k1::Message;
use secp256k1::Secp256k1;
use sha2::Digest;
use sha2::Sha256;

use crate::cluster::codec::Reader;
use crate::cluster::codec::CODEC_VERSION;
use crate::tx::Id;
use crate::tx::TransferInput;
use crate::tx::TransferOutput;
use crate::tx::AVM_EXPORT_TX_TYPE_ID;
use crate::tx::PLATFORM_IMPORT_TX_TYPE_ID;
use crate::tx::SECP256K1_CREDENTIAL_TYPE_ID;
use crate::tx::SECP256K1_TRANSFER_INPUT_TYPE_ID;
use crate::tx::SECP256K1_TRANSFER_OUTPUT_TYPE_ID;
use crate::EncodingError;
use crate::SIGNATURE_LEN;

#[derive(Debug, thiserror::Error)]
pub enum TxDecodeError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("unexpected type id {0}")]
    TypeId(u32),
}

type DecodeResult<T> = std::result::Result<T, TxDecodeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Export,
    Import,
}

#[derive(Debug)]
pub struct DecodedTx {
    pub kind: TxKind,
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outputs: Vec<TransferOutput>,
    pub inputs: Vec<TransferInput>,
    /// Destination chain of an export, source chain of an import
    pub other_chain: Id,
    pub exported: Vec<TransferOutput>,
    pub imported: Vec<TransferInput>,
    pub unsigned: Vec<u8>,
    pub credentials: Vec<Vec<[u8; SIGNATURE_LEN]>>,
}

impl DecodedTx {
    /// Base inputs followed by imported ones, matching the credential order.
    pub fn all_inputs(&self) -> impl Iterator<Item = &TransferInput> {
        self.inputs.iter().chain(&self.imported)
    }

    /// Short address that produced `signature` over this tx.
    pub fn signer(
        &self,
        signature: &[u8; SIGNATURE_LEN],
    ) -> Option<[u8; 20]> {
        let message = Message::from_digest_slice(&Sha256::digest(&self.unsigned)).ok()?;
        let recovery_id = RecoveryId::from_i32(signature[64] as i32).ok()?;
        let signature = RecoverableSignature::from_compact(&signature[..64], recovery_id).ok()?;
        let public = Secp256k1::new().recover_ecdsa(&message, &signature).ok()?;
        Some(Ripemd160::digest(Sha256::digest(public.serialize())).into())
    }
}

fn expect_type(
    r: &mut Reader<'_>,
    type_id: u32,
) -> DecodeResult<()> {
    let got = r.u32()?;
    if got != type_id {
        return Err(TxDecodeError::TypeId(got));
    }
    Ok(())
}

fn output(r: &mut Reader<'_>) -> DecodeResult<TransferOutput> {
    let asset_id = r.array()?;
    expect_type(r, SECP256K1_TRANSFER_OUTPUT_TYPE_ID)?;
    let amount = r.u64()?;
    let locktime = r.u64()?;
    let threshold = r.u32()?;
    let count = r.u32()?;
    let addresses = (0..count).map(|_| r.array()).collect::<Result<_, _>>()?;
    Ok(TransferOutput {
        asset_id,
        amount,
        locktime,
        threshold,
        addresses,
    })
}

fn input(r: &mut Reader<'_>) -> DecodeResult<TransferInput> {
    let tx_id = r.array()?;
    let output_index = r.u32()?;
    let asset_id = r.array()?;
    expect_type(r, SECP256K1_TRANSFER_INPUT_TYPE_ID)?;
    let amount = r.u64()?;
    let count = r.u32()?;
    let sig_indices = (0..count).map(|_| r.u32()).collect::<Result<_, _>>()?;
    Ok(TransferInput {
        tx_id,
        output_index,
        asset_id,
        amount,
        sig_indices,
    })
}

fn list<T>(
    r: &mut Reader<'_>,
    item: fn(&mut Reader<'_>) -> DecodeResult<T>,
) -> DecodeResult<Vec<T>> {
    let count = r.u32()?;
    (0..count).map(|_| item(r)).collect()
}

pub fn decode_signed_tx(bytes: &[u8]) -> DecodeResult<DecodedTx> {
    let mut r = Reader::new(bytes);
    let version = r.u16()?;
    if version != CODEC_VERSION {
        return Err(EncodingError::CodecVersion(version).into());
    }
    let kind = match r.u32()? {
        AVM_EXPORT_TX_TYPE_ID => TxKind::Export,
        PLATFORM_IMPORT_TX_TYPE_ID => TxKind::Import,
        other => return Err(TxDecodeError::TypeId(other)),
    };
    let network_id = r.u32()?;
    let blockchain_id = r.array()?;
    let outputs = list(&mut r, output)?;
    let inputs = list(&mut r, input)?;
    let memo_len = r.u32()?;
    r.take(memo_len as usize)?;
    let other_chain = r.array()?;
    let (exported, imported) = match kind {
        TxKind::Export => (list(&mut r, output)?, Vec::new()),
        TxKind::Import => (Vec::new(), list(&mut r, input)?),
    };
    let unsigned = bytes[..r.position()].to_vec();

    let mut credentials = Vec::new();
    for _ in 0..r.u32()? {
        expect_type(&mut r, SECP256K1_CREDENTIAL_TYPE_ID)?;
        let count = r.u32()?;
        let signatures = (0..count).map(|_| r.array()).collect::<Result<_, _>>()?;
        credentials.push(signatures);
    }

    Ok(DecodedTx {
        kind,
        network_id,
        blockchain_id,
        outputs,
        inputs,
        other_chain,
        exported,
        imported,
        unsigned,
        credentials,
    })
}
