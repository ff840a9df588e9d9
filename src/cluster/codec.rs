//! Big-endian primitives of the node codec, shared by UTXO decoding and
//! transaction building.

use crate::EncodingError;

pub const CODEC_VERSION: u16 = 0;

pub type DecodeResult<T> = std::result::Result<T, EncodingError>;

pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn take(
        &mut self,
        len: usize,
    ) -> DecodeResult<&'a [u8]> {
        let end = self.pos.saturating_add(len);
        if end > self.buf.len() {
            return Err(EncodingError::TooShort(self.buf.len()));
        }
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u16(&mut self) -> DecodeResult<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub(crate) fn u32(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub(crate) fn u64(&mut self) -> DecodeResult<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    /// Bytes consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

#[derive(Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn bytes(
        &mut self,
        bytes: &[u8],
    ) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub(crate) fn u16(
        &mut self,
        value: u16,
    ) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub(crate) fn u32(
        &mut self,
        value: u32,
    ) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub(crate) fn u64(
        &mut self,
        value: u64,
    ) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    /// Element count prefix for the list that follows.
    pub(crate) fn count(
        &mut self,
        count: usize,
    ) -> &mut Self {
        self.u32(count as u32)
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}
