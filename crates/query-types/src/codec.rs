//! Byte codec shared by requests and responses.

use bytes::{Buf, BufMut};
use ccq_primitives::{ChainId, Finality, Pubkey, PUBKEY_LEN};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} more bytes, {remaining} left")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    #[error("unsupported version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown query type {0}")]
    UnknownQueryType(u8),

    #[error("unknown commitment {0:?}")]
    UnknownCommitment(String),

    #[error("invalid boolean byte {0}")]
    InvalidBool(u8),

    #[error("request id must be {expected} bytes, got {got}")]
    InvalidRequestIdLength { expected: usize, got: usize },

    #[error("{field} does not fit its length prefix ({len})")]
    LengthOverflow { field: &'static str, len: usize },

    #[error("query type {query_type} does not match body")]
    QueryTypeMismatch { query_type: u8 },

    #[error("response count {responses} does not match request count {requests}")]
    ResponseCountMismatch { requests: usize, responses: usize },

    #[error("response {index} is for chain {response}, requested chain {request}")]
    ChainIdMismatch {
        index: usize,
        request: ChainId,
        response: ChainId,
    },

    #[error("response {index} has a different query type than its request")]
    ResponseTypeMismatch { index: usize },

    #[error("response {index} returned {returned} results for {requested} lookups")]
    ResultCountMismatch {
        index: usize,
        requested: usize,
        returned: usize,
    },
}

/// Types with a canonical byte encoding.
pub trait Codec: Sized {
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), CodecError>;

    fn decode(buf: &mut impl Buf) -> Result<Self, CodecError>;
}

/// Encodes a value into a fresh buffer.
pub fn encode_to_vec<T: Codec>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    value.encode(&mut out)?;
    Ok(out)
}

/// Decodes a value that must span all of `bytes`.
pub fn decode_exact<T: Codec>(mut bytes: &[u8]) -> Result<T, CodecError> {
    let value = T::decode(&mut bytes)?;
    if !bytes.is_empty() {
        return Err(CodecError::TrailingBytes(bytes.len()));
    }
    Ok(value)
}

/// Bounds-checked reads. The plain [`Buf`] getters panic on short input.
pub(crate) trait ReadExt: Buf {
    fn ensure(&self, needed: usize) -> Result<(), CodecError> {
        if self.remaining() < needed {
            return Err(CodecError::UnexpectedEnd {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        self.ensure(1)?;
        Ok(self.get_u8())
    }

    fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.ensure(2)?;
        Ok(self.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.ensure(4)?;
        Ok(self.get_u32())
    }

    fn read_u64(&mut self) -> Result<u64, CodecError> {
        self.ensure(8)?;
        Ok(self.get_u64())
    }

    fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(CodecError::InvalidBool(b)),
        }
    }

    fn read_arr<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        self.copy_to_slice(&mut out);
        Ok(out)
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        self.ensure(len)?;
        let mut out = vec![0u8; len];
        self.copy_to_slice(&mut out);
        Ok(out)
    }

    /// `len:u32 || bytes`
    fn read_bytes_u32(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_u32()? as usize;
        self.read_vec(len)
    }

    fn read_pubkey(&mut self) -> Result<Pubkey, CodecError> {
        Ok(Pubkey::new(self.read_arr::<PUBKEY_LEN>()?))
    }

    fn read_chain_id(&mut self) -> Result<ChainId, CodecError> {
        Ok(ChainId::new(self.read_u16()?))
    }

    fn read_commitment(&mut self) -> Result<Finality, CodecError> {
        let raw = self.read_bytes_u32()?;
        let s = String::from_utf8_lossy(&raw);
        s.parse()
            .map_err(|_| CodecError::UnknownCommitment(s.into_owned()))
    }
}

impl<B: Buf + ?Sized> ReadExt for B {}

pub(crate) fn write_count_u8(
    buf: &mut impl BufMut,
    len: usize,
    field: &'static str,
) -> Result<(), CodecError> {
    let n = u8::try_from(len).map_err(|_| CodecError::LengthOverflow { field, len })?;
    buf.put_u8(n);
    Ok(())
}

pub(crate) fn write_bytes_u32(
    buf: &mut impl BufMut,
    bytes: &[u8],
    field: &'static str,
) -> Result<(), CodecError> {
    let len = u32::try_from(bytes.len()).map_err(|_| CodecError::LengthOverflow {
        field,
        len: bytes.len(),
    })?;
    buf.put_u32(len);
    buf.put_slice(bytes);
    Ok(())
}

/// Writes the `chain_id:u16 type:u8 len:u32 body` frame used by both
/// per-chain requests and per-chain responses.
pub(crate) fn write_per_chain_frame(
    buf: &mut impl BufMut,
    chain_id: ChainId,
    query_type: u8,
    body: &[u8],
) -> Result<(), CodecError> {
    buf.put_u16(chain_id.get());
    buf.put_u8(query_type);
    write_bytes_u32(buf, body, "per-chain body")
}

/// Reads a per-chain frame, returning the chain id, query type and body.
pub(crate) fn read_per_chain_frame(
    buf: &mut impl Buf,
) -> Result<(ChainId, u8, Vec<u8>), CodecError> {
    let chain_id = buf.read_chain_id()?;
    let query_type = buf.read_u8()?;
    let body = buf.read_bytes_u32()?;
    Ok((chain_id, query_type, body))
}
