//! SPL token account layout.

use ccq_primitives::{Pubkey, PUBKEY_LEN};
use thiserror::Error;

/// Packed size of a token account without extensions.
pub const TOKEN_ACCOUNT_LEN: usize = 165;

/// Mint and owner lead the layout.
const MINT_AND_OWNER_LEN: usize = 2 * PUBKEY_LEN;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenAccountError {
    #[error("token account data is {got} bytes, need {needed}")]
    TooShort { needed: usize, got: usize },

    #[error("invalid option tag {0}")]
    InvalidOptionTag(u32),

    #[error("invalid account state {0}")]
    InvalidState(u8),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenAccountState {
    #[default]
    Uninitialized = 0,
    Initialized = 1,
    Frozen = 2,
}

impl TryFrom<u8> for TokenAccountState {
    type Error = TokenAccountError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Uninitialized),
            1 => Ok(Self::Initialized),
            2 => Ok(Self::Frozen),
            other => Err(TokenAccountError::InvalidState(other)),
        }
    }
}

/// A decoded token account.
///
/// Integers are little-endian. Optional fields are a `u32` tag followed by a
/// payload that is present, zeroed, even when the tag is 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub state: TokenAccountState,
    /// Rent-exempt reserve of a wrapped native account.
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
}

impl TokenAccount {
    /// Decodes the first [`TOKEN_ACCOUNT_LEN`] bytes; trailing extension data
    /// is ignored.
    pub fn unpack(data: &[u8]) -> Result<Self, TokenAccountError> {
        let mut r = Reader::new(data, TOKEN_ACCOUNT_LEN)?;
        Ok(Self {
            mint: r.pubkey(),
            owner: r.pubkey(),
            amount: r.u64(),
            delegate: r.option(Reader::pubkey)?,
            state: TokenAccountState::try_from(r.u8())?,
            is_native: r.option(Reader::u64)?,
            delegated_amount: r.u64(),
            close_authority: r.option(Reader::pubkey)?,
        })
    }

    pub fn pack(&self) -> [u8; TOKEN_ACCOUNT_LEN] {
        let mut out = [0u8; TOKEN_ACCOUNT_LEN];
        let mut at = 0;
        let mut put = |bytes: &[u8]| {
            out[at..at + bytes.len()].copy_from_slice(bytes);
            at += bytes.len();
        };

        put(self.mint.as_bytes());
        put(self.owner.as_bytes());
        put(&self.amount.to_le_bytes());
        put_option(&mut put, self.delegate.map(Pubkey::to_bytes), [0; 32]);
        put(&[self.state as u8]);
        put_option(&mut put, self.is_native.map(u64::to_le_bytes), [0; 8]);
        put(&self.delegated_amount.to_le_bytes());
        put_option(&mut put, self.close_authority.map(Pubkey::to_bytes), [0; 32]);
        out
    }
}

fn put_option<const N: usize>(put: &mut impl FnMut(&[u8]), value: Option<[u8; N]>, none: [u8; N]) {
    match value {
        Some(bytes) => {
            put(&1u32.to_le_bytes());
            put(&bytes);
        }
        None => {
            put(&0u32.to_le_bytes());
            put(&none);
        }
    }
}

/// Reads the mint and owner only. Works on data slices that cover at least
/// the first 64 bytes of the account.
pub fn read_mint_and_owner(data: &[u8]) -> Result<(Pubkey, Pubkey), TokenAccountError> {
    let mut r = Reader::new(data, MINT_AND_OWNER_LEN)?;
    Ok((r.pubkey(), r.pubkey()))
}

/// Cursor over data already checked to hold `len` bytes.
struct Reader<'a> {
    data: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], len: usize) -> Result<Self, TokenAccountError> {
        if data.len() < len {
            return Err(TokenAccountError::TooShort {
                needed: len,
                got: data.len(),
            });
        }
        Ok(Self {
            data: &data[..len],
            at: 0,
        })
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.at..self.at + N]);
        self.at += N;
        out
    }

    fn pubkey(&mut self) -> Pubkey {
        Pubkey::new(self.take())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn option<T>(&mut self, read: fn(&mut Self) -> T) -> Result<Option<T>, TokenAccountError> {
        let tag = u32::from_le_bytes(self.take());
        let value = read(self);
        match tag {
            0 => Ok(None),
            1 => Ok(Some(value)),
            other => Err(TokenAccountError::InvalidOptionTag(other)),
        }
    }
}
